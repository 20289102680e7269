pub mod ast;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod normalize;
pub mod numeric;
pub mod symbolic;
