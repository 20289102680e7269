pub mod grade;
pub mod math;
pub mod plot;
pub mod types;

pub use math::{
    ast::{Exp, parse},
    error::{DiffError, DomainError, ParseError},
    eval::{EvalResult, evaluate},
    normalize::{answers_match, normalize},
    numeric::{DEFAULT_STEP, numeric_derivative, numeric_derivative_with_step},
    symbolic::{Monomial, Polynomial, symbolic_derivative},
};
