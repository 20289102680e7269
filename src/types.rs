use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl Op {
    pub fn bp(&self) -> u8 {
        match self {
            Op::Add | Op::Sub => 1,
            Op::Mul | Op::Div => 2,
            Op::Pow => 3,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
            Op::Pow => "^",
        }
    }
}

// Unary minus takes a power as its operand but not a product, so -x^2 = -(x^2)
pub const OP_UNARY_MINUS_BP: u8 = 2;
pub const BIND_RIGHT_BP: u8 = 0; // Used for always bind right constructs like functions and parantheses

#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub enum Token {
    Val(f64),
    Op(Op),
    ParOpen,
    ParClose,
    Var(String),
    Fun(Fun),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Val(v) => write!(f, "{v}"),
            Token::Op(op) => f.write_str(op.symbol()),
            Token::ParOpen => f.write_str("("),
            Token::ParClose => f.write_str(")"),
            Token::Var(v) => f.write_str(v),
            Token::Fun(fun) => f.write_str(fun.name()),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub enum Fun {
    Sin,
    Cos,
    Tan,
    Log,
    Ln,
    Sqrt,
    Abs,
    Exp,
}

impl Fun {
    pub const ALL: [Fun; 8] = [
        Fun::Sin,
        Fun::Cos,
        Fun::Tan,
        Fun::Log,
        Fun::Ln,
        Fun::Sqrt,
        Fun::Abs,
        Fun::Exp,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Fun::Sin => "sin",
            Fun::Cos => "cos",
            Fun::Tan => "tan",
            Fun::Log => "log",
            Fun::Ln => "ln",
            Fun::Sqrt => "sqrt",
            Fun::Abs => "abs",
            Fun::Exp => "exp",
        }
    }
}
