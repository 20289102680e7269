use crate::{
    math::{ast::Exp, error::DomainError},
    types::{Fun, Op},
};

pub type EvalResult = Result<f64, DomainError>;

/// Evaluates `exp` with its variable bound to `x`.
///
/// Every intermediate value is checked, so an error in any subtree is the
/// result of the whole expression. `tan` at odd multiples of pi/2 is whatever
/// `f64::tan` gives there, which is large but finite.
pub fn evaluate(exp: &Exp, x: f64) -> EvalResult {
    let value = match exp {
        Exp::Val(v) => *v,
        Exp::Var(_) => x,
        Exp::Neg(inner) => -evaluate(inner, x)?,
        Exp::Op(op, lhs, rhs) => {
            let lhs = evaluate(lhs, x)?;
            let rhs = evaluate(rhs, x)?;
            apply_op(*op, lhs, rhs)?
        }
        Exp::Fun(fun, arg) => apply_fun(*fun, evaluate(arg, x)?)?,
    };
    finite(value)
}

fn apply_op(op: Op, lhs: f64, rhs: f64) -> EvalResult {
    match op {
        Op::Add => Ok(lhs + rhs),
        Op::Sub => Ok(lhs - rhs),
        Op::Mul => Ok(lhs * rhs),
        Op::Div if rhs == 0.0 => Err(DomainError::DivisionByZero),
        Op::Div => Ok(lhs / rhs),
        Op::Pow => Ok(lhs.powf(rhs)),
    }
}

fn apply_fun(fun: Fun, arg: f64) -> EvalResult {
    match fun {
        Fun::Sin => Ok(arg.sin()),
        Fun::Cos => Ok(arg.cos()),
        Fun::Tan => Ok(arg.tan()),
        // Both spellings are the natural logarithm
        Fun::Log | Fun::Ln if arg <= 0.0 => Err(DomainError::LogOfNonPositive(arg)),
        Fun::Log | Fun::Ln => Ok(arg.ln()),
        Fun::Sqrt if arg < 0.0 => Err(DomainError::SqrtOfNegative(arg)),
        Fun::Sqrt => Ok(arg.sqrt()),
        Fun::Abs => Ok(arg.abs()),
        Fun::Exp => Ok(arg.exp()),
    }
}

fn finite(value: f64) -> EvalResult {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DomainError::NonFinite)
    }
}
