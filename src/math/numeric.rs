use crate::math::{
    ast::Exp,
    error::DomainError,
    eval::{EvalResult, evaluate},
};

pub const DEFAULT_STEP: f64 = 1e-3;

/// Centered finite difference estimate of the slope of `exp` at `x`.
pub fn numeric_derivative(exp: &Exp, x: f64) -> EvalResult {
    numeric_derivative_with_step(exp, x, DEFAULT_STEP)
}

/// `(f(x+h) - f(x-h)) / 2h`. Second order accurate for smooth inputs, and
/// only an approximation. If either sample is outside the domain so is the
/// estimate; there is no one-sided fallback.
pub fn numeric_derivative_with_step(exp: &Exp, x: f64, h: f64) -> EvalResult {
    if !(h.is_finite() && h > 0.0) {
        return Err(DomainError::InvalidStep(h));
    }
    let ahead = evaluate(exp, x + h)?;
    let behind = evaluate(exp, x - h)?;
    let slope = (ahead - behind) / (2.0 * h);
    if slope.is_finite() {
        Ok(slope)
    } else {
        Err(DomainError::NonFinite)
    }
}
