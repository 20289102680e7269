use miette::Diagnostic;
use thiserror::Error;
use tracing::trace;

use crate::math::{
    ast::Exp,
    eval::{EvalResult, evaluate},
    numeric::numeric_derivative,
};

pub const MAX_SAMPLES: usize = 1_000_000;

#[derive(Debug, Diagnostic, Error, Clone, Copy, PartialEq)]
pub enum ViewportError {
    #[error("step {0} must be finite and positive")]
    InvalidStep(f64),
    #[error("x range {0} must be finite and not negative")]
    InvalidRange(f64),
    #[error("viewport needs {0:.0} samples, at most {max} are allowed", max = MAX_SAMPLES)]
    #[diagnostic(help("use a larger --step or a smaller --range"))]
    TooManySamples(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Consecutive samples that may be joined by straight lines.
pub type Segment = Vec<Point>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Series {
    #[default]
    Function,
    Derivative,
}

/// Samples are taken over `[-x_range, x_range]` every `step`; values outside
/// `[y_min, y_max]` are off screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x_range: f64,
    pub step: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            x_range: 10.0,
            step: 0.05,
            y_min: -12.5,
            y_max: 12.5,
        }
    }
}

impl Viewport {
    fn contains(&self, y: f64) -> bool {
        (self.y_min..=self.y_max).contains(&y)
    }

    fn sample_count(&self) -> Result<usize, ViewportError> {
        if !(self.step.is_finite() && self.step > 0.0) {
            return Err(ViewportError::InvalidStep(self.step));
        }
        if !(self.x_range.is_finite() && self.x_range >= 0.0) {
            return Err(ViewportError::InvalidRange(self.x_range));
        }
        // Small slack so that a range that is a whole number of steps keeps its end point
        let steps = (2.0 * self.x_range / self.step + 1e-9).floor();
        if steps >= MAX_SAMPLES as f64 {
            return Err(ViewportError::TooManySamples(steps + 1.0));
        }
        Ok(steps as usize + 1)
    }
}

/// Samples `series` of `exp` across the viewport. A sample that is outside the
/// domain or off screen ends the current segment; the next good sample starts
/// a new one, so no line is ever drawn across a gap.
pub fn sample_curve(
    exp: &Exp,
    viewport: &Viewport,
    series: Series,
) -> Result<Vec<Segment>, ViewportError> {
    let count = viewport.sample_count()?;
    let mut segments = Vec::new();
    let mut current = Segment::new();
    for i in 0..count {
        let x = -viewport.x_range + i as f64 * viewport.step;
        match sample(exp, x, series) {
            Ok(y) if viewport.contains(y) => current.push(Point { x, y }),
            outcome => {
                trace!(x, ?outcome, "gap in curve");
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    Ok(segments)
}

fn sample(exp: &Exp, x: f64, series: Series) -> EvalResult {
    match series {
        Series::Function => evaluate(exp, x),
        Series::Derivative => numeric_derivative(exp, x),
    }
}
