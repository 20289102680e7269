use thiserror::Error;
use tracing::{debug, warn};

use crate::math::{error::DiffError, normalize::answers_match, symbolic::symbolic_derivative};

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("solver unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Diff(#[from] DiffError),
}

/// Anything that can turn an expression into the text of its derivative.
pub trait Solver {
    fn derive(&self, equation: &str, variable: &str) -> Result<String, SolverError>;
}

/// Solves with the built-in polynomial differentiator.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSolver;

impl Solver for LocalSolver {
    fn derive(&self, equation: &str, variable: &str) -> Result<String, SolverError> {
        Ok(symbolic_derivative(equation, variable)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerSource {
    Expected,
    Remote,
    Local,
}

/// A problem as it comes from static content: the expression to differentiate
/// and, usually, a hand-written solution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Problem {
    pub equation: String,
    pub solution: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub correct: bool,
    pub expected: String,
    pub source: AnswerSource,
}

pub struct Grader {
    variable: String,
    remote: Option<Box<dyn Solver + Send + Sync>>,
}

impl Grader {
    pub fn new(variable: &str) -> Self {
        Grader {
            variable: variable.to_string(),
            remote: None,
        }
    }

    pub fn with_remote(mut self, solver: impl Solver + Send + Sync + 'static) -> Self {
        self.remote = Some(Box::new(solver));
        self
    }

    /// Derivative of `equation`, preferring the remote solver.
    pub fn solve(&self, equation: &str) -> Result<(String, AnswerSource), DiffError> {
        if let Some(remote) = &self.remote {
            match remote.derive(equation, &self.variable) {
                Ok(answer) => {
                    debug!(equation, %answer, "solved remotely");
                    return Ok((answer, AnswerSource::Remote));
                }
                Err(e) => warn!(equation, error = %e, "remote solver failed, solving locally"),
            }
        }
        let answer = symbolic_derivative(equation, &self.variable)?;
        Ok((answer, AnswerSource::Local))
    }

    pub fn check(&self, problem: &Problem, answer: &str) -> Result<Verdict, DiffError> {
        let (expected, source) = match &problem.solution {
            Some(solution) => (solution.clone(), AnswerSource::Expected),
            None => self.solve(&problem.equation)?,
        };
        let correct = answers_match(answer, &expected);
        debug!(answer, %expected, correct, "graded answer");
        Ok(Verdict {
            correct,
            expected,
            source,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct Fixed(&'static str);

    impl Solver for Fixed {
        fn derive(&self, _equation: &str, _variable: &str) -> Result<String, SolverError> {
            Ok(self.0.to_string())
        }
    }

    struct Offline;

    impl Solver for Offline {
        fn derive(&self, _equation: &str, _variable: &str) -> Result<String, SolverError> {
            Err(SolverError::Unavailable("connection refused".to_string()))
        }
    }

    fn problem(equation: &str, solution: Option<&str>) -> Problem {
        Problem {
            equation: equation.to_string(),
            solution: solution.map(str::to_string),
        }
    }

    #[test]
    fn local_solver() {
        assert_eq!(LocalSolver.derive("x^2", "x").unwrap(), "2*x");
        assert!(matches!(
            LocalSolver.derive("x=1", "x"),
            Err(SolverError::Diff(DiffError::ImplicitNotSupported))
        ));
    }

    #[test]
    fn solve_locally_without_remote() {
        let grader = Grader::new("x");
        assert_eq!(
            grader.solve("x^2 + 4*x + 1").unwrap(),
            ("2*x + 4".to_string(), AnswerSource::Local)
        );
    }

    #[test]
    fn solve_prefers_remote() {
        let grader = Grader::new("x").with_remote(Fixed("2x+4"));
        assert_eq!(
            grader.solve("x^2 + 4*x + 1").unwrap(),
            ("2x+4".to_string(), AnswerSource::Remote)
        );
    }

    #[test]
    fn solve_falls_back_when_remote_fails() {
        let grader = Grader::new("x").with_remote(Offline);
        assert_eq!(
            grader.solve("x^3").unwrap(),
            ("3*x^2".to_string(), AnswerSource::Local)
        );
    }

    #[test]
    fn local_failure_is_reported() {
        let grader = Grader::new("x").with_remote(Offline);
        assert!(matches!(
            grader.solve("sin(x)*x"),
            Err(DiffError::UnsupportedForm { .. })
        ));
    }

    #[test]
    fn check_against_static_solution() {
        let grader = Grader::new("x").with_remote(Offline);
        let p = problem("3*x^4 - 2*x^3 + 5*x^2 - 7*x + 2", Some("12*x^3 - 6*x^2 + 10*x - 7"));
        let verdict = grader.check(&p, "12x^3 - 6x^2 + 10x - 7").unwrap();
        assert!(verdict.correct);
        assert_eq!(verdict.source, AnswerSource::Expected);
    }

    #[test]
    fn static_solution_bypasses_the_engine() {
        // Implicit problems can only be graded from their static solution
        let grader = Grader::new("x");
        let p = problem("x^2 + y^2 = 16", Some("dy/dx = -x/y"));
        assert!(grader.check(&p, "dy/dx=-x/y").unwrap().correct);
        assert!(grader.check(&problem("x^2 + y^2 = 16", None), "-x/y").is_err());
    }

    #[test]
    fn check_with_computed_solution() {
        let grader = Grader::new("t");
        let p = problem("-4.9*t^2 + 20*t + 10", None);
        let verdict = grader.check(&p, "-9.8t + 20").unwrap();
        assert_eq!(
            verdict,
            Verdict {
                correct: true,
                expected: "-9.8*t + 20".to_string(),
                source: AnswerSource::Local,
            }
        );
    }

    #[test]
    fn wrong_answer() {
        let grader = Grader::new("x");
        let verdict = grader.check(&problem("x^2 + 4*x + 1", None), "2x + 1").unwrap();
        assert!(!verdict.correct);
        assert_eq!(verdict.expected, "2*x + 4");
    }
}
