use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[error("Unexpected token '{found}'")]
pub struct UnexpectedTokenError {
    pub found: String,

    #[source_code]
    pub src: NamedSource<String>,
    #[label("{message}")]
    pub token: SourceSpan,

    pub message: String,
}

#[derive(Debug, Diagnostic, Error)]
#[error("Unknown identifier '{name}'")]
#[diagnostic(help("only the declared variable and sin, cos, tan, log, ln, sqrt, abs, exp are allowed"))]
pub struct UnknownIdentifierError {
    pub name: String,

    #[source_code]
    pub src: NamedSource<String>,
    #[label("not the variable '{variable}' or a known function")]
    pub span: SourceSpan,

    pub variable: String,
}

#[derive(Debug, Diagnostic, Error)]
#[error("Unbalanced parentheses")]
pub struct UnbalancedParensError {
    #[source_code]
    pub src: NamedSource<String>,
    #[label("{message}")]
    pub paren: SourceSpan,

    pub message: String,
}

#[derive(Debug, Diagnostic, Error)]
pub enum ParseError {
    #[error("{0}")]
    #[diagnostic(transparent)]
    UnexpectedToken(Box<UnexpectedTokenError>),
    #[error("{0}")]
    #[diagnostic(transparent)]
    UnknownIdentifier(Box<UnknownIdentifierError>),
    #[error("{0}")]
    #[diagnostic(transparent)]
    UnbalancedParens(Box<UnbalancedParensError>),
}

impl ParseError {
    pub fn unexpected(src: &str, span: (usize, usize), found: &str, message: &str) -> Self {
        ParseError::UnexpectedToken(Box::new(UnexpectedTokenError {
            found: found.to_string(),
            src: NamedSource::new("input", src.to_string()),
            token: span.into(),
            message: message.to_string(),
        }))
    }

    pub fn unknown_identifier(src: &str, span: (usize, usize), name: &str, variable: &str) -> Self {
        ParseError::UnknownIdentifier(Box::new(UnknownIdentifierError {
            name: name.to_string(),
            src: NamedSource::new("input", src.to_string()),
            span: span.into(),
            variable: variable.to_string(),
        }))
    }

    pub fn unbalanced(src: &str, span: (usize, usize), message: &str) -> Self {
        ParseError::UnbalancedParens(Box::new(UnbalancedParensError {
            src: NamedSource::new("input", src.to_string()),
            paren: span.into(),
            message: message.to_string(),
        }))
    }
}

/// A value outside the real domain of an operation. Evaluation never hands back
/// `NaN` or an infinity in its place.
#[derive(Debug, Diagnostic, Error, Clone, Copy, PartialEq)]
pub enum DomainError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("logarithm of non-positive value {0}")]
    LogOfNonPositive(f64),
    #[error("square root of negative value {0}")]
    SqrtOfNegative(f64),
    #[error("result is not a finite number")]
    NonFinite,
    #[error("step {0} must be finite and positive")]
    InvalidStep(f64),
}

#[derive(Debug, Diagnostic, Error)]
pub enum DiffError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),
    #[error("cannot differentiate '{term}': only terms of the form c*x^n are supported")]
    UnsupportedForm { term: String },
    #[error("equations need implicit differentiation, which is not supported")]
    #[diagnostic(help("pass an expression such as 'x^2 + 3*x' without '='"))]
    ImplicitNotSupported,
}
