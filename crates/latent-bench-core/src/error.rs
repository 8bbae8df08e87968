use thiserror::Error;

/// Core error type for fitting, scoring and numerical routines.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BenchError {
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Singular matrix: cannot invert or decompose")]
    SingularMatrix,

    #[error("Model not fitted")]
    NotFitted,

    #[error("Empty input")]
    EmptyInput,

    #[error("Unknown label: {0}")]
    UnknownLabel(String),
}

pub type BenchResult<T> = Result<T, BenchError>;

impl BenchError {
    pub fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        BenchError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
