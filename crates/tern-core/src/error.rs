use thiserror::Error;

/// Errors raised by the value core. Raised at the point of detection and
/// expected to propagate to the language's own error-handling layer; the core
/// never retries or substitutes defaults.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TernError {
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("Arity mismatch: {0}")]
    Arity(String),

    #[error("Range error: {0}")]
    Range(String),

    #[error("Unsupported conversion: {0}")]
    UnsupportedConversion(String),

    #[error("{0}")]
    Message(String),
}

impl TernError {
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        TernError::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn arity(message: impl Into<String>) -> Self {
        TernError::Arity(message.into())
    }

    pub fn range(message: impl Into<String>) -> Self {
        TernError::Range(message.into())
    }

    pub fn conversion(message: impl Into<String>) -> Self {
        TernError::UnsupportedConversion(message.into())
    }

    pub fn message(message: impl Into<String>) -> Self {
        TernError::Message(message.into())
    }
}

impl From<String> for TernError {
    fn from(s: String) -> Self {
        TernError::message(s)
    }
}

impl From<&str> for TernError {
    fn from(s: &str) -> Self {
        TernError::message(s.to_string())
    }
}
