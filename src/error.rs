//! Error types shared by the constraint handlers, the linear solver
//! and the QP solver container.

use crate::algebra::SparseFormatError;
use crate::ksp::ConvergedReason;
use thiserror::Error;

/// Error type returned by settings builders when a field fails validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// A settings field has an invalid value
    #[error("Bad value for field \"{0}\"")]
    BadFieldValue(&'static str),
}

/// Error type returned by all fallible operations in this crate.
#[derive(Error, Debug)]
pub enum QpError {
    /// A required argument was missing or out of range
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Arguments were individually valid but inconsistent with each
    /// other or with objects they are combined with
    #[error("Incompatible arguments: {0}")]
    IncompatibleArgument(String),

    /// A type specific routine was called on an object of a different type
    #[error("This is a {expected} specific routine! (called as {routine})")]
    UnsupportedOperation {
        routine: &'static str,
        expected: &'static str,
    },

    /// The inner linear solver stopped with a numerical failure
    #[error("Linear solve failed: {reason}")]
    LinearSolveFailure { reason: ConvergedReason },

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    SparseFormat(#[from] SparseFormatError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl QpError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        QpError::InvalidArgument(msg.into())
    }

    pub(crate) fn incompatible(msg: impl Into<String>) -> Self {
        QpError::IncompatibleArgument(msg.into())
    }
}

/// Result type used throughout the crate
pub type QpResult<R> = Result<R, QpError>;

#[test]
fn test_error_messages() {
    let e = QpError::UnsupportedOperation {
        routine: "ksp_set_type",
        expected: "ksp",
    };
    assert!(e.to_string().starts_with("This is a ksp specific routine!"));

    let e: QpError = SettingsError::BadFieldValue("rtol").into();
    assert_eq!(e.to_string(), "Bad value for field \"rtol\"");
}
