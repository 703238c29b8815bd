//! Wire event validation errors.

use super::error_code::{self, PropsyncErrorCode};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    #[error("set event for '{path}' carries no value")]
    MissingValue { path: String },

    #[error("value for '{path}' must be a scalar, got {found}")]
    NonScalarValue { path: String, found: String },

    #[error("property document version must be a non-negative integer, got {found}")]
    InvalidDocumentVersion { found: String },
}

impl PropsyncErrorCode for EventError {
    fn error_code(&self) -> &'static str {
        error_code::INVALID_EVENT
    }
}
