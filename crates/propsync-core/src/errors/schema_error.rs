//! Schema lookup and value-kind errors.

use super::error_code::{self, PropsyncErrorCode};

/// Errors raised when a path or value does not match the property schema.
///
/// These indicate a schema mismatch between client and server and are
/// surfaced to the caller rather than dropped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("unknown property '{path}'")]
    UnknownProperty { path: String },

    #[error("property '{path}' expects {expected}, got {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },
}

impl PropsyncErrorCode for SchemaError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownProperty { .. } => error_code::UNKNOWN_PROPERTY,
            Self::TypeMismatch { .. } => error_code::TYPE_MISMATCH,
        }
    }
}
