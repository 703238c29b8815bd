//! Bulk-load snapshot errors.

use super::error_code::{self, PropsyncErrorCode};
use super::SchemaError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot leaf '{path}' is not a scalar")]
    NonScalarLeaf { path: String },

    /// A key that is empty or contains `.` cannot be addressed by a path.
    #[error("snapshot key '{key}' under '{parent}' is not a valid path segment")]
    InvalidKey { parent: String, key: String },

    #[error("snapshot leaf '{path}' is not a known property")]
    UnknownProperty { path: String },

    #[error("snapshot leaf rejected: {0}")]
    Schema(SchemaError),

    #[error("snapshot could not be parsed: {0}")]
    Parse(String),
}

impl PropsyncErrorCode for SnapshotError {
    fn error_code(&self) -> &'static str {
        error_code::INVALID_SNAPSHOT
    }
}
