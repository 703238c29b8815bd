//! Malformed property path errors.

use super::error_code::{self, PropsyncErrorCode};

/// A dotted key that cannot be turned into a [`PropertyPath`](crate::PropertyPath).
///
/// Always a permanent rejection of the one event carrying the key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("malformed property path: key is empty")]
    Empty,

    #[error("malformed property path '{raw}': segment {index} is empty")]
    EmptySegment { raw: String, index: usize },

    /// A pre-split segment that itself contains `.`.
    #[error("malformed property path: segment '{segment}' contains '.'")]
    DottedSegment { segment: String },
}

impl PropsyncErrorCode for PathError {
    fn error_code(&self) -> &'static str {
        error_code::MALFORMED_PATH
    }
}
