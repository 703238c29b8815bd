//! Errors raised while applying an event to the store.

use super::error_code::{self, PropsyncErrorCode};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
    /// An ancestor of the target path holds a scalar leaf.
    #[error("cannot write '{path}': ancestor '{blocking}' holds a value")]
    PathConflict { path: String, blocking: String },

    /// The target path currently holds nested values.
    #[error("cannot write '{path}': it holds {leaves} nested value(s)")]
    BranchConflict { path: String, leaves: usize },

    #[error("unversioned write to '{path}' rejected")]
    UnversionedWrite { path: String },
}

impl PropsyncErrorCode for ApplyError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::PathConflict { .. } | Self::BranchConflict { .. } => error_code::PATH_CONFLICT,
            Self::UnversionedWrite { .. } => error_code::UNVERSIONED_WRITE,
        }
    }
}
