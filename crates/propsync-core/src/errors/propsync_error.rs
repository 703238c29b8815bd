//! Top-level error aggregating every propsync concern via `From` conversions.

use super::error_code::PropsyncErrorCode;
use super::{ApplyError, ConfigError, EventError, PathError, SchemaError, SnapshotError};

#[derive(Debug, thiserror::Error)]
pub enum PropsyncError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Event(#[from] EventError),

    #[error(transparent)]
    Apply(#[from] ApplyError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl PropsyncError {
    /// True for errors the caller should log as a client/server schema mismatch.
    pub fn is_schema_mismatch(&self) -> bool {
        matches!(
            self,
            Self::Schema(SchemaError::UnknownProperty { .. })
                | Self::Snapshot(SnapshotError::UnknownProperty { .. })
        )
    }
}

impl PropsyncErrorCode for PropsyncError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Path(e) => e.error_code(),
            Self::Schema(e) => e.error_code(),
            Self::Event(e) => e.error_code(),
            Self::Apply(e) => e.error_code(),
            Self::Snapshot(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
        }
    }
}

pub type PropsyncResult<T> = Result<T, PropsyncError>;
