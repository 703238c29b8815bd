//! Error handling for propsync.
//! One error enum per concern, `thiserror` only. `PropsyncError` aggregates them.

pub mod apply_error;
pub mod config_error;
pub mod error_code;
pub mod event_error;
pub mod path_error;
pub mod propsync_error;
pub mod schema_error;
pub mod snapshot_error;

pub use apply_error::ApplyError;
pub use config_error::ConfigError;
pub use error_code::PropsyncErrorCode;
pub use event_error::EventError;
pub use path_error::PathError;
pub use propsync_error::{PropsyncError, PropsyncResult};
pub use schema_error::SchemaError;
pub use snapshot_error::SnapshotError;
