//! Stable error codes, one per error concern.
//!
//! Codes are what telemetry and the CLI report; `Display` text may change.

/// Maps an error to a stable, machine-readable code.
pub trait PropsyncErrorCode {
    fn error_code(&self) -> &'static str;
}

pub const MALFORMED_PATH: &str = "MALFORMED_PATH";
pub const UNKNOWN_PROPERTY: &str = "UNKNOWN_PROPERTY";
pub const TYPE_MISMATCH: &str = "TYPE_MISMATCH";
pub const INVALID_EVENT: &str = "INVALID_EVENT";
pub const PATH_CONFLICT: &str = "PATH_CONFLICT";
pub const UNVERSIONED_WRITE: &str = "UNVERSIONED_WRITE";
pub const INVALID_SNAPSHOT: &str = "INVALID_SNAPSHOT";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
