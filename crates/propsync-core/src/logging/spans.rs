//! Span definitions per operation: apply, bulk load, notify.
//!
//! Each span carries its metadata via the `tracing` crate.

/// Create an apply span for one event.
#[macro_export]
macro_rules! apply_span {
    ($kind:expr, $path:expr) => {
        tracing::debug_span!("propsync.apply", kind = $kind, path = %$path)
    };
}

/// Create a bulk-load span.
#[macro_export]
macro_rules! bulk_load_span {
    ($top_level_keys:expr) => {
        tracing::info_span!("propsync.bulk_load", top_level_keys = $top_level_keys)
    };
}

/// Create a notification-pass span.
#[macro_export]
macro_rules! notify_span {
    ($path:expr, $subscribers:expr) => {
        tracing::debug_span!("propsync.notify", path = %$path, subscribers = $subscribers)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const APPLY: &str = "propsync.apply";
    pub const BULK_LOAD: &str = "propsync.bulk_load";
    pub const NOTIFY: &str = "propsync.notify";
}
