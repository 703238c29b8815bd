//! # propsync-core
//!
//! Foundation crate for the propsync property reconciliation store.
//! Defines property paths, values, events, the property schema, errors,
//! config, and tracing setup. Every other crate in the workspace depends on this.

pub mod config;
pub mod errors;
pub mod event;
pub mod logging;
pub mod path;
pub mod schema;
pub mod value;

// Re-export the most commonly used types at the crate root.
pub use config::PropsyncConfig;
pub use errors::{PropsyncError, PropsyncResult};
pub use event::{
    AppliedChange, ApplyOutcome, ChangeNotification, NoOpReason, PropertyEvent,
    RawPropertyEvent, Version, WEBAPP_DOCUMENT_KEY,
};
pub use path::PropertyPath;
pub use schema::{
    ConsentValue, PropertyDescriptor, PropertySchema, ReceiptMode, TypingIndicatorMode, ValueKind,
};
pub use value::PropertyValue;
