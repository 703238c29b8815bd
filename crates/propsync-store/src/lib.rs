//! # propsync-store
//!
//! The reconciliation core: a nested property tree with per-leaf version
//! markers, the event applier that mutates it under
//! last-writer-by-version-wins, and the synchronous subscription registry.
//!
//! Everything here is single-threaded. [`PropertySession`] ties the parts
//! together and is the type collaborators hold.

pub mod applier;
pub mod registry;
pub mod session;
pub mod store;
pub mod versioned;

pub use applier::{ApplierOptions, BatchFailure, BatchReport, EventApplier};
pub use registry::{SubscriptionHandle, SubscriptionRegistry};
pub use session::PropertySession;
pub use store::PropertyStore;
pub use versioned::VersionedValue;
