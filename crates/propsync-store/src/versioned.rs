//! Version-gated property leaf.
//!
//! Each leaf carries the value and the version of the write that produced
//! it. A write is admitted unless the held version is strictly greater than
//! the incoming one. An incoming write without a version is always admitted.
//!
//! Unlike a timestamped LWW register there is no tie-break: equal versions
//! admit the incoming write, so a replayed event rewrites the same value.

use propsync_core::{NoOpReason, PropertyValue, Version};

#[derive(Debug, Clone, PartialEq)]
pub struct VersionedValue {
    value: PropertyValue,
    version: Option<Version>,
}

impl VersionedValue {
    pub fn new(value: PropertyValue, version: Option<Version>) -> Self {
        Self { value, version }
    }

    /// A leaf from a bootstrap snapshot: no version marker.
    pub fn unversioned(value: PropertyValue) -> Self {
        Self {
            value,
            version: None,
        }
    }

    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    pub fn version(&self) -> Option<Version> {
        self.version
    }

    pub fn into_value(self) -> PropertyValue {
        self.value
    }

    /// Whether a write carrying `incoming` may replace this leaf.
    ///
    /// Returns `Err(NoOpReason::Stale)` when the held version is strictly greater.
    pub fn admits(&self, incoming: Option<Version>) -> Result<(), NoOpReason> {
        match (self.version, incoming) {
            (Some(current), Some(incoming)) if current > incoming => {
                Err(NoOpReason::Stale { current, incoming })
            }
            _ => Ok(()),
        }
    }

    /// The version marker after admitting a write carrying `incoming`.
    ///
    /// An unversioned write keeps the held marker, so later stale events
    /// still lose.
    pub fn next_version(&self, incoming: Option<Version>) -> Option<Version> {
        incoming.or(self.version)
    }
}
