//! Event applier configuration.

use serde::{Deserialize, Serialize};

/// Controls how strictly the applier and bulk load treat their input.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ApplierConfig {
    /// Reject `set` events that carry no version. Default: false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reject_unversioned: Option<bool>,
    /// Reject snapshots containing leaves unknown to the schema. Default: false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validate_snapshot: Option<bool>,
}

impl ApplierConfig {
    pub fn effective_reject_unversioned(&self) -> bool {
        self.reject_unversioned.unwrap_or(false)
    }

    pub fn effective_validate_snapshot(&self) -> bool {
        self.validate_snapshot.unwrap_or(false)
    }
}
