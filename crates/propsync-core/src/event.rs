//! Property change events and the records produced by applying them.
//!
//! [`RawPropertyEvent`] is the wire shape delivered by the session layer.
//! [`PropertyEvent`] is the validated, typed form the applier consumes.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{EventError, PropsyncError};
use crate::path::PropertyPath;
use crate::value::{json_type_name, PropertyValue};

/// Key under which the backend sends the web app's property document.
pub const WEBAPP_DOCUMENT_KEY: &str = "webapp";

/// Per-path write version issued by the originating session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(pub u64);

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Wire shape of a property event.
///
/// Uses `#[serde(tag = "type")]`, so a set event reads as
/// `{"type": "set", "key": "settings.sound.alerts", "value": "all", "version": 3}`.
/// The backend's `user.properties-set` / `user.properties-delete` type names
/// are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RawPropertyEvent {
    #[serde(rename = "set", alias = "user.properties-set")]
    Set {
        key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version: Option<u64>,
    },
    /// Any `value` or `version` on a delete is ignored.
    #[serde(rename = "delete", alias = "user.properties-delete")]
    Delete { key: String },
}

impl RawPropertyEvent {
    pub fn key(&self) -> &str {
        match self {
            Self::Set { key, .. } | Self::Delete { key } => key,
        }
    }
}

/// A validated property event.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyEvent {
    /// Write `value` at `path`. `version: None` applies unconditionally.
    Set {
        path: PropertyPath,
        value: PropertyValue,
        version: Option<Version>,
    },
    /// Remove the leaf at `path`.
    Delete { path: PropertyPath },
}

impl PropertyEvent {
    pub fn set(path: PropertyPath, value: impl Into<PropertyValue>, version: Option<u64>) -> Self {
        Self::Set {
            path,
            value: value.into(),
            version: version.map(Version),
        }
    }

    pub fn delete(path: PropertyPath) -> Self {
        Self::Delete { path }
    }

    pub fn path(&self) -> &PropertyPath {
        match self {
            Self::Set { path, .. } | Self::Delete { path } => path,
        }
    }

    /// `"set"` or `"delete"`, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Set { .. } => "set",
            Self::Delete { .. } => "delete",
        }
    }

    /// Resolve the key and validate the payload of a wire event.
    pub fn try_from_raw(raw: RawPropertyEvent) -> Result<Self, PropsyncError> {
        match raw {
            RawPropertyEvent::Set {
                key,
                value,
                version,
            } => {
                let path = PropertyPath::parse(&key)?;
                let value = match value {
                    None => return Err(EventError::MissingValue { path: key }.into()),
                    Some(v) => {
                        let found = json_type_name(&v);
                        PropertyValue::from_json(v).ok_or_else(|| EventError::NonScalarValue {
                            path: key,
                            found: found.to_string(),
                        })?
                    }
                };
                Ok(Self::Set {
                    path,
                    value,
                    version: version.map(Version),
                })
            }
            RawPropertyEvent::Delete { key } => Ok(Self::Delete {
                path: PropertyPath::parse(&key)?,
            }),
        }
    }

    /// Expand a wire event into leaf events.
    ///
    /// A `set` on [`WEBAPP_DOCUMENT_KEY`] whose value is an object carries a
    /// partial property tree rooted at the top of the store, plus an optional
    /// `version` field. It becomes one `set` per leaf in path order, each
    /// carrying the embedded version, or the event's own when there is none.
    /// Any other event expands to exactly its [`try_from_raw`](Self::try_from_raw) form.
    pub fn expand_raw(raw: RawPropertyEvent) -> Result<Vec<Self>, PropsyncError> {
        match raw {
            RawPropertyEvent::Set {
                key,
                value: Some(Value::Object(document)),
                version,
            } if key == WEBAPP_DOCUMENT_KEY => expand_document(document, version),
            other => Ok(vec![Self::try_from_raw(other)?]),
        }
    }
}

impl TryFrom<RawPropertyEvent> for PropertyEvent {
    type Error = PropsyncError;

    fn try_from(raw: RawPropertyEvent) -> Result<Self, Self::Error> {
        Self::try_from_raw(raw)
    }
}

/// An event that changed the store.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedChange {
    pub path: PropertyPath,
    pub old_value: Option<PropertyValue>,
    /// `None` when the leaf was deleted.
    pub new_value: Option<PropertyValue>,
    /// Version marker held by the leaf after the change.
    pub version: Option<Version>,
}

/// Why an event left the store's observable state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOpReason {
    /// The held version is strictly greater than the incoming one.
    Stale { current: Version, incoming: Version },
    /// The incoming value equals the held value.
    Unchanged,
    /// Delete of a leaf that does not exist.
    Absent,
}

/// Result of applying one event.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    Applied(AppliedChange),
    NoOp(NoOpReason),
}

impl ApplyOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    pub fn change(&self) -> Option<&AppliedChange> {
        match self {
            Self::Applied(change) => Some(change),
            Self::NoOp(_) => None,
        }
    }
}

/// What a subscriber receives for each applied change.
///
/// `path` is the changed leaf, also for subscribers registered on an ancestor.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeNotification {
    pub path: PropertyPath,
    pub old_value: Option<PropertyValue>,
    pub new_value: Option<PropertyValue>,
}

impl From<&AppliedChange> for ChangeNotification {
    fn from(change: &AppliedChange) -> Self {
        Self {
            path: change.path.clone(),
            old_value: change.old_value.clone(),
            new_value: change.new_value.clone(),
        }
    }
}

fn expand_document(
    mut document: Map<String, Value>,
    outer: Option<u64>,
) -> Result<Vec<PropertyEvent>, PropsyncError> {
    let version = match document.remove("version") {
        None => outer,
        Some(v) => Some(v.as_u64().ok_or_else(|| EventError::InvalidDocumentVersion {
            found: v.to_string(),
        })?),
    };
    let mut events = Vec::new();
    flatten_document(document, &mut Vec::new(), version.map(Version), &mut events)?;
    Ok(events)
}

fn flatten_document(
    map: Map<String, Value>,
    prefix: &mut Vec<String>,
    version: Option<Version>,
    out: &mut Vec<PropertyEvent>,
) -> Result<(), PropsyncError> {
    for (key, value) in map {
        prefix.push(key);
        match value {
            Value::Object(children) => flatten_document(children, prefix, version, out)?,
            leaf => {
                let path = PropertyPath::from_segments(prefix.iter().cloned())?;
                let found = json_type_name(&leaf);
                let value =
                    PropertyValue::from_json(leaf).ok_or_else(|| EventError::NonScalarValue {
                        path: path.to_dotted(),
                        found: found.to_string(),
                    })?;
                out.push(PropertyEvent::Set {
                    path,
                    value,
                    version,
                });
            }
        }
        prefix.pop();
    }
    Ok(())
}
