//! Property schema: which leaf paths exist and what values they accept.
//!
//! The applier consults the schema before touching the store. A path with
//! no schema entry is an [`SchemaError::UnknownProperty`]. Defaults live
//! here too, for collaborators; the store itself never substitutes them.

pub mod descriptor;
pub mod webapp;

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::errors::SchemaError;
use crate::path::PropertyPath;
use crate::value::PropertyValue;

pub use descriptor::{PropertyDescriptor, ValueKind};
pub use webapp::{ConsentValue, ReceiptMode, TypingIndicatorMode};

/// The set of known property leaves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertySchema {
    entries: BTreeMap<PropertyPath, PropertyDescriptor>,
}

impl PropertySchema {
    /// An empty schema. Every path is unknown.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in schema for the client's account properties.
    pub fn webapp() -> Self {
        let mut schema = Self::new();
        for (path, descriptor) in webapp::builtin_entries() {
            schema.declare(path, descriptor);
        }
        schema
    }

    /// Declare a leaf, returning the descriptor it replaced.
    pub fn declare(
        &mut self,
        path: PropertyPath,
        descriptor: PropertyDescriptor,
    ) -> Option<PropertyDescriptor> {
        self.entries.insert(path, descriptor)
    }

    /// Look up a declared leaf. Ancestors of a leaf are not leaves.
    pub fn lookup(&self, path: &PropertyPath) -> Result<&PropertyDescriptor, SchemaError> {
        self.entries
            .get(path)
            .ok_or_else(|| SchemaError::UnknownProperty {
                path: path.to_dotted(),
            })
    }

    /// Check that `value` fits the declared kind of `path`.
    pub fn check(&self, path: &PropertyPath, value: &PropertyValue) -> Result<(), SchemaError> {
        let descriptor = self.lookup(path)?;
        if descriptor.kind.accepts(value) {
            Ok(())
        } else {
            Err(SchemaError::TypeMismatch {
                path: path.to_dotted(),
                expected: descriptor.kind.to_string(),
                found: value.to_string(),
            })
        }
    }

    pub fn contains(&self, path: &PropertyPath) -> bool {
        self.entries.contains_key(path)
    }

    /// The declared default, if any.
    pub fn default_for(&self, path: &PropertyPath) -> Option<PropertyValue> {
        self.entries.get(path).and_then(|d| d.default.clone())
    }

    /// `stored` if present, otherwise the declared default.
    pub fn value_or_default(
        &self,
        stored: Option<PropertyValue>,
        path: &PropertyPath,
    ) -> Option<PropertyValue> {
        stored.or_else(|| self.default_for(path))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PropertyPath, &PropertyDescriptor)> {
        self.entries.iter()
    }
}

impl Serialize for PropertySchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (path, descriptor) in &self.entries {
            map.serialize_entry(&path.to_dotted(), descriptor)?;
        }
        map.end()
    }
}
