//! Schema configuration: built-in schema toggle and extra property entries.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ConfigError;
use crate::path::PropertyPath;
use crate::schema::{PropertyDescriptor, PropertySchema, ValueKind};
use crate::value::{json_type_name, PropertyValue};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct SchemaConfig {
    /// Start from the built-in webapp schema. Default: true.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builtin: Option<bool>,
    /// Extra leaves, declared after the built-ins (and replacing them on collision).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertyEntryConfig>,
}

/// One `[[schema.properties]]` entry.
///
/// ```toml
/// [[schema.properties]]
/// path = "settings.interface.font_size"
/// kind = "one_of"
/// values = ["s", "m", "l"]
/// default = "m"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertyEntryConfig {
    pub path: String,
    /// `"bool"` | `"string"` | `"number"` | `"integer"` | `"one_of"`.
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Allowed values for `kind = "one_of"`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<Value>,
}

impl SchemaConfig {
    pub fn effective_builtin(&self) -> bool {
        self.builtin.unwrap_or(true)
    }

    /// Build the schema described by this section.
    ///
    /// An entry whose path is an ancestor or descendant of another declared
    /// leaf is rejected: a property cannot hold a value and nested values.
    pub fn build_schema(&self) -> Result<PropertySchema, ConfigError> {
        let mut schema = if self.effective_builtin() {
            PropertySchema::webapp()
        } else {
            PropertySchema::new()
        };
        let mut declared = Vec::with_capacity(self.properties.len());
        for (index, entry) in self.properties.iter().enumerate() {
            let (path, descriptor) = entry.to_descriptor(index)?;
            declared.push((index, path.clone()));
            schema.declare(path, descriptor);
        }
        for (index, path) in &declared {
            let overlap = schema
                .iter()
                .map(|(other, _)| other)
                .find(|other| path.is_ancestor_of(other) || other.is_ancestor_of(path));
            if let Some(other) = overlap {
                return Err(ConfigError::ValidationFailed {
                    field: format!("schema.properties[{index}].path"),
                    message: format!("'{path}' overlaps declared property '{other}'"),
                });
            }
        }
        Ok(schema)
    }
}

impl PropertyEntryConfig {
    /// Convert to a schema entry. `index` names the entry in errors.
    pub fn to_descriptor(
        &self,
        index: usize,
    ) -> Result<(PropertyPath, PropertyDescriptor), ConfigError> {
        let field = |name: &str| format!("schema.properties[{index}].{name}");
        let invalid = |name: &str, message: String| ConfigError::ValidationFailed {
            field: field(name),
            message,
        };

        let path = PropertyPath::parse(&self.path).map_err(|e| invalid("path", e.to_string()))?;

        let kind = match self.kind.as_str() {
            "bool" => ValueKind::Bool,
            "string" => ValueKind::String,
            "number" => ValueKind::Number,
            "integer" => ValueKind::Integer,
            "one_of" => {
                if self.values.is_empty() {
                    return Err(invalid("values", "one_of requires at least one value".into()));
                }
                let values = self
                    .values
                    .iter()
                    .map(|v| scalar(v).map_err(|m| invalid("values", m)))
                    .collect::<Result<Vec<_>, _>>()?;
                ValueKind::OneOf(values)
            }
            other => {
                return Err(invalid(
                    "kind",
                    format!("unknown kind '{other}', expected bool, string, number, integer or one_of"),
                ))
            }
        };

        let mut descriptor = PropertyDescriptor::new(kind);
        if let Some(default) = &self.default {
            let default = scalar(default).map_err(|m| invalid("default", m))?;
            if !descriptor.kind.accepts(&default) {
                return Err(invalid(
                    "default",
                    format!("default {default} does not fit {}", descriptor.kind),
                ));
            }
            descriptor.default = Some(default);
        }

        Ok((path, descriptor))
    }
}

fn scalar(value: &Value) -> Result<PropertyValue, String> {
    PropertyValue::from_json(value.clone())
        .ok_or_else(|| format!("expected a scalar, got {}", json_type_name(value)))
}
