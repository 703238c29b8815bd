//! Property descriptors: the value kind and optional default of one leaf.

use std::fmt;

use serde::Serialize;

use crate::value::PropertyValue;

/// The kind of value a property accepts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum ValueKind {
    Bool,
    String,
    /// Any JSON number.
    Number,
    /// A number with an exact `i64`/`u64` representation.
    Integer,
    /// One of a fixed set of values (enum-like properties).
    OneOf(Vec<PropertyValue>),
}

impl ValueKind {
    pub fn accepts(&self, value: &PropertyValue) -> bool {
        let json = value.as_json();
        match self {
            Self::Bool => json.is_boolean(),
            Self::String => json.is_string(),
            Self::Number => json.is_number(),
            Self::Integer => json.is_i64() || json.is_u64(),
            Self::OneOf(allowed) => allowed.iter().any(|a| a == value),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("boolean"),
            Self::String => f.write_str("string"),
            Self::Number => f.write_str("number"),
            Self::Integer => f.write_str("integer"),
            Self::OneOf(values) => {
                f.write_str("one of [")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Schema entry for one property leaf.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyDescriptor {
    #[serde(flatten)]
    pub kind: ValueKind,
    /// Fallback a collaborator may substitute when the store holds nothing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<PropertyValue>,
}

impl PropertyDescriptor {
    pub fn new(kind: ValueKind) -> Self {
        Self {
            kind,
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<PropertyValue>) -> Self {
        self.default = Some(default.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_rejects_fractions() {
        assert!(ValueKind::Integer.accepts(&PropertyValue::from(3i64)));
        assert!(!ValueKind::Integer.accepts(&PropertyValue::number(3.5).unwrap()));
        assert!(ValueKind::Number.accepts(&PropertyValue::number(3.5).unwrap()));
    }

    #[test]
    fn one_of_matches_exact_values() {
        let kind = ValueKind::OneOf(vec!["all".into(), "none".into()]);
        assert!(kind.accepts(&"all".into()));
        assert!(!kind.accepts(&"some".into()));
        assert_eq!(kind.to_string(), r#"one of ["all", "none"]"#);
    }
}
