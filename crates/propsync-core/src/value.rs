//! Scalar property values.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A JSON scalar held at a property leaf: boolean, number, or string.
///
/// `null`, arrays, and objects are never property values.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyValue(Value);

impl PropertyValue {
    /// Wrap a JSON value, returning `None` if it is not a scalar.
    ///
    /// Floats with no fractional part that fit an `i64` are stored as
    /// integers, so `1.0` and `1` compare equal.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Self(Value::Number(integral(n)))),
            Value::Bool(_) | Value::String(_) => Some(Self(value)),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// A number value; `None` for NaN and infinities.
    pub fn number(n: f64) -> Option<Self> {
        serde_json::Number::from_f64(n).map(|n| Self(Value::Number(integral(n))))
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn into_json(self) -> Value {
        self.0
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.0.as_bool()
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_str()
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.0.as_i64()
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.0.as_f64()
    }

    /// Name of the JSON type, as used in error messages.
    pub fn kind_name(&self) -> &'static str {
        json_type_name(&self.0)
    }
}

fn integral(n: serde_json::Number) -> serde_json::Number {
    let in_range = |f: f64| f >= i64::MIN as f64 && f < i64::MAX as f64;
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && in_range(f) => {
            serde_json::Number::from(f as i64)
        }
        _ => n,
    }
}

/// Name of a JSON value's type: `null`, `boolean`, `number`, `string`, `array`, `object`.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        Self(Value::Bool(v))
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        Self(Value::from(v))
    }
}

impl From<u64> for PropertyValue {
    fn from(v: u64) -> Self {
        Self(Value::from(v))
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self(Value::String(v.to_string()))
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        Self(Value::String(v))
    }
}

impl From<PropertyValue> for Value {
    fn from(v: PropertyValue) -> Self {
        v.0
    }
}

impl Serialize for PropertyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PropertyValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let found = json_type_name(&value);
        Self::from_json(value).ok_or_else(|| {
            serde::de::Error::custom(format!("property value must be a scalar, got {found}"))
        })
    }
}
