//! Attribute values and instrumentation scope metadata.

use base64::Engine;
use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// Flattened attribute mapping, keyed by attribute name.
pub type Attributes = HashMap<String, AttributeValue>;

/// A decoded OTLP attribute value.
///
/// Exactly one variant is produced per wire value. [`AttributeValue::Empty`] is the
/// explicit marker for a value with no populated variant.
///
/// Values serialize as plain JSON: strings, numbers, booleans, arrays and objects.
/// Byte sequences serialize as standard base64 and `Empty` as `null`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// UTF-8 string.
    String(String),
    /// Signed 64-bit integer.
    Int(i64),
    /// Double-precision float.
    Double(f64),
    /// Boolean.
    Bool(bool),
    /// Raw byte sequence.
    #[serde(serialize_with = "serialize_bytes")]
    Bytes(Vec<u8>),
    /// Ordered list of values.
    Array(Vec<AttributeValue>),
    /// Nested key-value list.
    KvList(Attributes),
    /// No variant was populated on the wire.
    #[default]
    Empty,
}

#[allow(clippy::ptr_arg)]
fn serialize_bytes<S: Serializer>(bytes: &Vec<u8>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
}

impl AttributeValue {
    /// Returns the string value, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Converts the value into a JSON value with the same shape it serializes to.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            Self::String(s) => Value::from(s.as_str()),
            Self::Int(i) => Value::from(*i),
            Self::Double(d) => Value::from(*d),
            Self::Bool(b) => Value::from(*b),
            Self::Bytes(bytes) => {
                Value::from(base64::engine::general_purpose::STANDARD.encode(bytes))
            }
            Self::Array(values) => values.iter().map(Self::to_json).collect(),
            Self::KvList(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
            Self::Empty => Value::Null,
        }
    }

    /// Renders the value as a flat string.
    ///
    /// Strings are returned as-is; every other variant is rendered as compact JSON.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            other => other.to_json().to_string(),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Identity of the instrumentation scope that produced a group of signals.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ScopeInfo {
    /// Scope (instrumentation library) name.
    pub name: String,
    /// Scope version, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Scope attributes.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub attributes: Attributes,
}
