//! Runtime value model
//!
//! Every property value is represented at runtime by a tagged [`Value`].
//! Type checks are exact: no implicit coercion between kinds. The typed
//! [`PropertyValue`] trait maps Rust types to their runtime kind.

use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tagged runtime representation of a property value.
///
/// Absence of a value is represented by absence of a map entry, never by a
/// dedicated variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Boolean
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point
    Float(f64),
    /// UTF-8 string
    String(String),
    /// UTC timestamp
    Timestamp(DateTime<Utc>),
    /// UUID
    Uuid(Uuid),
    /// Homogeneity is not enforced; element kinds are checked by validators
    Array(Vec<Value>),
    /// Arbitrary JSON payload
    Json(serde_json::Value),
}

impl Value {
    /// Returns the kind tag of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::Timestamp(_) => ValueKind::Timestamp,
            Value::Uuid(_) => ValueKind::Uuid,
            Value::Array(_) => ValueKind::Array,
            Value::Json(_) => ValueKind::Json,
        }
    }

    /// Returns the integer payload, if this is an `Int`
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the string payload, if this is a `String`
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Returns the boolean payload, if this is a `Bool`
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the float payload, if this is a `Float`
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Hashes this value into the given hasher.
    ///
    /// Floats are hashed by bit pattern, JSON payloads by their serialized
    /// form. Consistent with `PartialEq` for non-NaN values.
    pub(crate) fn hash_into<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Bool(v) => v.hash(state),
            Value::Int(v) => v.hash(state),
            Value::Float(v) => v.to_bits().hash(state),
            Value::String(v) => v.hash(state),
            Value::Timestamp(v) => v.timestamp_nanos_opt().hash(state),
            Value::Uuid(v) => v.hash(state),
            Value::Array(vs) => {
                vs.len().hash(state);
                for v in vs {
                    v.hash_into(state);
                }
            }
            Value::Json(v) => v.to_string().hash(state),
        }
    }
}

/// Kind tag for [`Value`] variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    String,
    Timestamp,
    Uuid,
    Array,
    Json,
}

impl ValueKind {
    /// Returns the kind name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Timestamp => "timestamp",
            ValueKind::Uuid => "uuid",
            ValueKind::Array => "array",
            ValueKind::Json => "json",
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Maps a Rust type to its runtime [`Value`] representation.
///
/// Implemented for the types a property can be declared over. `from_value`
/// returns `None` on a kind mismatch; the caller raises the typed error,
/// since only it knows which property was involved.
pub trait PropertyValue: Sized + Send + Sync + 'static {
    /// The runtime kind this type maps to
    const KIND: ValueKind;

    /// Wraps this value into its runtime representation
    fn into_value(self) -> Value;

    /// Unwraps a runtime value, or `None` if the kind does not match
    fn from_value(value: Value) -> Option<Self>;
}

impl PropertyValue for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(v),
            _ => None,
        }
    }
}

impl PropertyValue for i64 {
    const KIND: ValueKind = ValueKind::Int;

    fn into_value(self) -> Value {
        Value::Int(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Int(v) => Some(v),
            _ => None,
        }
    }
}

impl PropertyValue for f64 {
    const KIND: ValueKind = ValueKind::Float;

    fn into_value(self) -> Value {
        Value::Float(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(v),
            _ => None,
        }
    }
}

impl PropertyValue for String {
    const KIND: ValueKind = ValueKind::String;

    fn into_value(self) -> Value {
        Value::String(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(v) => Some(v),
            _ => None,
        }
    }
}

impl PropertyValue for DateTime<Utc> {
    const KIND: ValueKind = ValueKind::Timestamp;

    fn into_value(self) -> Value {
        Value::Timestamp(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Timestamp(v) => Some(v),
            _ => None,
        }
    }
}

impl PropertyValue for Uuid {
    const KIND: ValueKind = ValueKind::Uuid;

    fn into_value(self) -> Value {
        Value::Uuid(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Uuid(v) => Some(v),
            _ => None,
        }
    }
}

impl PropertyValue for Vec<Value> {
    const KIND: ValueKind = ValueKind::Array;

    fn into_value(self) -> Value {
        Value::Array(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }
}

impl PropertyValue for serde_json::Value {
    const KIND: ValueKind = ValueKind::Json;

    fn into_value(self) -> Value {
        Value::Json(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Json(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(Value::Int(1).kind(), ValueKind::Int);
        assert_eq!(Value::String("a".into()).kind(), ValueKind::String);
        assert_eq!(Value::Bool(true).kind(), ValueKind::Bool);
        assert_eq!(Value::Array(vec![]).kind(), ValueKind::Array);
    }

    #[test]
    fn test_typed_round_trip() {
        let v = 42i64.into_value();
        assert_eq!(i64::from_value(v), Some(42));

        let v = "hello".to_string().into_value();
        assert_eq!(String::from_value(v), Some("hello".to_string()));
    }

    #[test]
    fn test_kind_mismatch_is_none() {
        assert_eq!(i64::from_value(Value::String("42".into())), None);
        assert_eq!(bool::from_value(Value::Int(1)), None);
    }

    #[test]
    fn test_type_names() {
        assert_eq!(ValueKind::Int.type_name(), "int");
        assert_eq!(ValueKind::Timestamp.type_name(), "timestamp");
    }

    #[test]
    fn test_serde_tagged_form() {
        let v = Value::Int(7);
        let json = serde_json::to_string(&v).unwrap();
        assert!(json.contains("\"kind\":\"int\""));

        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }
}
