//! Property value converters
//!
//! A converter maps between the logical representation a property exposes to
//! callers and the model representation stored in a box and handed to
//! backends. Conversion is a pure function pair; `from_model(to_model(x)) == x`
//! must hold for every representable `x`.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use super::value::{Value, ValueKind};

type ConvertFn = Arc<dyn Fn(Value) -> Result<Value, String> + Send + Sync>;

/// Bidirectional converter between logical and model value representations.
#[derive(Clone)]
pub struct ValueConverter {
    logical_kind: ValueKind,
    model_kind: ValueKind,
    to_model: ConvertFn,
    from_model: ConvertFn,
}

impl ValueConverter {
    /// Create a converter from a function pair.
    ///
    /// `to_model` receives a value of the logical kind, `from_model` a value
    /// of the model kind. Both must be pure.
    pub fn new(
        logical_kind: ValueKind,
        model_kind: ValueKind,
        to_model: impl Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
        from_model: impl Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            logical_kind,
            model_kind,
            to_model: Arc::new(to_model),
            from_model: Arc::new(from_model),
        }
    }

    /// The kind callers see through the typed property API
    pub fn logical_kind(&self) -> ValueKind {
        self.logical_kind
    }

    /// The kind stored in boxes and projected to backends
    pub fn model_kind(&self) -> ValueKind {
        self.model_kind
    }

    /// Convert a logical value to its model representation
    pub fn to_model(&self, value: Value) -> Result<Value, String> {
        (self.to_model)(value)
    }

    /// Convert a model value back to its logical representation
    pub fn from_model(&self, value: Value) -> Result<Value, String> {
        (self.from_model)(value)
    }

    /// Boolean stored as an integer: `true` ⇔ 1, `false` ⇔ 0.
    ///
    /// Reading accepts any non-zero integer as `true`.
    pub fn numeric_boolean() -> Self {
        Self::new(
            ValueKind::Bool,
            ValueKind::Int,
            |v| match v {
                Value::Bool(b) => Ok(Value::Int(if b { 1 } else { 0 })),
                other => Err(format!("expected bool, got {}", other.kind())),
            },
            |v| match v {
                Value::Int(n) => Ok(Value::Bool(n != 0)),
                other => Err(format!("expected int, got {}", other.kind())),
            },
        )
    }

    /// UUID stored as its canonical hyphenated string
    pub fn uuid_string() -> Self {
        Self::new(
            ValueKind::Uuid,
            ValueKind::String,
            |v| match v {
                Value::Uuid(u) => Ok(Value::String(u.to_string())),
                other => Err(format!("expected uuid, got {}", other.kind())),
            },
            |v| match v {
                Value::String(s) => Uuid::parse_str(&s)
                    .map(Value::Uuid)
                    .map_err(|e| format!("invalid uuid '{}': {}", s, e)),
                other => Err(format!("expected string, got {}", other.kind())),
            },
        )
    }

    /// Timestamp stored as epoch milliseconds
    pub fn timestamp_epoch_millis() -> Self {
        Self::new(
            ValueKind::Timestamp,
            ValueKind::Int,
            |v| match v {
                Value::Timestamp(t) => Ok(Value::Int(t.timestamp_millis())),
                other => Err(format!("expected timestamp, got {}", other.kind())),
            },
            |v| match v {
                Value::Int(ms) => chrono::DateTime::from_timestamp_millis(ms)
                    .map(Value::Timestamp)
                    .ok_or_else(|| format!("epoch millis out of range: {}", ms)),
                other => Err(format!("expected int, got {}", other.kind())),
            },
        )
    }
}

impl fmt::Debug for ValueConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueConverter")
            .field("logical_kind", &self.logical_kind)
            .field("model_kind", &self.model_kind)
            .finish()
    }
}
