//! Property validators
//!
//! A validator is a pure predicate over the current (possibly absent) value
//! of a property. Absent values pass every validator except [`Validator::required`],
//! so optional properties stay optional unless explicitly required.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use super::errors::ValidationError;
use super::value::Value;

type CheckFn = Arc<dyn Fn(Option<&Value>) -> bool + Send + Sync>;

/// A named validation rule attached to a property.
#[derive(Clone)]
pub struct Validator {
    message: String,
    check: CheckFn,
}

impl Validator {
    /// Create a validator from a predicate.
    ///
    /// The predicate receives the current value, or `None` when the property
    /// has no value.
    pub fn new(
        message: impl Into<String>,
        check: impl Fn(Option<&Value>) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            check: Arc::new(check),
        }
    }

    /// Run this validator against a property's current value
    pub fn validate(&self, property: &str, value: Option<&Value>) -> Result<(), ValidationError> {
        if (self.check)(value) {
            Ok(())
        } else {
            Err(ValidationError::violation(property, &self.message))
        }
    }

    /// The failure message of this validator
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Rejects absent values
    pub fn required() -> Self {
        Self::new("value is required", |v| v.is_some())
    }

    /// Numeric lower bound, inclusive. Non-numeric values fail.
    pub fn min(bound: i64) -> Self {
        Self::new(format!("value must be >= {}", bound), move |v| match v {
            None => true,
            Some(Value::Int(n)) => *n >= bound,
            Some(Value::Float(n)) => *n >= bound as f64,
            Some(_) => false,
        })
    }

    /// Numeric upper bound, inclusive. Non-numeric values fail.
    pub fn max(bound: i64) -> Self {
        Self::new(format!("value must be <= {}", bound), move |v| match v {
            None => true,
            Some(Value::Int(n)) => *n <= bound,
            Some(Value::Float(n)) => *n <= bound as f64,
            Some(_) => false,
        })
    }

    /// Strict numeric upper bound
    pub fn less_than(bound: i64) -> Self {
        Self::new(format!("value must be < {}", bound), move |v| match v {
            None => true,
            Some(Value::Int(n)) => *n < bound,
            Some(Value::Float(n)) => *n < bound as f64,
            Some(_) => false,
        })
    }

    /// Strict numeric lower bound
    pub fn greater_than(bound: i64) -> Self {
        Self::new(format!("value must be > {}", bound), move |v| match v {
            None => true,
            Some(Value::Int(n)) => *n > bound,
            Some(Value::Float(n)) => *n > bound as f64,
            Some(_) => false,
        })
    }

    /// Rejects empty strings and empty arrays
    pub fn not_empty() -> Self {
        Self::new("value must not be empty", |v| match v {
            None => true,
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(a)) => !a.is_empty(),
            Some(_) => false,
        })
    }

    /// Maximum string length in characters
    pub fn max_length(limit: usize) -> Self {
        Self::new(format!("value must be at most {} characters", limit), move |v| {
            match v {
                None => true,
                Some(Value::String(s)) => s.chars().count() <= limit,
                Some(_) => false,
            }
        })
    }

    /// String values must match the given regular expression
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        let re = Regex::new(pattern)?;
        Ok(Self::new(
            format!("value must match pattern '{}'", pattern),
            move |v| match v {
                None => true,
                Some(Value::String(s)) => re.is_match(s),
                Some(_) => false,
            },
        ))
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("message", &self.message)
            .finish()
    }
}
