//! Property model errors
//!
//! Capability violations (wrong set, read-only, kind mismatch) are caller
//! bugs and are raised immediately. Conversion and validation failures are
//! surfaced at the point of `set`/`validate` and never recovered implicitly.

use thiserror::Error;

use super::value::ValueKind;

/// Result type for property operations
pub type PropertyResult<T> = Result<T, PropertyError>;

/// Property access, conversion and validation errors
#[derive(Debug, Clone, Error)]
pub enum PropertyError {
    /// The property does not belong to the property set in use
    #[error("Property '{property}' is not part of the property set")]
    NotInSet { property: String },

    /// Write attempted on a read-only property without the override path
    #[error("Property '{property}' is read-only")]
    ReadOnly { property: String },

    /// Value kind does not match the property's declared kind
    #[error("Type mismatch for property '{property}': expected {expected}, got {actual}")]
    TypeMismatch {
        property: String,
        expected: ValueKind,
        actual: ValueKind,
    },

    /// Value converter rejected the value
    #[error("Conversion failed for property '{property}': {reason}")]
    Conversion { property: String, reason: String },

    /// A validator rejected the current value
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl PropertyError {
    /// Create a not-in-set capability error
    pub fn not_in_set(property: impl Into<String>) -> Self {
        Self::NotInSet {
            property: property.into(),
        }
    }

    /// Create a read-only violation
    pub fn read_only(property: impl Into<String>) -> Self {
        Self::ReadOnly {
            property: property.into(),
        }
    }

    /// Create a kind mismatch error
    pub fn type_mismatch(property: impl Into<String>, expected: ValueKind, actual: ValueKind) -> Self {
        Self::TypeMismatch {
            property: property.into(),
            expected,
            actual,
        }
    }

    /// Create a conversion error
    pub fn conversion(property: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Conversion {
            property: property.into(),
            reason: reason.into(),
        }
    }
}

/// Validation failure, single or aggregated
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    /// A single validator violation
    #[error("Invalid value for property '{property}': {message}")]
    Violation { property: String, message: String },

    /// Multiple violations collected by an aggregating validation pass
    #[error("{} validation failures", .0.len())]
    Aggregate(Vec<ValidationError>),
}

impl ValidationError {
    /// Create a single violation
    pub fn violation(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Violation {
            property: property.into(),
            message: message.into(),
        }
    }

    /// Number of violations carried by this error
    pub fn violation_count(&self) -> usize {
        match self {
            Self::Violation { .. } => 1,
            Self::Aggregate(inner) => inner.iter().map(|e| e.violation_count()).sum(),
        }
    }
}
