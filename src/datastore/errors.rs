//! Datastore operation errors
//!
//! Build-time failures (missing mandatory fields) are caller errors raised
//! by `build`, never deferred to execution. Execution failures are opaque
//! backend errors propagated unchanged through the result channel.

use thiserror::Error;

use crate::expression::ExpressionError;
use crate::property::{PropertyError, ValidationError};

/// Result type for datastore operations
pub type DatastoreResult<T> = Result<T, OperationError>;

/// Operation build and execution errors
#[derive(Debug, Clone, Error)]
pub enum OperationError {
    /// No data target was configured before `build`
    #[error("Operation target is missing")]
    MissingTarget,

    /// No value was supplied for a value-carrying operation
    #[error("Operation value is missing")]
    MissingValue,

    /// A property access or conversion failed while assembling the operation
    #[error(transparent)]
    Property(#[from] PropertyError),

    /// Operation value failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An expression could not be resolved
    #[error(transparent)]
    Resolution(#[from] ExpressionError),

    /// Backend-reported execution failure, opaque to the core
    #[error("Execution failed: {0}")]
    Execution(String),
}

impl OperationError {
    /// Create a backend execution error
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }
}
