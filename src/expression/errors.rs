//! Expression resolution errors

use super::expression::ExpressionKind;

/// Result type for expression operations
pub type ExpressionResult<T> = Result<T, ExpressionError>;

/// Expression validation and resolution errors
#[derive(Debug, Clone)]
pub enum ExpressionError {
    /// No registered resolver produced a result for the requested pair
    CannotResolve {
        source: ExpressionKind,
        target: ExpressionKind,
    },

    /// The expression is structurally invalid
    Invalid(String),
}

impl std::fmt::Display for ExpressionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpressionError::CannotResolve { source, target } => write!(
                f,
                "Cannot resolve expression: no resolver for {source} -> {target}"
            ),
            ExpressionError::Invalid(message) => write!(f, "Invalid expression: {message}"),
        }
    }
}

impl std::error::Error for ExpressionError {}

impl ExpressionError {
    /// Create a resolution failure for the given pair
    pub fn cannot_resolve(source: ExpressionKind, target: ExpressionKind) -> Self {
        Self::CannotResolve { source, target }
    }

    /// Create a structural validity error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}
