//! Context registry errors

use thiserror::Error;

/// Result type for context registry operations
pub type ContextResult<T> = Result<T, ContextError>;

/// Scope registration and discovery errors
#[derive(Debug, Clone, Error)]
pub enum ContextError {
    /// A provider supplied a scope without a name; fatal at discovery time
    #[error("Invalid context scope from {provider}: missing scope name")]
    MissingScopeName { provider: String },
}

impl ContextError {
    /// Create a missing-name discovery error
    pub fn missing_scope_name(provider: impl Into<String>) -> Self {
        Self::MissingScopeName {
            provider: provider.into(),
        }
    }
}
