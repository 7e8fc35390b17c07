//! Operation results
//!
//! The backend-produced outcome of an executed operation. The core treats
//! the affected count as the only universally meaningful payload.

use serde::{Deserialize, Serialize};

/// The kind of datastore operation that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    Insert,
    Update,
    Delete,
    BulkUpdate,
    BulkDelete,
}

impl OperationType {
    /// Operation name for logging
    pub fn name(&self) -> &'static str {
        match self {
            OperationType::Insert => "insert",
            OperationType::Update => "update",
            OperationType::Delete => "delete",
            OperationType::BulkUpdate => "bulk_update",
            OperationType::BulkDelete => "bulk_delete",
        }
    }
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of an executed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    operation_type: OperationType,
    affected_count: u64,
}

impl OperationResult {
    /// Create a result for the given operation type with no affected rows
    pub fn of(operation_type: OperationType) -> Self {
        Self {
            operation_type,
            affected_count: 0,
        }
    }

    /// Set the affected row count
    pub fn affected(mut self, count: u64) -> Self {
        self.affected_count = count;
        self
    }

    /// The operation that produced this result
    pub fn operation_type(&self) -> OperationType {
        self.operation_type
    }

    /// Number of rows the operation affected
    pub fn affected_count(&self) -> u64 {
        self.affected_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_builder() {
        let r = OperationResult::of(OperationType::Update).affected(3);
        assert_eq!(r.operation_type(), OperationType::Update);
        assert_eq!(r.affected_count(), 3);
    }

    #[test]
    fn test_operation_names() {
        assert_eq!(OperationType::BulkUpdate.name(), "bulk_update");
        assert_eq!(OperationType::Delete.name(), "delete");
    }
}
