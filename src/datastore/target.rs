//! Data targets
//!
//! A target names the persistence unit an operation applies to. What a
//! target maps to (table, collection, document type) is a backend concern;
//! the core only carries the name.

use serde::{Deserialize, Serialize};

/// Named operation target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataTarget {
    name: String,
}

impl DataTarget {
    /// Create a target with the given name
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The target name
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for DataTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
