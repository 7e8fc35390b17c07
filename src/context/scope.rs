//! Context scopes
//!
//! A scope is a pluggable named provider of contextual values. Scopes are
//! listed per realm in ascending order; lower order means higher priority.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::property::Value;

/// Named provider of contextual values.
pub trait ContextScope: Send + Sync {
    /// The scope name; must not be empty
    fn name(&self) -> &str;

    /// Listing priority, ascending
    fn order(&self) -> i32;

    /// Look up a contextual value
    fn get(&self, key: &str) -> Option<Value>;
}

/// Source of scopes for a realm, the explicit replacement for service
/// discovery: realms are populated by running their providers once.
pub trait ScopeProvider: Send + Sync {
    /// The scopes this provider contributes
    fn provide(&self) -> Vec<Arc<dyn ContextScope>>;
}

impl ScopeProvider for Vec<Arc<dyn ContextScope>> {
    fn provide(&self) -> Vec<Arc<dyn ContextScope>> {
        self.clone()
    }
}

/// Map-backed [`ContextScope`] implementation.
pub struct MapScope {
    name: String,
    order: i32,
    entries: RwLock<HashMap<String, Value>>,
}

impl MapScope {
    /// Create an empty scope
    pub fn new(name: impl Into<String>, order: i32) -> Self {
        Self {
            name: name.into(),
            order,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Add an entry, builder style
    pub fn with(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.put(key, value);
        self
    }

    /// Store a contextual value
    pub fn put(&self, key: impl Into<String>, value: impl Into<Value>) {
        let mut entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.insert(key.into(), value.into());
    }

    /// Remove a contextual value
    pub fn remove(&self, key: &str) -> Option<Value> {
        let mut entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.remove(key)
    }
}

impl ContextScope for MapScope {
    fn name(&self) -> &str {
        &self.name
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn get(&self, key: &str) -> Option<Value> {
        let entries = match self.entries.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_scope_get_put() {
        let scope = MapScope::new("session", 10).with("user", "alice");
        assert_eq!(scope.get("user"), Some(Value::String("alice".into())));
        assert_eq!(scope.get("missing"), None);

        scope.put("user", "bob");
        assert_eq!(scope.get("user"), Some(Value::String("bob".into())));

        scope.remove("user");
        assert_eq!(scope.get("user"), None);
    }

    #[test]
    fn test_vec_provider() {
        let scopes: Vec<Arc<dyn ContextScope>> = vec![Arc::new(MapScope::new("a", 0))];
        assert_eq!(scopes.provide().len(), 1);
    }
}
