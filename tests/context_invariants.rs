//! Context Scope Registry Invariant Tests
//!
//! - Scope listings are ordered by ascending declared order
//! - Missing scope names are fatal at discovery time
//! - Hierarchy search merges parent realms with child shadowing
//! - Realms have an explicit lifecycle: initialize, mutate, drop

use std::sync::Arc;

use datum::context::{ContextError, ContextScope, MapScope, Realm, ScopeRegistry};
use datum::property::Value;

// =============================================================================
// Helper Functions
// =============================================================================

fn scope(name: &str, order: i32) -> Arc<dyn ContextScope> {
    Arc::new(MapScope::new(name, order))
}

// =============================================================================
// Ordering Tests
// =============================================================================

/// Registry with scopes A(order=1), B(order=0) lists [B, A].
#[test]
fn test_scopes_ordered_ascending() {
    let registry = ScopeRegistry::new();
    let realm = Realm::new();

    registry.register_scope(Some(&realm), scope("A", 1)).unwrap();
    registry.register_scope(Some(&realm), scope("B", 0)).unwrap();

    let names: Vec<String> = registry
        .scopes(Some(&realm))
        .iter()
        .map(|s| s.name().to_string())
        .collect();
    assert_eq!(names, vec!["B", "A"]);
}

/// Listings are deterministic given a stable scope set.
#[test]
fn test_listing_is_deterministic() {
    let registry = ScopeRegistry::new();
    let realm = Realm::new();

    for (name, order) in [("c", 3), ("a", 1), ("b", 2)] {
        registry.register_scope(Some(&realm), scope(name, order)).unwrap();
    }

    let first: Vec<String> = registry
        .scopes(Some(&realm))
        .iter()
        .map(|s| s.name().to_string())
        .collect();
    for _ in 0..5 {
        let again: Vec<String> = registry
            .scopes(Some(&realm))
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        assert_eq!(again, first);
    }
}

// =============================================================================
// Discovery Tests
// =============================================================================

/// Initialization from providers registers every provided scope, sorted.
#[test]
fn test_initialize_registers_provided_scopes() {
    let registry = ScopeRegistry::new();
    let realm = Realm::new();

    let provided: Vec<Arc<dyn ContextScope>> = vec![scope("high", 10), scope("low", -10)];
    let count = registry.initialize(&realm, &[&provided]).unwrap();
    assert_eq!(count, 2);

    let names: Vec<String> = registry
        .scopes(Some(&realm))
        .iter()
        .map(|s| s.name().to_string())
        .collect();
    assert_eq!(names, vec!["low", "high"]);
}

/// A provider contributing a scope without a name is a fatal configuration
/// error.
#[test]
fn test_unnamed_scope_is_fatal_at_discovery() {
    let registry = ScopeRegistry::new();
    let realm = Realm::new();

    let provided: Vec<Arc<dyn ContextScope>> = vec![scope("", 0)];
    let err = registry.initialize(&realm, &[&provided]).unwrap_err();
    assert!(matches!(err, ContextError::MissingScopeName { .. }));

    // The realm stays uninitialized
    assert!(registry.scopes(Some(&realm)).is_empty());
}

// =============================================================================
// Hierarchy Tests
// =============================================================================

/// Child realms see parent scopes; same-named child scopes shadow parents.
#[test]
fn test_child_shadows_parent_scope() {
    let registry = ScopeRegistry::new();
    let parent = Realm::new();
    let child = parent.child();

    registry
        .register_scope(Some(&parent), Arc::new(MapScope::new("env", 0).with("stage", "prod")))
        .unwrap();
    registry
        .register_scope(Some(&child), Arc::new(MapScope::new("env", 0).with("stage", "test")))
        .unwrap();
    registry.register_scope(Some(&parent), scope("shared", 5)).unwrap();

    let resolved = registry.scope(Some(&child), "env").unwrap();
    assert_eq!(resolved.get("stage"), Some(Value::String("test".into())));

    let merged = registry.scopes(Some(&child));
    assert_eq!(merged.len(), 2);
    assert!(registry.scope(Some(&child), "shared").is_some());
}

/// With hierarchy search disabled, lookups stop at the given realm.
#[test]
fn test_hierarchy_toggle() {
    let registry = ScopeRegistry::new();
    let parent = Realm::new();
    let child = parent.child();

    registry.register_scope(Some(&parent), scope("p", 0)).unwrap();

    assert!(registry.scope(Some(&child), "p").is_some());
    registry.set_use_hierarchy(false);
    assert!(registry.scope(Some(&child), "p").is_none());
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

/// Dropping a realm removes its scopes; siblings are unaffected.
#[test]
fn test_drop_realm_lifecycle() {
    let registry = ScopeRegistry::new();
    let parent = Realm::new();
    let a = parent.child();
    let b = parent.child();

    registry.register_scope(Some(&a), scope("in-a", 0)).unwrap();
    registry.register_scope(Some(&b), scope("in-b", 0)).unwrap();

    assert!(registry.drop_realm(&a));
    assert!(registry.scope(Some(&a), "in-a").is_none());
    assert!(registry.scope(Some(&b), "in-b").is_some());
}

/// The default realm backs lookups when no realm is given.
#[test]
fn test_default_realm() {
    let registry = ScopeRegistry::new();
    let realm = Realm::new();
    registry.set_default_realm(realm.clone());

    registry.register_scope(None, scope("d", 0)).unwrap();

    assert!(registry.is_scope_registered(None, "d"));
    assert!(registry.is_scope_registered(Some(&realm), "d"));
    assert_eq!(registry.scopes(None).len(), 1);
}
