//! Expression Resolution Invariant Tests
//!
//! - Resolvers apply in registration order, first result wins
//! - Unresolvable expressions fail with a typed error; try_resolve is the
//!   recoverable path
//! - Operation-local resolvers shadow shared ones
//! - Resolution is deterministic for a given input and registry

use std::sync::Arc;

use datum::datastore::{DataTarget, DatastoreOperation, MemoryAdapter};
use datum::expression::{
    Expression, ExpressionError, ExpressionKind, ExpressionResolver, ResolverRegistry,
};
use datum::property::{Property, PropertyBox, PropertySet};

// =============================================================================
// Helper Functions
// =============================================================================

fn prefix_resolver(name: &str, prefix: &'static str) -> ExpressionResolver {
    ExpressionResolver::new(
        name,
        ExpressionKind::Target,
        ExpressionKind::Target,
        move |expr, _| match expr {
            Expression::Target(t) => Ok(Some(Expression::Target(DataTarget::named(format!(
                "{}{}",
                prefix,
                t.name()
            ))))),
            _ => Ok(None),
        },
    )
}

// =============================================================================
// Ordering Tests
// =============================================================================

/// Given matching resolvers R1 (registered first) and R2, resolution
/// returns R1's result.
#[test]
fn test_first_registered_resolver_wins() {
    let registry = ResolverRegistry::new()
        .with(prefix_resolver("r1", "one_"))
        .with(prefix_resolver("r2", "two_"));

    let resolved = registry
        .resolve(&Expression::Target(DataTarget::named("t")), ExpressionKind::Target)
        .unwrap();
    assert_eq!(resolved, Expression::Target(DataTarget::named("one_t")));
}

/// Resolution is deterministic: same input, same registry, same output.
#[test]
fn test_resolution_is_deterministic() {
    let registry = ResolverRegistry::new().with(prefix_resolver("r", "x_"));
    let expr = Expression::Target(DataTarget::named("t"));

    let first = registry.resolve(&expr, ExpressionKind::Target).unwrap();
    for _ in 0..10 {
        assert_eq!(registry.resolve(&expr, ExpressionKind::Target).unwrap(), first);
    }
}

// =============================================================================
// Failure Mode Tests
// =============================================================================

/// No matching resolver fails with a typed cannot-resolve error.
#[test]
fn test_cannot_resolve_error() {
    let registry = ResolverRegistry::new();
    let err = registry
        .resolve(&Expression::Target(DataTarget::named("t")), ExpressionKind::Filter)
        .unwrap_err();
    assert!(matches!(
        err,
        ExpressionError::CannotResolve {
            source: ExpressionKind::Target,
            target: ExpressionKind::Filter,
        }
    ));
}

/// try_resolve treats "no resolver" as a recoverable alternative path.
#[test]
fn test_try_resolve_recoverable() {
    let registry = ResolverRegistry::new();
    assert!(registry
        .try_resolve(&Expression::Target(DataTarget::named("t")), ExpressionKind::Filter)
        .unwrap()
        .is_none());
}

// =============================================================================
// Composition Tests
// =============================================================================

/// Local resolvers take precedence over global ones for the same pair.
#[test]
fn test_local_shadows_global() {
    let global = ResolverRegistry::new().with(prefix_resolver("global", "g_"));
    let local = ResolverRegistry::new().with(prefix_resolver("local", "l_"));

    let combined = local.combined(&global);
    let resolved = combined
        .resolve(&Expression::Target(DataTarget::named("t")), ExpressionKind::Target)
        .unwrap();
    assert_eq!(resolved, Expression::Target(DataTarget::named("l_t")));
}

/// Operation configurations combine shared and operation-local resolvers
/// with local precedence.
#[test]
fn test_operation_local_resolver_precedence() {
    let id = Property::<i64>::named("id").build();
    let set = PropertySet::builder().with(&id).identifier(&id).build().unwrap();
    let boxed = PropertyBox::create(set);
    boxed.set_value(&id, 1).unwrap();

    let shared = ResolverRegistry::new().with(prefix_resolver("shared", "s_"));

    let config = DatastoreOperation::update(Arc::new(MemoryAdapter::new()))
        .target(DataTarget::named("t"))
        .with_resolver(prefix_resolver("local", "l_"))
        .with_resolvers(&shared)
        .value(boxed)
        .configuration()
        .unwrap();

    let resolved = config
        .configuration()
        .resolve(&Expression::Target(DataTarget::named("t")), ExpressionKind::Target)
        .unwrap();
    assert_eq!(resolved, Expression::Target(DataTarget::named("l_t")));
}
