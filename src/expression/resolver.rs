//! Expression resolvers
//!
//! A resolver is a pure rewrite rule from one expression kind to another.
//! Resolvers are looked up by (source, target) pair and applied in
//! registration order; the first resolver returning a result wins. The
//! whole mechanism is side-effect free: same input, same registry, same
//! output.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use super::errors::{ExpressionError, ExpressionResult};
use super::expression::{Expression, ExpressionKind};

type ResolveFn =
    Arc<dyn Fn(&Expression, &ResolutionContext<'_>) -> ExpressionResult<Option<Expression>> + Send + Sync>;

/// A named rewrite rule for one (source, target) expression kind pair.
#[derive(Clone)]
pub struct ExpressionResolver {
    name: String,
    source: ExpressionKind,
    target: ExpressionKind,
    resolve: ResolveFn,
}

impl ExpressionResolver {
    /// Create a resolver.
    ///
    /// The function must be pure; returning `Ok(None)` passes the expression
    /// on to the next matching resolver.
    pub fn new(
        name: impl Into<String>,
        source: ExpressionKind,
        target: ExpressionKind,
        resolve: impl Fn(&Expression, &ResolutionContext<'_>) -> ExpressionResult<Option<Expression>>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            source,
            target,
            resolve: Arc::new(resolve),
        }
    }

    /// Identity resolver for a kind, returning the input unchanged
    pub fn passthrough(kind: ExpressionKind) -> Self {
        Self::new(format!("{}-passthrough", kind), kind, kind, |expr, _| {
            Ok(Some(expr.clone()))
        })
    }

    /// The resolver name, for diagnostics
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The source kind this resolver accepts
    pub fn source(&self) -> ExpressionKind {
        self.source
    }

    /// The target kind this resolver produces
    pub fn target(&self) -> ExpressionKind {
        self.target
    }
}

impl fmt::Debug for ExpressionResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpressionResolver")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("target", &self.target)
            .finish()
    }
}

/// Context handed to resolvers, giving access to the registry in effect so
/// sub-expressions can be resolved recursively.
pub struct ResolutionContext<'a> {
    registry: &'a ResolverRegistry,
}

impl<'a> ResolutionContext<'a> {
    /// Resolve a sub-expression with the registry in effect
    pub fn resolve(&self, expression: &Expression, target: ExpressionKind) -> ExpressionResult<Expression> {
        self.registry.resolve(expression, target)
    }

    /// Resolve a sub-expression, returning `Ok(None)` when nothing matches
    pub fn try_resolve(
        &self,
        expression: &Expression,
        target: ExpressionKind,
    ) -> ExpressionResult<Option<Expression>> {
        self.registry.try_resolve(expression, target)
    }
}

/// Registration-ordered resolver collection.
#[derive(Clone, Default)]
pub struct ResolverRegistry {
    resolvers: Vec<ExpressionResolver>,
}

impl ResolverRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a resolver; registration order is application order
    pub fn register(&mut self, resolver: ExpressionResolver) {
        debug!(
            resolver = resolver.name(),
            source = %resolver.source(),
            target = %resolver.target(),
            "registered expression resolver"
        );
        self.resolvers.push(resolver);
    }

    /// Fluent registration
    pub fn with(mut self, resolver: ExpressionResolver) -> Self {
        self.register(resolver);
        self
    }

    /// Append every resolver of another registry
    pub fn register_all(&mut self, other: &ResolverRegistry) {
        for resolver in &other.resolvers {
            self.resolvers.push(resolver.clone());
        }
    }

    /// Combine this registry with a global one; local resolvers come first
    /// and therefore shadow global resolvers for the same pair.
    pub fn combined(&self, global: &ResolverRegistry) -> ResolverRegistry {
        let mut combined = self.clone();
        combined.register_all(global);
        combined
    }

    /// Number of registered resolvers
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Registered resolvers in registration order
    pub fn iter(&self) -> impl Iterator<Item = &ExpressionResolver> {
        self.resolvers.iter()
    }

    /// Resolve an expression to the target kind, or `Ok(None)` when no
    /// resolver matches or all matching resolvers decline.
    pub fn try_resolve(
        &self,
        expression: &Expression,
        target: ExpressionKind,
    ) -> ExpressionResult<Option<Expression>> {
        expression.validate()?;
        let source = expression.kind();
        let context = ResolutionContext { registry: self };

        for resolver in &self.resolvers {
            if resolver.source != source || resolver.target != target {
                continue;
            }
            if let Some(resolved) = (resolver.resolve)(expression, &context)? {
                trace!(resolver = resolver.name(), %source, %target, "expression resolved");
                resolved.validate()?;
                return Ok(Some(resolved));
            }
        }
        Ok(None)
    }

    /// Resolve an expression to the target kind, failing when no resolver
    /// produces a result.
    pub fn resolve(&self, expression: &Expression, target: ExpressionKind) -> ExpressionResult<Expression> {
        let source = expression.kind();
        self.try_resolve(expression, target)?
            .ok_or_else(|| ExpressionError::cannot_resolve(source, target))
    }
}

impl fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.resolvers.iter().map(|r| r.name()).collect();
        f.debug_struct("ResolverRegistry").field("resolvers", &names).finish()
    }
}
