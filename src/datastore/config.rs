//! Operation configurations
//!
//! Immutable descriptors of a pending operation. A configuration is built
//! once, consumed exactly once by an executor, and never mutated after
//! creation, so it is safe to share across threads read-only.

use std::collections::BTreeMap;

use crate::expression::{
    Expression, ExpressionKind, ExpressionResolver, ExpressionResult, ResolverRegistry, ValueExpression,
};
use crate::property::{PropertyBox, Value};

use super::errors::{DatastoreResult, OperationError};
use super::filter::QueryFilter;
use super::target::DataTarget;
use super::write_option::{WriteOption, WriteOptionSet};

/// Common configuration shared by every datastore operation.
#[derive(Debug, Clone)]
pub struct OperationConfiguration {
    target: DataTarget,
    parameters: BTreeMap<String, Value>,
    write_options: WriteOptionSet,
    resolvers: ResolverRegistry,
}

impl OperationConfiguration {
    /// Start building a configuration
    pub fn builder() -> OperationConfigurationBuilder {
        OperationConfigurationBuilder::default()
    }

    /// The operation target
    pub fn target(&self) -> &DataTarget {
        &self.target
    }

    /// Operation parameter lookup
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }

    /// All operation parameters
    pub fn parameters(&self) -> &BTreeMap<String, Value> {
        &self.parameters
    }

    /// The write options attached to this operation
    pub fn write_options(&self) -> &WriteOptionSet {
        &self.write_options
    }

    /// Whether a write option of the given type is present
    pub fn has_write_option<T: WriteOption>(&self) -> bool {
        self.write_options.has::<T>()
    }

    /// The resolver registry in effect for this operation
    pub fn resolvers(&self) -> &ResolverRegistry {
        &self.resolvers
    }

    /// Resolve an expression with this operation's resolvers
    pub fn resolve(&self, expression: &Expression, target: ExpressionKind) -> ExpressionResult<Expression> {
        self.resolvers.resolve(expression, target)
    }

    /// Resolve an expression, `Ok(None)` when no resolver matches
    pub fn try_resolve(
        &self,
        expression: &Expression,
        target: ExpressionKind,
    ) -> ExpressionResult<Option<Expression>> {
        self.resolvers.try_resolve(expression, target)
    }
}

/// Builder for [`OperationConfiguration`].
#[derive(Debug, Clone, Default)]
pub struct OperationConfigurationBuilder {
    target: Option<DataTarget>,
    parameters: BTreeMap<String, Value>,
    write_options: WriteOptionSet,
    resolvers: ResolverRegistry,
}

impl OperationConfigurationBuilder {
    /// Set the operation target
    pub fn target(mut self, target: DataTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Add an operation parameter
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Add a write option
    pub fn with_write_option(mut self, option: impl WriteOption) -> Self {
        self.write_options.insert(option);
        self
    }

    /// Add an operation-local expression resolver.
    ///
    /// Local resolvers take precedence over resolvers added from a shared
    /// registry for the same kind pair.
    pub fn with_resolver(mut self, resolver: ExpressionResolver) -> Self {
        self.resolvers.register(resolver);
        self
    }

    /// Add every resolver of a shared registry
    pub fn with_resolvers(mut self, registry: &ResolverRegistry) -> Self {
        self.resolvers.register_all(registry);
        self
    }

    /// Build the immutable configuration; fails when no target was set
    pub fn build(self) -> DatastoreResult<OperationConfiguration> {
        let target = self.target.ok_or(OperationError::MissingTarget)?;
        Ok(OperationConfiguration {
            target,
            parameters: self.parameters,
            write_options: self.write_options,
            resolvers: self.resolvers,
        })
    }
}

/// Configuration of an operation carrying a [`PropertyBox`] value.
#[derive(Debug, Clone)]
pub struct PropertyBoxOperationConfiguration {
    common: OperationConfiguration,
    value: PropertyBox,
}

impl PropertyBoxOperationConfiguration {
    pub(crate) fn new(common: OperationConfiguration, value: PropertyBox) -> Self {
        Self { common, value }
    }

    /// The common operation configuration
    pub fn configuration(&self) -> &OperationConfiguration {
        &self.common
    }

    /// The operation value
    pub fn value(&self) -> &PropertyBox {
        &self.value
    }

    /// Project the box into a path-keyed value expression map.
    ///
    /// Read-only and virtual properties are excluded. Properties without a
    /// value appear as explicit nulls only when `include_null_values` is
    /// set, letting callers distinguish "set to null" from "not set".
    pub fn value_expressions(&self, include_null_values: bool) -> BTreeMap<String, ValueExpression> {
        let mut expressions = BTreeMap::new();
        for property in self.value.property_set().iter() {
            if property.is_read_only() || property.is_virtual() {
                continue;
            }
            let path = property.full_name();
            match self.value.value(property) {
                Some(value) => {
                    expressions.insert(path, ValueExpression::Constant(value));
                }
                None if include_null_values => {
                    expressions.insert(path, ValueExpression::Null(property.model_kind()));
                }
                None => {}
            }
        }
        expressions
    }
}

/// Configuration of a bulk update operation.
///
/// Both the filter and the value map may be empty: an unfiltered bulk
/// update applies to all rows, and one with no values is a no-op the
/// backend may short-circuit.
#[derive(Debug, Clone)]
pub struct BulkUpdateOperationConfiguration {
    common: OperationConfiguration,
    filter: Option<QueryFilter>,
    values: BTreeMap<String, ValueExpression>,
}

impl BulkUpdateOperationConfiguration {
    pub(crate) fn new(
        common: OperationConfiguration,
        filter: Option<QueryFilter>,
        values: BTreeMap<String, ValueExpression>,
    ) -> Self {
        Self {
            common,
            filter,
            values,
        }
    }

    /// The common operation configuration
    pub fn configuration(&self) -> &OperationConfiguration {
        &self.common
    }

    /// The optional row restriction
    pub fn filter(&self) -> Option<&QueryFilter> {
        self.filter.as_ref()
    }

    /// The path-keyed values to write
    pub fn values(&self) -> &BTreeMap<String, ValueExpression> {
        &self.values
    }
}

/// Configuration of a bulk delete operation.
///
/// An absent filter means the operation applies to all rows.
#[derive(Debug, Clone)]
pub struct BulkDeleteOperationConfiguration {
    common: OperationConfiguration,
    filter: Option<QueryFilter>,
}

impl BulkDeleteOperationConfiguration {
    pub(crate) fn new(common: OperationConfiguration, filter: Option<QueryFilter>) -> Self {
        Self { common, filter }
    }

    /// The common operation configuration
    pub fn configuration(&self) -> &OperationConfiguration {
        &self.common
    }

    /// The optional row restriction
    pub fn filter(&self) -> Option<&QueryFilter> {
        self.filter.as_ref()
    }
}
