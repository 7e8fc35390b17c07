//! Executable operations
//!
//! Fluent builders that assemble an immutable configuration and, on
//! execution, hand it to the backend adapter exactly once. Building is
//! always synchronous; the async variants differ only in the execution
//! step. Missing mandatory fields fail at build time, not at execution.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::expression::{ExpressionResolver, ResolverRegistry, ValueExpression};
use crate::property::{PropertyBox, Value, ValueKind};

use super::adapter::{AsyncDatastoreAdapter, DatastoreAdapter};
use super::config::{
    BulkDeleteOperationConfiguration, BulkUpdateOperationConfiguration, OperationConfigurationBuilder,
    PropertyBoxOperationConfiguration,
};
use super::errors::{DatastoreResult, OperationError};
use super::filter::QueryFilter;
use super::result::{OperationResult, OperationType};
use super::target::DataTarget;
use super::write_option::WriteOption;

fn build_value_config(
    common: OperationConfigurationBuilder,
    value: Option<PropertyBox>,
) -> DatastoreResult<PropertyBoxOperationConfiguration> {
    let common = common.build()?;
    let value = value.ok_or(OperationError::MissingValue)?;
    Ok(PropertyBoxOperationConfiguration::new(common, value))
}

/// Executable insert, update or delete carrying a [`PropertyBox`] value.
///
/// Created through [`insert`](DatastoreOperation::insert),
/// [`update`](DatastoreOperation::update) or
/// [`delete`](DatastoreOperation::delete); all three share the same
/// configuration surface and route to the matching adapter entry point.
pub struct DatastoreOperation {
    adapter: Arc<dyn DatastoreAdapter>,
    operation_type: OperationType,
    common: OperationConfigurationBuilder,
    value: Option<PropertyBox>,
}

impl DatastoreOperation {
    fn new(adapter: Arc<dyn DatastoreAdapter>, operation_type: OperationType) -> Self {
        Self {
            adapter,
            operation_type,
            common: OperationConfigurationBuilder::default(),
            value: None,
        }
    }

    /// Start an insert operation
    pub fn insert(adapter: Arc<dyn DatastoreAdapter>) -> Self {
        Self::new(adapter, OperationType::Insert)
    }

    /// Start an update operation
    pub fn update(adapter: Arc<dyn DatastoreAdapter>) -> Self {
        Self::new(adapter, OperationType::Update)
    }

    /// Start a delete operation
    pub fn delete(adapter: Arc<dyn DatastoreAdapter>) -> Self {
        Self::new(adapter, OperationType::Delete)
    }

    /// The operation type this builder executes as
    pub fn operation_type(&self) -> OperationType {
        self.operation_type
    }

    /// Set the operation target
    pub fn target(mut self, target: DataTarget) -> Self {
        self.common = self.common.target(target);
        self
    }

    /// Add an operation parameter
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.common = self.common.parameter(name, value);
        self
    }

    /// Add a write option
    pub fn with_write_option(mut self, option: impl WriteOption) -> Self {
        self.common = self.common.with_write_option(option);
        self
    }

    /// Add an operation-local expression resolver
    pub fn with_resolver(mut self, resolver: ExpressionResolver) -> Self {
        self.common = self.common.with_resolver(resolver);
        self
    }

    /// Add every resolver of a shared registry
    pub fn with_resolvers(mut self, registry: &ResolverRegistry) -> Self {
        self.common = self.common.with_resolvers(registry);
        self
    }

    /// Set the operation value
    pub fn value(mut self, value: PropertyBox) -> Self {
        self.value = Some(value);
        self
    }

    /// Build the immutable configuration snapshot without executing
    pub fn configuration(self) -> DatastoreResult<PropertyBoxOperationConfiguration> {
        build_value_config(self.common, self.value)
    }

    /// Build the configuration and hand it to the adapter
    pub fn execute(self) -> DatastoreResult<OperationResult> {
        let config = build_value_config(self.common, self.value)?;
        debug!(
            op = self.operation_type.name(),
            target = %config.configuration().target(),
            "executing datastore operation"
        );
        match self.operation_type {
            OperationType::Insert => self.adapter.insert(&config),
            OperationType::Update => self.adapter.update(&config),
            OperationType::Delete => self.adapter.delete(&config),
            other => Err(OperationError::execution(format!(
                "operation type {} does not carry a property box value",
                other
            ))),
        }
    }
}

/// Async variant of [`DatastoreOperation`].
pub struct AsyncDatastoreOperation {
    adapter: Arc<dyn AsyncDatastoreAdapter>,
    operation_type: OperationType,
    common: OperationConfigurationBuilder,
    value: Option<PropertyBox>,
}

impl AsyncDatastoreOperation {
    fn new(adapter: Arc<dyn AsyncDatastoreAdapter>, operation_type: OperationType) -> Self {
        Self {
            adapter,
            operation_type,
            common: OperationConfigurationBuilder::default(),
            value: None,
        }
    }

    /// Start an insert operation
    pub fn insert(adapter: Arc<dyn AsyncDatastoreAdapter>) -> Self {
        Self::new(adapter, OperationType::Insert)
    }

    /// Start an update operation
    pub fn update(adapter: Arc<dyn AsyncDatastoreAdapter>) -> Self {
        Self::new(adapter, OperationType::Update)
    }

    /// Start a delete operation
    pub fn delete(adapter: Arc<dyn AsyncDatastoreAdapter>) -> Self {
        Self::new(adapter, OperationType::Delete)
    }

    /// Set the operation target
    pub fn target(mut self, target: DataTarget) -> Self {
        self.common = self.common.target(target);
        self
    }

    /// Add an operation parameter
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.common = self.common.parameter(name, value);
        self
    }

    /// Add a write option
    pub fn with_write_option(mut self, option: impl WriteOption) -> Self {
        self.common = self.common.with_write_option(option);
        self
    }

    /// Add an operation-local expression resolver
    pub fn with_resolver(mut self, resolver: ExpressionResolver) -> Self {
        self.common = self.common.with_resolver(resolver);
        self
    }

    /// Add every resolver of a shared registry
    pub fn with_resolvers(mut self, registry: &ResolverRegistry) -> Self {
        self.common = self.common.with_resolvers(registry);
        self
    }

    /// Set the operation value
    pub fn value(mut self, value: PropertyBox) -> Self {
        self.value = Some(value);
        self
    }

    /// Build the configuration and await the adapter.
    ///
    /// Building itself is synchronous and identical to the sync path.
    pub async fn execute(self) -> DatastoreResult<OperationResult> {
        let config = build_value_config(self.common, self.value)?;
        debug!(
            op = self.operation_type.name(),
            target = %config.configuration().target(),
            "executing async datastore operation"
        );
        match self.operation_type {
            OperationType::Insert => self.adapter.insert(&config).await,
            OperationType::Update => self.adapter.update(&config).await,
            OperationType::Delete => self.adapter.delete(&config).await,
            other => Err(OperationError::execution(format!(
                "operation type {} does not carry a property box value",
                other
            ))),
        }
    }
}

/// Executable bulk update.
pub struct BulkUpdate {
    adapter: Arc<dyn DatastoreAdapter>,
    common: OperationConfigurationBuilder,
    filter: Option<QueryFilter>,
    values: BTreeMap<String, ValueExpression>,
}

impl BulkUpdate {
    /// Start a bulk update operation
    pub fn new(adapter: Arc<dyn DatastoreAdapter>) -> Self {
        Self {
            adapter,
            common: OperationConfigurationBuilder::default(),
            filter: None,
            values: BTreeMap::new(),
        }
    }

    /// Set the operation target
    pub fn target(mut self, target: DataTarget) -> Self {
        self.common = self.common.target(target);
        self
    }

    /// Add an operation parameter
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.common = self.common.parameter(name, value);
        self
    }

    /// Add a write option
    pub fn with_write_option(mut self, option: impl WriteOption) -> Self {
        self.common = self.common.with_write_option(option);
        self
    }

    /// Add an operation-local expression resolver
    pub fn with_resolver(mut self, resolver: ExpressionResolver) -> Self {
        self.common = self.common.with_resolver(resolver);
        self
    }

    /// Restrict the affected rows; successive calls are conjoined
    pub fn filter(mut self, filter: QueryFilter) -> Self {
        self.filter = Some(match self.filter {
            Some(existing) => existing.and(filter),
            None => filter,
        });
        self
    }

    /// Set a path to a constant value
    pub fn set(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values
            .insert(path.into(), ValueExpression::Constant(value.into()));
        self
    }

    /// Set a path to an explicit null of the given kind
    pub fn set_null(mut self, path: impl Into<String>, kind: ValueKind) -> Self {
        self.values.insert(path.into(), ValueExpression::Null(kind));
        self
    }

    /// Take the writable values of a box as the operation values
    pub fn values_from(mut self, value: &PropertyBox, include_null_values: bool) -> Self {
        for property in value.property_set().iter() {
            if property.is_read_only() || property.is_virtual() {
                continue;
            }
            let path = property.full_name();
            match value.value(property) {
                Some(v) => {
                    self.values.insert(path, ValueExpression::Constant(v));
                }
                None if include_null_values => {
                    self.values
                        .insert(path, ValueExpression::Null(property.model_kind()));
                }
                None => {}
            }
        }
        self
    }

    /// Build the immutable configuration snapshot without executing.
    ///
    /// An empty filter and empty values are both valid: the former applies
    /// to all rows, the latter writes nothing.
    pub fn configuration(self) -> DatastoreResult<BulkUpdateOperationConfiguration> {
        Ok(BulkUpdateOperationConfiguration::new(
            self.common.build()?,
            self.filter,
            self.values,
        ))
    }

    /// Build the configuration and hand it to the adapter
    pub fn execute(self) -> DatastoreResult<OperationResult> {
        let config = BulkUpdateOperationConfiguration::new(self.common.build()?, self.filter, self.values);
        debug!(
            op = OperationType::BulkUpdate.name(),
            target = %config.configuration().target(),
            values = config.values().len(),
            "executing datastore operation"
        );
        self.adapter.bulk_update(&config)
    }
}

/// Async variant of [`BulkUpdate`].
pub struct AsyncBulkUpdate {
    adapter: Arc<dyn AsyncDatastoreAdapter>,
    common: OperationConfigurationBuilder,
    filter: Option<QueryFilter>,
    values: BTreeMap<String, ValueExpression>,
}

impl AsyncBulkUpdate {
    /// Start a bulk update operation
    pub fn new(adapter: Arc<dyn AsyncDatastoreAdapter>) -> Self {
        Self {
            adapter,
            common: OperationConfigurationBuilder::default(),
            filter: None,
            values: BTreeMap::new(),
        }
    }

    /// Set the operation target
    pub fn target(mut self, target: DataTarget) -> Self {
        self.common = self.common.target(target);
        self
    }

    /// Add an operation parameter
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.common = self.common.parameter(name, value);
        self
    }

    /// Add a write option
    pub fn with_write_option(mut self, option: impl WriteOption) -> Self {
        self.common = self.common.with_write_option(option);
        self
    }

    /// Add an operation-local expression resolver
    pub fn with_resolver(mut self, resolver: ExpressionResolver) -> Self {
        self.common = self.common.with_resolver(resolver);
        self
    }

    /// Restrict the affected rows; successive calls are conjoined
    pub fn filter(mut self, filter: QueryFilter) -> Self {
        self.filter = Some(match self.filter {
            Some(existing) => existing.and(filter),
            None => filter,
        });
        self
    }

    /// Set a path to a constant value
    pub fn set(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values
            .insert(path.into(), ValueExpression::Constant(value.into()));
        self
    }

    /// Set a path to an explicit null of the given kind
    pub fn set_null(mut self, path: impl Into<String>, kind: ValueKind) -> Self {
        self.values.insert(path.into(), ValueExpression::Null(kind));
        self
    }

    /// Build the configuration and await the adapter
    pub async fn execute(self) -> DatastoreResult<OperationResult> {
        let config = BulkUpdateOperationConfiguration::new(self.common.build()?, self.filter, self.values);
        self.adapter.bulk_update(&config).await
    }
}

/// Executable bulk delete.
pub struct BulkDelete {
    adapter: Arc<dyn DatastoreAdapter>,
    common: OperationConfigurationBuilder,
    filter: Option<QueryFilter>,
}

impl BulkDelete {
    /// Start a bulk delete operation
    pub fn new(adapter: Arc<dyn DatastoreAdapter>) -> Self {
        Self {
            adapter,
            common: OperationConfigurationBuilder::default(),
            filter: None,
        }
    }

    /// Set the operation target
    pub fn target(mut self, target: DataTarget) -> Self {
        self.common = self.common.target(target);
        self
    }

    /// Add an operation parameter
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.common = self.common.parameter(name, value);
        self
    }

    /// Add a write option
    pub fn with_write_option(mut self, option: impl WriteOption) -> Self {
        self.common = self.common.with_write_option(option);
        self
    }

    /// Add an operation-local expression resolver
    pub fn with_resolver(mut self, resolver: ExpressionResolver) -> Self {
        self.common = self.common.with_resolver(resolver);
        self
    }

    /// Restrict the affected rows; successive calls are conjoined
    pub fn filter(mut self, filter: QueryFilter) -> Self {
        self.filter = Some(match self.filter {
            Some(existing) => existing.and(filter),
            None => filter,
        });
        self
    }

    /// Build the immutable configuration snapshot without executing.
    ///
    /// An absent filter is valid and means the operation applies to all
    /// rows.
    pub fn configuration(self) -> DatastoreResult<BulkDeleteOperationConfiguration> {
        Ok(BulkDeleteOperationConfiguration::new(self.common.build()?, self.filter))
    }

    /// Build the configuration and hand it to the adapter
    pub fn execute(self) -> DatastoreResult<OperationResult> {
        let config = BulkDeleteOperationConfiguration::new(self.common.build()?, self.filter);
        debug!(
            op = OperationType::BulkDelete.name(),
            target = %config.configuration().target(),
            "executing datastore operation"
        );
        self.adapter.bulk_delete(&config)
    }
}

/// Async variant of [`BulkDelete`].
pub struct AsyncBulkDelete {
    adapter: Arc<dyn AsyncDatastoreAdapter>,
    common: OperationConfigurationBuilder,
    filter: Option<QueryFilter>,
}

impl AsyncBulkDelete {
    /// Start a bulk delete operation
    pub fn new(adapter: Arc<dyn AsyncDatastoreAdapter>) -> Self {
        Self {
            adapter,
            common: OperationConfigurationBuilder::default(),
            filter: None,
        }
    }

    /// Set the operation target
    pub fn target(mut self, target: DataTarget) -> Self {
        self.common = self.common.target(target);
        self
    }

    /// Add an operation parameter
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.common = self.common.parameter(name, value);
        self
    }

    /// Add a write option
    pub fn with_write_option(mut self, option: impl WriteOption) -> Self {
        self.common = self.common.with_write_option(option);
        self
    }

    /// Add an operation-local expression resolver
    pub fn with_resolver(mut self, resolver: ExpressionResolver) -> Self {
        self.common = self.common.with_resolver(resolver);
        self
    }

    /// Restrict the affected rows; successive calls are conjoined
    pub fn filter(mut self, filter: QueryFilter) -> Self {
        self.filter = Some(match self.filter {
            Some(existing) => existing.and(filter),
            None => filter,
        });
        self
    }

    /// Build the configuration and await the adapter
    pub async fn execute(self) -> DatastoreResult<OperationResult> {
        let config = BulkDeleteOperationConfiguration::new(self.common.build()?, self.filter);
        self.adapter.bulk_delete(&config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{Property, PropertySet};

    struct RejectingAdapter;

    impl DatastoreAdapter for RejectingAdapter {
        fn insert(&self, _: &PropertyBoxOperationConfiguration) -> DatastoreResult<OperationResult> {
            Err(OperationError::execution("backend says no"))
        }
        fn update(&self, _: &PropertyBoxOperationConfiguration) -> DatastoreResult<OperationResult> {
            Err(OperationError::execution("backend says no"))
        }
        fn delete(&self, _: &PropertyBoxOperationConfiguration) -> DatastoreResult<OperationResult> {
            Err(OperationError::execution("backend says no"))
        }
        fn bulk_update(&self, _: &BulkUpdateOperationConfiguration) -> DatastoreResult<OperationResult> {
            Err(OperationError::execution("backend says no"))
        }
        fn bulk_delete(&self, _: &BulkDeleteOperationConfiguration) -> DatastoreResult<OperationResult> {
            Err(OperationError::execution("backend says no"))
        }
    }

    fn sample_box() -> PropertyBox {
        let id = Property::<i64>::named("id").build();
        let set = PropertySet::builder().with(&id).build().unwrap();
        let boxed = PropertyBox::create(set);
        boxed.set_value(&id, 1).unwrap();
        boxed
    }

    #[test]
    fn test_missing_target_fails_before_adapter() {
        let result = DatastoreOperation::insert(Arc::new(RejectingAdapter))
            .value(sample_box())
            .execute();
        assert!(matches!(result, Err(OperationError::MissingTarget)));
    }

    #[test]
    fn test_missing_value_fails_before_adapter() {
        let result = DatastoreOperation::update(Arc::new(RejectingAdapter))
            .target(DataTarget::named("users"))
            .execute();
        assert!(matches!(result, Err(OperationError::MissingValue)));
    }

    #[test]
    fn test_backend_error_propagates() {
        let result = DatastoreOperation::delete(Arc::new(RejectingAdapter))
            .target(DataTarget::named("users"))
            .value(sample_box())
            .execute();
        assert!(matches!(result, Err(OperationError::Execution(_))));
    }

    #[test]
    fn test_bulk_update_without_filter_is_valid() {
        let config = BulkUpdate::new(Arc::new(RejectingAdapter))
            .target(DataTarget::named("users"))
            .set("name", "x")
            .configuration()
            .unwrap();

        assert!(config.filter().is_none());
        assert_eq!(config.values().len(), 1);
    }

    #[test]
    fn test_bulk_filters_are_conjoined() {
        let config = BulkDelete::new(Arc::new(RejectingAdapter))
            .target(DataTarget::named("users"))
            .filter(QueryFilter::eq("a", 1i64))
            .filter(QueryFilter::eq("b", 2i64))
            .configuration()
            .unwrap();

        assert!(matches!(config.filter(), Some(QueryFilter::And(_))));
    }

    #[test]
    fn test_configuration_snapshot_idempotence() {
        let build = || {
            BulkUpdate::new(Arc::new(RejectingAdapter))
                .target(DataTarget::named("users"))
                .filter(QueryFilter::eq("active", true))
                .set("name", "x")
                .configuration()
                .unwrap()
        };
        let a = build();
        let b = build();

        assert_eq!(a.configuration().target(), b.configuration().target());
        assert_eq!(a.filter(), b.filter());
        assert_eq!(a.values(), b.values());
    }
}
