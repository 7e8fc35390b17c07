//! In-memory reference adapter
//!
//! A minimal backend used by tests and examples. Rows are path-keyed value
//! maps grouped per target; single-value operations locate rows through the
//! identifier subset of the value's property set. Not a storage engine:
//! no durability, no indexes, no transactions.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use futures_util::future::BoxFuture;

use crate::expression::ValueExpression;
use crate::property::Value;

use super::adapter::{AsyncDatastoreAdapter, DatastoreAdapter};
use super::config::{
    BulkDeleteOperationConfiguration, BulkUpdateOperationConfiguration, PropertyBoxOperationConfiguration,
};
use super::errors::{DatastoreResult, OperationError};
use super::result::{OperationResult, OperationType};

type Row = BTreeMap<String, Value>;
type Tables = HashMap<String, Vec<Row>>;

/// In-memory [`DatastoreAdapter`] implementation.
#[derive(Default)]
pub struct MemoryAdapter {
    tables: RwLock<Tables>,
}

impl MemoryAdapter {
    /// Create an empty adapter
    pub fn new() -> Self {
        Self::default()
    }

    fn read_tables(&self) -> RwLockReadGuard<'_, Tables> {
        match self.tables.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_tables(&self) -> RwLockWriteGuard<'_, Tables> {
        match self.tables.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Number of rows stored for a target
    pub fn row_count(&self, target: &str) -> usize {
        self.read_tables().get(target).map(|rows| rows.len()).unwrap_or(0)
    }

    /// Snapshot of the rows stored for a target
    pub fn rows(&self, target: &str) -> Vec<BTreeMap<String, Value>> {
        self.read_tables().get(target).cloned().unwrap_or_default()
    }

    /// Identifier path/value pairs of the configured value.
    ///
    /// Every identifier must have a stored value; rows are otherwise not
    /// addressable.
    fn identifier_key(config: &PropertyBoxOperationConfiguration) -> DatastoreResult<Vec<(String, Value)>> {
        let value = config.value();
        let set = value.property_set();
        if !set.has_identifiers() {
            return Err(OperationError::execution(
                "property set declares no identifiers, cannot address rows",
            ));
        }
        let mut key = Vec::new();
        for property in set.identifiers() {
            let path = property.full_name();
            match value.value(property) {
                Some(v) => key.push((path, v)),
                None => {
                    return Err(OperationError::execution(format!(
                        "missing identifier value for '{}'",
                        path
                    )))
                }
            }
        }
        Ok(key)
    }

    fn row_matches_key(row: &Row, key: &[(String, Value)]) -> bool {
        key.iter().all(|(path, v)| row.get(path) == Some(v))
    }

    fn apply_values(row: &mut Row, values: &BTreeMap<String, ValueExpression>) {
        for (path, expression) in values {
            match expression {
                ValueExpression::Constant(v) => {
                    row.insert(path.clone(), v.clone());
                }
                ValueExpression::Null(_) => {
                    row.remove(path);
                }
            }
        }
    }
}

impl DatastoreAdapter for MemoryAdapter {
    fn insert(&self, config: &PropertyBoxOperationConfiguration) -> DatastoreResult<OperationResult> {
        let mut row: Row = config
            .value_expressions(false)
            .into_iter()
            .filter_map(|(path, expr)| expr.constant().cloned().map(|v| (path, v)))
            .collect();

        // Identifier values are stored even when the identifier property is
        // read-only, since rows are addressed through them.
        if config.value().property_set().has_identifiers() {
            for (path, v) in Self::identifier_key(config)? {
                row.entry(path).or_insert(v);
            }
        }

        let target = config.configuration().target().name().to_string();
        self.write_tables().entry(target).or_default().push(row);
        Ok(OperationResult::of(OperationType::Insert).affected(1))
    }

    fn update(&self, config: &PropertyBoxOperationConfiguration) -> DatastoreResult<OperationResult> {
        let key = Self::identifier_key(config)?;
        let values: BTreeMap<String, ValueExpression> = config.value_expressions(true);

        let mut tables = self.write_tables();
        let rows = tables
            .get_mut(config.configuration().target().name())
            .ok_or_else(|| OperationError::execution("unknown target"))?;

        let mut affected = 0;
        for row in rows.iter_mut().filter(|r| Self::row_matches_key(r, &key)) {
            Self::apply_values(row, &values);
            affected += 1;
        }
        Ok(OperationResult::of(OperationType::Update).affected(affected))
    }

    fn delete(&self, config: &PropertyBoxOperationConfiguration) -> DatastoreResult<OperationResult> {
        let key = Self::identifier_key(config)?;

        let mut tables = self.write_tables();
        let rows = tables
            .get_mut(config.configuration().target().name())
            .ok_or_else(|| OperationError::execution("unknown target"))?;

        let before = rows.len();
        rows.retain(|r| !Self::row_matches_key(r, &key));
        let affected = (before - rows.len()) as u64;
        Ok(OperationResult::of(OperationType::Delete).affected(affected))
    }

    fn bulk_update(&self, config: &BulkUpdateOperationConfiguration) -> DatastoreResult<OperationResult> {
        let mut tables = self.write_tables();
        let rows = tables
            .entry(config.configuration().target().name().to_string())
            .or_default();

        let mut affected = 0;
        for row in rows.iter_mut() {
            let matches = config.filter().map(|f| f.matches(row)).unwrap_or(true);
            if matches {
                Self::apply_values(row, config.values());
                affected += 1;
            }
        }
        Ok(OperationResult::of(OperationType::BulkUpdate).affected(affected))
    }

    fn bulk_delete(&self, config: &BulkDeleteOperationConfiguration) -> DatastoreResult<OperationResult> {
        let mut tables = self.write_tables();
        let rows = tables
            .entry(config.configuration().target().name().to_string())
            .or_default();

        let before = rows.len();
        match config.filter() {
            Some(filter) => rows.retain(|r| !filter.matches(r)),
            None => rows.clear(),
        }
        let affected = (before - rows.len()) as u64;
        Ok(OperationResult::of(OperationType::BulkDelete).affected(affected))
    }
}

impl AsyncDatastoreAdapter for MemoryAdapter {
    fn insert<'a>(
        &'a self,
        config: &'a PropertyBoxOperationConfiguration,
    ) -> BoxFuture<'a, DatastoreResult<OperationResult>> {
        Box::pin(async move { DatastoreAdapter::insert(self, config) })
    }

    fn update<'a>(
        &'a self,
        config: &'a PropertyBoxOperationConfiguration,
    ) -> BoxFuture<'a, DatastoreResult<OperationResult>> {
        Box::pin(async move { DatastoreAdapter::update(self, config) })
    }

    fn delete<'a>(
        &'a self,
        config: &'a PropertyBoxOperationConfiguration,
    ) -> BoxFuture<'a, DatastoreResult<OperationResult>> {
        Box::pin(async move { DatastoreAdapter::delete(self, config) })
    }

    fn bulk_update<'a>(
        &'a self,
        config: &'a BulkUpdateOperationConfiguration,
    ) -> BoxFuture<'a, DatastoreResult<OperationResult>> {
        Box::pin(async move { DatastoreAdapter::bulk_update(self, config) })
    }

    fn bulk_delete<'a>(
        &'a self,
        config: &'a BulkDeleteOperationConfiguration,
    ) -> BoxFuture<'a, DatastoreResult<OperationResult>> {
        Box::pin(async move { DatastoreAdapter::bulk_delete(self, config) })
    }
}
