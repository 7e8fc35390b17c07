//! Backend adapter contracts
//!
//! A backend consumes built, immutable operation configurations and
//! produces results. Backend failures are reported through the error
//! channel of the calling convention: the `Result` for synchronous
//! adapters, the future for asynchronous ones. Cancellation and timeouts
//! are backend concerns and are not modeled here.

use futures_util::future::BoxFuture;

use super::config::{
    BulkDeleteOperationConfiguration, BulkUpdateOperationConfiguration, PropertyBoxOperationConfiguration,
};
use super::errors::DatastoreResult;
use super::result::OperationResult;

/// Synchronous storage backend contract.
pub trait DatastoreAdapter: Send + Sync {
    /// Insert the configured value
    fn insert(&self, config: &PropertyBoxOperationConfiguration) -> DatastoreResult<OperationResult>;

    /// Update the row identified by the configured value
    fn update(&self, config: &PropertyBoxOperationConfiguration) -> DatastoreResult<OperationResult>;

    /// Delete the row identified by the configured value
    fn delete(&self, config: &PropertyBoxOperationConfiguration) -> DatastoreResult<OperationResult>;

    /// Apply the configured values to every row matching the filter
    fn bulk_update(&self, config: &BulkUpdateOperationConfiguration) -> DatastoreResult<OperationResult>;

    /// Delete every row matching the filter
    fn bulk_delete(&self, config: &BulkDeleteOperationConfiguration) -> DatastoreResult<OperationResult>;
}

/// Asynchronous storage backend contract.
///
/// Configurations are identical to the synchronous path; only the
/// execution step differs in concurrency model.
pub trait AsyncDatastoreAdapter: Send + Sync {
    /// Insert the configured value
    fn insert<'a>(
        &'a self,
        config: &'a PropertyBoxOperationConfiguration,
    ) -> BoxFuture<'a, DatastoreResult<OperationResult>>;

    /// Update the row identified by the configured value
    fn update<'a>(
        &'a self,
        config: &'a PropertyBoxOperationConfiguration,
    ) -> BoxFuture<'a, DatastoreResult<OperationResult>>;

    /// Delete the row identified by the configured value
    fn delete<'a>(
        &'a self,
        config: &'a PropertyBoxOperationConfiguration,
    ) -> BoxFuture<'a, DatastoreResult<OperationResult>>;

    /// Apply the configured values to every row matching the filter
    fn bulk_update<'a>(
        &'a self,
        config: &'a BulkUpdateOperationConfiguration,
    ) -> BoxFuture<'a, DatastoreResult<OperationResult>>;

    /// Delete every row matching the filter
    fn bulk_delete<'a>(
        &'a self,
        config: &'a BulkDeleteOperationConfiguration,
    ) -> BoxFuture<'a, DatastoreResult<OperationResult>>;
}
