//! Datastore operation model
//!
//! Operations are described by immutable configurations (target, parameters,
//! write options, resolvers, value source) assembled through fluent builders
//! and consumed exactly once by a backend adapter.
//!
//! # Lifecycle
//!
//! Building (mutable builder) → Configured (immutable snapshot) →
//! Executed (handed to the adapter exactly once) → Completed | Failed.
//!
//! # Invariants
//!
//! - Missing mandatory fields fail at build time, never at execution
//! - Configurations are never mutated after creation
//! - Backend failures propagate unchanged through the error channel

mod adapter;
mod config;
mod errors;
mod filter;
mod memory;
mod operation;
mod result;
mod target;
mod write_option;

pub use adapter::{AsyncDatastoreAdapter, DatastoreAdapter};
pub use config::{
    BulkDeleteOperationConfiguration, BulkUpdateOperationConfiguration, OperationConfiguration,
    OperationConfigurationBuilder, PropertyBoxOperationConfiguration,
};
pub use errors::{DatastoreResult, OperationError};
pub use filter::QueryFilter;
pub use memory::MemoryAdapter;
pub use operation::{
    AsyncBulkDelete, AsyncBulkUpdate, AsyncDatastoreOperation, BulkDelete, BulkUpdate, DatastoreOperation,
};
pub use result::{OperationResult, OperationType};
pub use target::DataTarget;
pub use write_option::{WriteOption, WriteOptionSet};
