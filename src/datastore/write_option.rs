//! Write options
//!
//! Write options are an open set of opaque markers attached to a write
//! operation. The core never interprets them; backends define their own
//! option types and look them up by type from the configuration.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Marker attached to a write operation, defined and interpreted by
/// backends.
///
/// Implementors expose themselves as [`Any`] so configurations can offer
/// type-filtered lookup without the core knowing the concrete types.
pub trait WriteOption: fmt::Debug + Send + Sync + 'static {
    /// The option as [`Any`], for downcasting
    fn as_any(&self) -> &dyn Any;
}

/// Open collection of write options with type-filtered lookup.
#[derive(Debug, Clone, Default)]
pub struct WriteOptionSet {
    options: Vec<Arc<dyn WriteOption>>,
}

impl WriteOptionSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an option
    pub fn insert(&mut self, option: impl WriteOption) {
        self.options.push(Arc::new(option));
    }

    /// Add a shared option
    pub fn insert_arc(&mut self, option: Arc<dyn WriteOption>) {
        self.options.push(option);
    }

    /// Whether an option of the given type is present
    pub fn has<T: WriteOption>(&self) -> bool {
        self.options.iter().any(|o| o.as_any().is::<T>())
    }

    /// Every option of the given type, in insertion order
    pub fn options_of<T: WriteOption>(&self) -> Vec<&T> {
        self.options
            .iter()
            .filter_map(|o| o.as_any().downcast_ref::<T>())
            .collect()
    }

    /// The first option of the given type, if any
    pub fn first_of<T: WriteOption>(&self) -> Option<&T> {
        self.options.iter().find_map(|o| o.as_any().downcast_ref::<T>())
    }

    /// Number of options
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Options in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn WriteOption>> {
        self.options.iter()
    }
}
