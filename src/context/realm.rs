//! Realms
//!
//! A realm is an explicit, cheaply cloneable handle scoping a group of
//! context scopes, with an optional parent forming a hierarchy. Realms
//! replace an implicit module-loader scoping with an explicit lifecycle:
//! they are created, optionally chained, and dropped from the registry by
//! name of their handle.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use uuid::Uuid;

struct RealmInner {
    id: Uuid,
    parent: Option<Realm>,
}

/// Handle scoping context scope registrations.
#[derive(Clone)]
pub struct Realm {
    inner: Arc<RealmInner>,
}

impl Realm {
    /// Create a new root realm
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RealmInner {
                id: Uuid::new_v4(),
                parent: None,
            }),
        }
    }

    /// Create a child realm; hierarchy search walks from child to parent
    pub fn child(&self) -> Self {
        Self {
            inner: Arc::new(RealmInner {
                id: Uuid::new_v4(),
                parent: Some(self.clone()),
            }),
        }
    }

    /// The unique realm id
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// The parent realm, if any
    pub fn parent(&self) -> Option<&Realm> {
        self.inner.parent.as_ref()
    }
}

impl Default for Realm {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Realm {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Realm {}

impl Hash for Realm {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl std::fmt::Debug for Realm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Realm")
            .field("id", &self.inner.id)
            .field("has_parent", &self.inner.parent.is_some())
            .finish()
    }
}
