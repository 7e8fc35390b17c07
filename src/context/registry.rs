//! Scope registry
//!
//! Process-wide registry of context scopes keyed by realm. Population is an
//! explicit per-realm initialization from providers; programmatic
//! registration and unregistration are supported alongside. All access is
//! serialized by a single registry-wide lock, since registration is rare
//! relative to lookups.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use tracing::debug;
use uuid::Uuid;

use super::errors::{ContextError, ContextResult};
use super::realm::Realm;
use super::scope::{ContextScope, ScopeProvider};

#[derive(Default)]
struct RealmScopes {
    // Kept sorted by ascending order, stable for equal orders
    scopes: Vec<Arc<dyn ContextScope>>,
    initialized: bool,
}

impl RealmScopes {
    fn sort(&mut self) {
        self.scopes.sort_by_key(|s| s.order());
    }

    fn find(&self, name: &str) -> Option<&Arc<dyn ContextScope>> {
        self.scopes.iter().find(|s| s.name() == name)
    }
}

struct RegistryInner {
    realms: HashMap<Uuid, RealmScopes>,
    default_realm: Option<Realm>,
    use_hierarchy: bool,
}

impl Default for RegistryInner {
    fn default() -> Self {
        Self {
            realms: HashMap::new(),
            default_realm: None,
            use_hierarchy: true,
        }
    }
}

/// Realm-keyed registry of [`ContextScope`]s.
///
/// Use [`global`](ScopeRegistry::global) for the process-wide instance, or
/// [`new`](ScopeRegistry::new) for an isolated one.
#[derive(Default)]
pub struct ScopeRegistry {
    inner: Mutex<RegistryInner>,
}

impl ScopeRegistry {
    /// Create an isolated registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry
    pub fn global() -> &'static ScopeRegistry {
        static GLOBAL: OnceLock<ScopeRegistry> = OnceLock::new();
        GLOBAL.get_or_init(ScopeRegistry::new)
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// The default realm, created lazily on first use
    pub fn default_realm(&self) -> Realm {
        let mut inner = self.lock();
        if let Some(realm) = &inner.default_realm {
            return realm.clone();
        }
        let realm = Realm::new();
        inner.default_realm = Some(realm.clone());
        realm
    }

    /// Set the realm used when none is given explicitly
    pub fn set_default_realm(&self, realm: Realm) {
        self.lock().default_realm = Some(realm);
    }

    /// Whether lookups walk the realm hierarchy (default: true)
    pub fn use_hierarchy(&self) -> bool {
        self.lock().use_hierarchy
    }

    /// Enable or disable hierarchy search
    pub fn set_use_hierarchy(&self, use_hierarchy: bool) {
        self.lock().use_hierarchy = use_hierarchy;
    }

    fn resolve_realm(&self, realm: Option<&Realm>) -> Realm {
        match realm {
            Some(r) => r.clone(),
            None => self.default_realm(),
        }
    }

    /// Populate a realm from providers, the explicit discovery step.
    ///
    /// Idempotent per realm: once a realm is initialized, further calls are
    /// no-ops returning the registered count. A provided scope with an
    /// empty name is a fatal configuration error and leaves the realm
    /// uninitialized.
    pub fn initialize(&self, realm: &Realm, providers: &[&dyn ScopeProvider]) -> ContextResult<usize> {
        let mut discovered = Vec::new();
        for (index, provider) in providers.iter().enumerate() {
            for scope in provider.provide() {
                if scope.name().is_empty() {
                    return Err(ContextError::missing_scope_name(format!("provider #{}", index)));
                }
                discovered.push(scope);
            }
        }

        let mut inner = self.lock();
        let entry = inner.realms.entry(realm.id()).or_default();
        if entry.initialized {
            return Ok(entry.scopes.len());
        }
        for scope in discovered {
            if entry.find(scope.name()).is_none() {
                entry.scopes.push(scope);
            }
        }
        entry.sort();
        entry.initialized = true;
        let count = entry.scopes.len();
        debug!(realm = %realm.id(), scopes = count, "initialized context scope realm");
        Ok(count)
    }

    /// Register a scope with a realm; replaces a same-named scope
    pub fn register_scope(&self, realm: Option<&Realm>, scope: Arc<dyn ContextScope>) -> ContextResult<()> {
        if scope.name().is_empty() {
            return Err(ContextError::missing_scope_name("programmatic registration"));
        }
        let realm = self.resolve_realm(realm);
        let mut inner = self.lock();
        let entry = inner.realms.entry(realm.id()).or_default();
        entry.scopes.retain(|s| s.name() != scope.name());
        debug!(realm = %realm.id(), scope = scope.name(), "registered context scope");
        entry.scopes.push(scope);
        entry.sort();
        Ok(())
    }

    /// Unregister a scope by name; returns whether it was registered
    pub fn unregister_scope(&self, realm: Option<&Realm>, name: &str) -> bool {
        let realm = self.resolve_realm(realm);
        let mut inner = self.lock();
        let removed = match inner.realms.get_mut(&realm.id()) {
            Some(entry) => {
                let before = entry.scopes.len();
                entry.scopes.retain(|s| s.name() != name);
                before != entry.scopes.len()
            }
            None => false,
        };
        debug!(realm = %realm.id(), scope = name, removed, "unregistered context scope");
        removed
    }

    /// Whether a scope with the given name is registered in the realm
    /// itself (hierarchy is not searched)
    pub fn is_scope_registered(&self, realm: Option<&Realm>, name: &str) -> bool {
        let realm = self.resolve_realm(realm);
        let inner = self.lock();
        inner
            .realms
            .get(&realm.id())
            .map(|entry| entry.find(name).is_some())
            .unwrap_or(false)
    }

    /// All scopes visible from a realm, ascending by order.
    ///
    /// With hierarchy search enabled the parent chain is walked and merged;
    /// a child scope shadows a same-named parent scope.
    pub fn scopes(&self, realm: Option<&Realm>) -> Vec<Arc<dyn ContextScope>> {
        let realm = self.resolve_realm(realm);
        let inner = self.lock();

        if !inner.use_hierarchy {
            return inner
                .realms
                .get(&realm.id())
                .map(|entry| entry.scopes.clone())
                .unwrap_or_default();
        }

        let mut seen: Vec<String> = Vec::new();
        let mut merged: Vec<Arc<dyn ContextScope>> = Vec::new();
        let mut current = Some(realm);
        while let Some(r) = current {
            if let Some(entry) = inner.realms.get(&r.id()) {
                for scope in &entry.scopes {
                    if !seen.iter().any(|n| n == scope.name()) {
                        seen.push(scope.name().to_string());
                        merged.push(scope.clone());
                    }
                }
            }
            current = r.parent().cloned();
        }
        merged
    }

    /// Look up a scope by name, walking the hierarchy when enabled
    pub fn scope(&self, realm: Option<&Realm>, name: &str) -> Option<Arc<dyn ContextScope>> {
        let realm = self.resolve_realm(realm);
        let inner = self.lock();

        let mut current = Some(realm);
        while let Some(r) = current {
            if let Some(scope) = inner.realms.get(&r.id()).and_then(|entry| entry.find(name)) {
                return Some(scope.clone());
            }
            if !inner.use_hierarchy {
                return None;
            }
            current = r.parent().cloned();
        }
        None
    }

    /// Drop a realm and its scopes, the explicit lifecycle end
    pub fn drop_realm(&self, realm: &Realm) -> bool {
        let removed = self.lock().realms.remove(&realm.id()).is_some();
        debug!(realm = %realm.id(), removed, "dropped context scope realm");
        removed
    }
}
