//! Property boxes
//!
//! A box holds values for exactly one property set. Value storage is guarded
//! by an internal lock: single-property operations are safe across threads,
//! but nothing is atomic across multiple properties. Absence represents
//! null; storing nothing removes the entry.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::errors::{PropertyError, PropertyResult, ValidationError};
use super::property::{Property, PropertyRef};
use super::set::PropertySet;
use super::value::{PropertyValue, Value};

type EqFn = Arc<dyn Fn(&PropertyBox, &PropertyBox) -> bool + Send + Sync>;
type HashFn = Arc<dyn Fn(&PropertyBox) -> u64 + Send + Sync>;

/// Equality strategy for a box.
///
/// The default uses the identifier subset of the property set when one is
/// declared, and full-value comparison otherwise.
#[derive(Clone, Default)]
pub enum Equality {
    /// Identifier subset if declared, full values otherwise
    #[default]
    Default,
    /// Caller-supplied equality and hash pair
    Custom { eq: EqFn, hash: HashFn },
}

impl Equality {
    /// Create a custom equality/hash provider pair
    pub fn custom(
        eq: impl Fn(&PropertyBox, &PropertyBox) -> bool + Send + Sync + 'static,
        hash: impl Fn(&PropertyBox) -> u64 + Send + Sync + 'static,
    ) -> Self {
        Self::Custom {
            eq: Arc::new(eq),
            hash: Arc::new(hash),
        }
    }
}

impl fmt::Debug for Equality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Equality::Default => f.write_str("Default"),
            Equality::Custom { .. } => f.write_str("Custom"),
        }
    }
}

/// Typed heterogeneous value container scoped to one [`PropertySet`].
pub struct PropertyBox {
    set: PropertySet,
    values: RwLock<HashMap<PropertyRef, Value>>,
    invalid_allowed: bool,
    equality: Equality,
}

impl PropertyBox {
    /// Create an empty box over the given set
    pub fn create(set: PropertySet) -> Self {
        Self {
            set,
            values: RwLock::new(HashMap::new()),
            invalid_allowed: false,
            equality: Equality::Default,
        }
    }

    /// Start building a box over the given set
    pub fn builder(set: PropertySet) -> PropertyBoxBuilder {
        PropertyBoxBuilder {
            boxed: Self::create(set),
            error: None,
        }
    }

    /// The property set this box is scoped to
    pub fn property_set(&self) -> &PropertySet {
        &self.set
    }

    /// Whether invalid values may be stored without validator checks
    pub fn is_invalid_allowed(&self) -> bool {
        self.invalid_allowed
    }

    fn read_values(&self) -> RwLockReadGuard<'_, HashMap<PropertyRef, Value>> {
        match self.values.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_values(&self) -> RwLockWriteGuard<'_, HashMap<PropertyRef, Value>> {
        match self.values.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Set a value for a property.
    ///
    /// Fails if the property is not in the set, is read-only, or the value
    /// is rejected by the property's converter or validators (unless the
    /// box allows invalid values).
    pub fn set_value<T: PropertyValue>(&self, property: &Property<T>, value: T) -> PropertyResult<()> {
        self.write_value(property.as_ref(), Some(value.into_value()), false)
    }

    /// Set a value bypassing the read-only check
    pub fn set_value_ignore_read_only<T: PropertyValue>(
        &self,
        property: &Property<T>,
        value: T,
    ) -> PropertyResult<()> {
        self.write_value(property.as_ref(), Some(value.into_value()), true)
    }

    /// Remove the value of a property, equivalent to storing null
    pub fn clear_value(&self, property: &PropertyRef) -> PropertyResult<()> {
        self.write_value(property, None, false)
    }

    fn write_value(
        &self,
        property: &PropertyRef,
        value: Option<Value>,
        ignore_read_only: bool,
    ) -> PropertyResult<()> {
        let name = property.full_name();
        if !self.set.contains(property) {
            return Err(PropertyError::not_in_set(name));
        }
        if property.is_virtual() {
            // Virtual values are computed, never stored; the override path
            // does not apply.
            return Err(PropertyError::read_only(name));
        }
        if property.is_read_only() && !ignore_read_only {
            return Err(PropertyError::read_only(name));
        }

        match value {
            Some(logical) => {
                if logical.kind() != property.kind() {
                    return Err(PropertyError::type_mismatch(
                        name,
                        property.kind(),
                        logical.kind(),
                    ));
                }
                if !self.invalid_allowed {
                    for validator in property.validators() {
                        validator.validate(&name, Some(&logical))?;
                    }
                }
                let stored = match property.converter() {
                    Some(converter) => converter
                        .to_model(logical)
                        .map_err(|reason| PropertyError::conversion(&name, reason))?,
                    None => logical,
                };
                self.write_values().insert(property.clone(), stored);
            }
            None => {
                self.write_values().remove(property);
            }
        }
        Ok(())
    }

    /// Insert an already-stored (model) value, used by copy and clone paths.
    pub(crate) fn insert_stored(&self, property: &PropertyRef, value: Value) {
        self.write_values().insert(property.clone(), value);
    }

    /// Read the typed value of a property.
    ///
    /// Virtual properties compute from the current box state on every call;
    /// stored values pass back through the property's converter. Returns
    /// `Ok(None)` when no value is present.
    pub fn get<T: PropertyValue>(&self, property: &Property<T>) -> PropertyResult<Option<T>> {
        let pref: &PropertyRef = property.as_ref();
        if !self.set.contains(pref) {
            return Err(PropertyError::not_in_set(pref.full_name()));
        }

        if let Some(compute) = pref.compute() {
            return match compute(self)? {
                Some(value) => property.downcast(value).map(Some),
                None => Ok(None),
            };
        }

        let stored = { self.read_values().get(pref).cloned() };
        match stored {
            None => Ok(None),
            Some(model) => {
                let logical = match pref.converter() {
                    Some(converter) => converter
                        .from_model(model)
                        .map_err(|reason| PropertyError::conversion(pref.full_name(), reason))?,
                    None => model,
                };
                property.downcast(logical).map(Some)
            }
        }
    }

    /// Read a value, falling back to an explicit default when absent
    pub fn get_or<T: PropertyValue>(&self, property: &Property<T>, default: T) -> PropertyResult<T> {
        Ok(self.get(property)?.unwrap_or(default))
    }

    /// The stored (model) value of a property, if present.
    ///
    /// Does not compute virtual properties and does not apply converters.
    pub fn value(&self, property: &PropertyRef) -> Option<Value> {
        self.read_values().get(property).cloned()
    }

    /// Whether a value is stored for the property
    pub fn contains_value(&self, property: &PropertyRef) -> bool {
        self.read_values().contains_key(property)
    }

    /// Number of stored values
    pub fn value_count(&self) -> usize {
        self.read_values().len()
    }

    /// Snapshot of the stored property/value pairs, in set declaration order
    pub fn property_values(&self) -> Vec<(PropertyRef, Value)> {
        let values = self.read_values();
        self.set
            .iter()
            .filter_map(|p| values.get(p).map(|v| (p.clone(), v.clone())))
            .collect()
    }

    /// Clone this box onto another property set, keeping the values of the
    /// properties both sets contain.
    pub fn clone_subset(&self, properties: &PropertySet) -> PropertyBox {
        let target = PropertyBox {
            set: properties.clone(),
            values: RwLock::new(HashMap::new()),
            invalid_allowed: self.invalid_allowed,
            equality: Equality::Default,
        };
        for (p, v) in self.property_values() {
            if properties.contains(&p) {
                target.insert_stored(&p, v);
            }
        }
        target
    }

    fn logical_value(&self, property: &PropertyRef) -> PropertyResult<Option<Value>> {
        match self.value(property) {
            None => Ok(None),
            Some(model) => match property.converter() {
                Some(converter) => converter
                    .from_model(model)
                    .map(Some)
                    .map_err(|reason| PropertyError::conversion(property.full_name(), reason)),
                None => Ok(Some(model)),
            },
        }
    }

    /// Run every property's validators against the current values,
    /// failing on the first violation.
    ///
    /// Virtual properties are skipped.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for property in self.set.iter() {
            if property.is_virtual() {
                continue;
            }
            let name = property.full_name();
            let logical = self
                .logical_value(property)
                .map_err(|e| ValidationError::violation(&name, e.to_string()))?;
            for validator in property.validators() {
                validator.validate(&name, logical.as_ref())?;
            }
        }
        Ok(())
    }

    /// Run every validator and aggregate all violations into one error
    pub fn validate_all(&self) -> Result<(), ValidationError> {
        let mut violations = Vec::new();
        for property in self.set.iter() {
            if property.is_virtual() {
                continue;
            }
            let name = property.full_name();
            match self.logical_value(property) {
                Ok(logical) => {
                    for validator in property.validators() {
                        if let Err(v) = validator.validate(&name, logical.as_ref()) {
                            violations.push(v);
                        }
                    }
                }
                Err(e) => violations.push(ValidationError::violation(&name, e.to_string())),
            }
        }
        match violations.len() {
            0 => Ok(()),
            1 => Err(violations.remove(0)),
            _ => Err(ValidationError::Aggregate(violations)),
        }
    }
}

impl Clone for PropertyBox {
    fn clone(&self) -> Self {
        let snapshot = self.read_values().clone();
        Self {
            set: self.set.clone(),
            values: RwLock::new(snapshot),
            invalid_allowed: self.invalid_allowed,
            equality: self.equality.clone(),
        }
    }
}

impl fmt::Debug for PropertyBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = self.property_values();
        let mut map = f.debug_map();
        for (p, v) in &values {
            map.entry(&p.full_name(), v);
        }
        map.finish()
    }
}

impl PartialEq for PropertyBox {
    fn eq(&self, other: &Self) -> bool {
        if let Equality::Custom { eq, .. } = &self.equality {
            return eq(self, other);
        }

        if self.set.has_identifiers() {
            let my_ids: Vec<&PropertyRef> = self.set.identifiers().collect();
            return other.set.identifiers().count() == my_ids.len()
                && my_ids
                    .iter()
                    .all(|p| other.set.contains(p) && self.value(p) == other.value(p));
        }

        let mine = self.read_values().clone();
        let theirs = other.read_values().clone();
        mine == theirs
    }
}

impl Hash for PropertyBox {
    fn hash<H: Hasher>(&self, state: &mut H) {
        if let Equality::Custom { hash, .. } = &self.equality {
            state.write_u64(hash(self));
            return;
        }

        let values = self.read_values();
        if self.set.has_identifiers() {
            for p in self.set.identifiers() {
                if let Some(v) = values.get(p) {
                    v.hash_into(state);
                }
            }
        } else {
            for p in self.set.iter() {
                if let Some(v) = values.get(p) {
                    v.hash_into(state);
                }
            }
        }
    }
}

/// Fluent [`PropertyBox`] builder.
///
/// Errors raised while setting values are deferred and reported by
/// [`build`](PropertyBoxBuilder::build). Call
/// [`invalid_allowed`](PropertyBoxBuilder::invalid_allowed) before setting
/// values that should skip validation.
pub struct PropertyBoxBuilder {
    boxed: PropertyBox,
    error: Option<PropertyError>,
}

impl PropertyBoxBuilder {
    /// Allow storing values that fail validation; explicit `validate` calls
    /// still report them
    pub fn invalid_allowed(mut self, allowed: bool) -> Self {
        self.boxed.invalid_allowed = allowed;
        self
    }

    /// Set a property value
    pub fn set<T: PropertyValue>(mut self, property: &Property<T>, value: T) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.boxed.set_value(property, value) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Set a property value bypassing the read-only check
    pub fn set_ignore_read_only<T: PropertyValue>(mut self, property: &Property<T>, value: T) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.boxed.set_value_ignore_read_only(property, value) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Copy values from another box for the properties this box's set
    /// contains, skipping read-only properties
    pub fn copy_values(self, source: &PropertyBox) -> Self {
        for (p, v) in source.property_values() {
            if !p.is_read_only() && self.boxed.set.contains(&p) {
                self.boxed.insert_stored(&p, v);
            }
        }
        self
    }

    /// Set the equality strategy
    pub fn equality(mut self, equality: Equality) -> Self {
        self.boxed.equality = equality;
        self
    }

    /// Finish building, reporting the first deferred error if any
    pub fn build(self) -> PropertyResult<PropertyBox> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.boxed),
        }
    }
}
