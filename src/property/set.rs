//! Property sets
//!
//! An ordered, duplicate-free, immutable group of properties with an
//! optional identifier subset. Identifiers must be part of the set; the
//! builder enforces this at build time.

use super::errors::{PropertyError, PropertyResult};
use super::property::PropertyRef;

/// Ordered, immutable property collection.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySet {
    properties: Vec<PropertyRef>,
    identifiers: Vec<PropertyRef>,
}

impl PropertySet {
    /// Start building a property set
    pub fn builder() -> PropertySetBuilder {
        PropertySetBuilder {
            properties: Vec::new(),
            identifiers: Vec::new(),
        }
    }

    /// Create a set from properties, with no identifier subset.
    ///
    /// Duplicates (by property identity) are skipped.
    pub fn of<I, P>(properties: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<PropertyRef>,
    {
        let mut list: Vec<PropertyRef> = Vec::new();
        for p in properties {
            let p = p.as_ref();
            if !list.contains(p) {
                list.push(p.clone());
            }
        }
        Self {
            properties: list,
            identifiers: Vec::new(),
        }
    }

    /// Number of properties in the set
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Whether the given property belongs to the set
    pub fn contains(&self, property: &PropertyRef) -> bool {
        self.properties.contains(property)
    }

    /// Properties in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &PropertyRef> {
        self.properties.iter()
    }

    /// The identifier subset, in declaration order; empty if none declared
    pub fn identifiers(&self) -> impl Iterator<Item = &PropertyRef> {
        self.identifiers.iter()
    }

    /// Whether an identifier subset is declared
    pub fn has_identifiers(&self) -> bool {
        !self.identifiers.is_empty()
    }

    /// The first identifier, if any
    pub fn first_identifier(&self) -> Option<&PropertyRef> {
        self.identifiers.first()
    }
}

/// Fluent [`PropertySet`] builder
pub struct PropertySetBuilder {
    properties: Vec<PropertyRef>,
    identifiers: Vec<PropertyRef>,
}

impl PropertySetBuilder {
    /// Add a property; duplicates are skipped so composition is idempotent
    pub fn with(mut self, property: impl AsRef<PropertyRef>) -> Self {
        let p = property.as_ref();
        if !self.properties.contains(p) {
            self.properties.push(p.clone());
        }
        self
    }

    /// Add every property of another set, preserving its order
    pub fn with_all(mut self, set: &PropertySet) -> Self {
        for p in set.iter() {
            if !self.properties.contains(p) {
                self.properties.push(p.clone());
            }
        }
        self
    }

    /// Mark a property as part of the identifier subset.
    ///
    /// The property must also be added to the set; `build` fails otherwise.
    pub fn identifier(mut self, property: impl AsRef<PropertyRef>) -> Self {
        let p = property.as_ref();
        if !self.identifiers.contains(p) {
            self.identifiers.push(p.clone());
        }
        self
    }

    /// Finish building; fails if an identifier is not part of the set
    pub fn build(self) -> PropertyResult<PropertySet> {
        for id in &self.identifiers {
            if !self.properties.contains(id) {
                return Err(PropertyError::not_in_set(id.full_name()));
            }
        }
        Ok(PropertySet {
            properties: self.properties,
            identifiers: self.identifiers,
        })
    }
}
