//! Properties
//!
//! A property is a typed identity token, not a value holder. The typed
//! handle [`Property<T>`] wraps a shared erased definition; [`PropertyRef`]
//! is the erased handle property sets and boxes work with. Identity
//! semantics are configurable per property and drive map-key behavior.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;

use super::boxed::PropertyBox;
use super::converter::ValueConverter;
use super::errors::{PropertyError, PropertyResult};
use super::validator::Validator;
use super::value::{PropertyValue, Value, ValueKind};

/// How a property compares to other properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Identity {
    /// Two handles are equal only when they share the same definition
    #[default]
    Reference,
    /// Equal when full name and declared kind match
    Name,
}

pub(crate) type ComputeFn = Arc<dyn Fn(&PropertyBox) -> PropertyResult<Option<Value>> + Send + Sync>;

pub(crate) struct PropertyDef {
    name: String,
    parent: Option<PropertyRef>,
    kind: ValueKind,
    configuration: HashMap<String, Value>,
    validators: Vec<Validator>,
    converter: Option<ValueConverter>,
    read_only: bool,
    identity: Identity,
    compute: Option<ComputeFn>,
}

/// Erased, cheaply cloneable property handle.
///
/// This is what [`PropertySet`](super::PropertySet) and
/// [`PropertyBox`](super::PropertyBox) store; equality and hashing follow
/// the property's [`Identity`] mode.
#[derive(Clone)]
pub struct PropertyRef(Arc<PropertyDef>);

impl PropertyRef {
    /// The local (unqualified) property name
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// The full hierarchical name, parent segments joined with `.`
    pub fn full_name(&self) -> String {
        match &self.0.parent {
            Some(parent) => format!("{}.{}", parent.full_name(), self.0.name),
            None => self.0.name.clone(),
        }
    }

    /// The declared (logical) value kind
    pub fn kind(&self) -> ValueKind {
        self.0.kind
    }

    /// The kind stored in boxes and projected to backends.
    ///
    /// Differs from [`kind`](Self::kind) only when a converter is attached.
    pub fn model_kind(&self) -> ValueKind {
        self.0
            .converter
            .as_ref()
            .map(|c| c.model_kind())
            .unwrap_or(self.0.kind)
    }

    /// The parent property, for hierarchical paths
    pub fn parent(&self) -> Option<&PropertyRef> {
        self.0.parent.as_ref()
    }

    /// Whether writes are rejected outside the explicit override path
    pub fn is_read_only(&self) -> bool {
        self.0.read_only
    }

    /// Whether the value is computed on read instead of stored
    pub fn is_virtual(&self) -> bool {
        self.0.compute.is_some()
    }

    /// The identity mode of this property
    pub fn identity(&self) -> Identity {
        self.0.identity
    }

    /// Configuration attribute lookup
    pub fn configuration(&self, key: &str) -> Option<&Value> {
        self.0.configuration.get(key)
    }

    pub(crate) fn validators(&self) -> &[Validator] {
        &self.0.validators
    }

    pub(crate) fn converter(&self) -> Option<&ValueConverter> {
        self.0.converter.as_ref()
    }

    pub(crate) fn compute(&self) -> Option<&ComputeFn> {
        self.0.compute.as_ref()
    }
}

impl PartialEq for PropertyRef {
    fn eq(&self, other: &Self) -> bool {
        match self.0.identity {
            Identity::Reference => Arc::ptr_eq(&self.0, &other.0),
            Identity::Name => self.full_name() == other.full_name() && self.0.kind == other.0.kind,
        }
    }
}

impl Eq for PropertyRef {}

impl Hash for PropertyRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.0.identity {
            Identity::Reference => (Arc::as_ptr(&self.0) as usize).hash(state),
            Identity::Name => {
                self.full_name().hash(state);
                self.0.kind.hash(state);
            }
        }
    }
}

impl AsRef<PropertyRef> for PropertyRef {
    fn as_ref(&self) -> &PropertyRef {
        self
    }
}

impl fmt::Debug for PropertyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.full_name())
            .field("kind", &self.0.kind)
            .field("read_only", &self.0.read_only)
            .field("virtual", &self.is_virtual())
            .finish()
    }
}

impl fmt::Display for PropertyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// Typed property handle.
///
/// Dereferences to [`PropertyRef`], so erased accessors are available
/// directly on the typed handle.
pub struct Property<T: PropertyValue> {
    def: PropertyRef,
    _marker: PhantomData<fn() -> T>,
}

impl<T: PropertyValue> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self {
            def: self.def.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: PropertyValue> Deref for Property<T> {
    type Target = PropertyRef;

    fn deref(&self) -> &PropertyRef {
        &self.def
    }
}

impl<T: PropertyValue> AsRef<PropertyRef> for Property<T> {
    fn as_ref(&self) -> &PropertyRef {
        &self.def
    }
}

impl<T: PropertyValue> From<&Property<T>> for PropertyRef {
    fn from(property: &Property<T>) -> Self {
        property.def.clone()
    }
}

impl<T: PropertyValue> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.def.fmt(f)
    }
}

impl<T: PropertyValue> Property<T> {
    /// Start building a property with the given name
    pub fn named(name: impl Into<String>) -> PropertyBuilder<T> {
        PropertyBuilder {
            name: name.into(),
            parent: None,
            configuration: HashMap::new(),
            validators: Vec::new(),
            converter: None,
            read_only: false,
            identity: Identity::default(),
            _marker: PhantomData,
        }
    }

    /// Create a virtual property whose value is computed on read.
    ///
    /// The compute function receives the owning box as an explicit argument
    /// and must not set values on it. Virtual properties are read-only and
    /// have no backing path in value-expression projection. Cyclic compute
    /// dependencies between virtual properties are a caller error and are
    /// not detected here.
    pub fn computed(
        name: impl Into<String>,
        compute: impl Fn(&PropertyBox) -> PropertyResult<Option<T>> + Send + Sync + 'static,
    ) -> Self {
        let def = PropertyDef {
            name: name.into(),
            parent: None,
            kind: T::KIND,
            configuration: HashMap::new(),
            validators: Vec::new(),
            converter: None,
            read_only: true,
            identity: Identity::default(),
            compute: Some(Arc::new(move |b| Ok(compute(b)?.map(T::into_value)))),
        };
        Self {
            def: PropertyRef(Arc::new(def)),
            _marker: PhantomData,
        }
    }

    /// Unwrap a runtime value into `T`, raising a typed mismatch error
    pub(crate) fn downcast(&self, value: Value) -> PropertyResult<T> {
        let actual = value.kind();
        T::from_value(value)
            .ok_or_else(|| PropertyError::type_mismatch(self.full_name(), T::KIND, actual))
    }
}

/// Fluent [`Property`] builder
pub struct PropertyBuilder<T: PropertyValue> {
    name: String,
    parent: Option<PropertyRef>,
    configuration: HashMap<String, Value>,
    validators: Vec<Validator>,
    converter: Option<ValueConverter>,
    read_only: bool,
    identity: Identity,
    _marker: PhantomData<fn() -> T>,
}

impl<T: PropertyValue> PropertyBuilder<T> {
    /// Set the parent property, making this a hierarchical path
    pub fn parent(mut self, parent: &PropertyRef) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    /// Attach a configuration attribute
    pub fn configuration(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.configuration.insert(key.into(), value.into());
        self
    }

    /// Attach a validator; validators run in attach order
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Attach a value converter.
    ///
    /// The converter's logical kind must match the property's declared kind;
    /// a mismatch surfaces as a conversion error on first use.
    pub fn converter(mut self, converter: ValueConverter) -> Self {
        self.converter = Some(converter);
        self
    }

    /// Mark the property read-only
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Set the identity mode
    pub fn identity(mut self, identity: Identity) -> Self {
        self.identity = identity;
        self
    }

    /// Finish building the property
    pub fn build(self) -> Property<T> {
        let def = PropertyDef {
            name: self.name,
            parent: self.parent,
            kind: T::KIND,
            configuration: self.configuration,
            validators: self.validators,
            converter: self.converter,
            read_only: self.read_only,
            identity: self.identity,
            compute: None,
        };
        Property {
            def: PropertyRef(Arc::new(def)),
            _marker: PhantomData,
        }
    }
}
