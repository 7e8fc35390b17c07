//! Property Model Invariant Tests
//!
//! - A box accepts values only for properties of its own set
//! - Set/get round-trips through converters
//! - Read-only writes require the explicit override path
//! - Identifier subsets drive box equality
//! - Virtual properties recompute on every read

use datum::property::{
    Property, PropertyBox, PropertyError, PropertySet, Validator, Value, ValueConverter,
};

// =============================================================================
// Helper Functions
// =============================================================================

fn people_set() -> (Property<i64>, Property<String>, PropertySet) {
    let id = Property::<i64>::named("id").build();
    let name = Property::<String>::named("name").build();
    let set = PropertySet::builder()
        .with(&id)
        .with(&name)
        .identifier(&id)
        .build()
        .unwrap();
    (id, name, set)
}

// =============================================================================
// Capability Tests
// =============================================================================

/// setValue accepts properties of the set and rejects foreign properties
/// with a capability error.
#[test]
fn test_box_scoped_to_its_property_set() {
    let (id, name, set) = people_set();
    let foreign = Property::<i64>::named("foreign").build();

    let boxed = PropertyBox::create(set);
    boxed.set_value(&id, 1).unwrap();
    boxed.set_value(&name, "a".to_string()).unwrap();

    let err = boxed.set_value(&foreign, 9).unwrap_err();
    assert!(matches!(err, PropertyError::NotInSet { .. }));
}

/// Read-only properties reject writes unless the override path is used.
#[test]
fn test_read_only_override_path() {
    let code = Property::<String>::named("code").read_only().build();
    let set = PropertySet::builder().with(&code).build().unwrap();
    let boxed = PropertyBox::create(set);

    let err = boxed.set_value(&code, "x".to_string()).unwrap_err();
    assert!(matches!(err, PropertyError::ReadOnly { .. }));

    boxed.set_value_ignore_read_only(&code, "x".to_string()).unwrap();
    assert_eq!(boxed.get(&code).unwrap(), Some("x".to_string()));
}

// =============================================================================
// Round-Trip Tests
// =============================================================================

/// set then get returns the same value.
#[test]
fn test_set_get_round_trip() {
    let (id, name, set) = people_set();
    let boxed = PropertyBox::create(set);

    boxed.set_value(&id, 42).unwrap();
    boxed.set_value(&name, "alice".to_string()).unwrap();

    assert_eq!(boxed.get(&id).unwrap(), Some(42));
    assert_eq!(boxed.get(&name).unwrap(), Some("alice".to_string()));
}

/// Converter round-trip through a box: the stored representation is the
/// model kind, reads convert back to the logical value.
#[test]
fn test_converter_round_trip_through_box() {
    let valid = Property::<bool>::named("valid")
        .converter(ValueConverter::numeric_boolean())
        .build();
    let set = PropertySet::builder().with(&valid).build().unwrap();
    let boxed = PropertyBox::create(set);

    for flag in [true, false] {
        boxed.set_value(&valid, flag).unwrap();
        assert_eq!(boxed.value(valid.as_ref()), Some(Value::Int(if flag { 1 } else { 0 })));
        assert_eq!(boxed.get(&valid).unwrap(), Some(flag));
    }
}

/// Explicit fallback for absent values; no implicit recovery anywhere else.
#[test]
fn test_get_or_default() {
    let (id, _name, set) = people_set();
    let boxed = PropertyBox::create(set);

    assert_eq!(boxed.get_or(&id, -1).unwrap(), -1);
    boxed.set_value(&id, 5).unwrap();
    assert_eq!(boxed.get_or(&id, -1).unwrap(), 5);
}

// =============================================================================
// Equality Tests
// =============================================================================

/// Boxes with equal identifier values are equal regardless of other
/// property values; differing identifiers make them unequal.
#[test]
fn test_identifier_equality_scenario() {
    let (id, name, set) = people_set();

    let box1 = PropertyBox::builder(set.clone())
        .set(&id, 1)
        .set(&name, "a".to_string())
        .build()
        .unwrap();
    let box2 = PropertyBox::builder(set.clone())
        .set(&id, 1)
        .set(&name, "b".to_string())
        .build()
        .unwrap();
    let box3 = PropertyBox::builder(set)
        .set(&id, 2)
        .set(&name, "a".to_string())
        .build()
        .unwrap();

    assert_eq!(box1, box2);
    assert_ne!(box1, box3);
}

// =============================================================================
// Virtual Property Tests
// =============================================================================

/// Virtual values recompute from current box state after every mutation.
#[test]
fn test_virtual_property_no_caching() {
    let name = Property::<String>::named("name").build();
    let surname = Property::<String>::named("surname").build();
    let full = {
        let name = name.clone();
        let surname = surname.clone();
        Property::<String>::computed("full_name", move |b| {
            match (b.get(&name)?, b.get(&surname)?) {
                (Some(n), Some(s)) => Ok(Some(format!("{} {}", n, s))),
                _ => Ok(None),
            }
        })
    };
    let set = PropertySet::builder()
        .with(&name)
        .with(&surname)
        .with(&full)
        .build()
        .unwrap();
    let boxed = PropertyBox::create(set);

    assert_eq!(boxed.get(&full).unwrap(), None);

    boxed.set_value(&name, "Grace".to_string()).unwrap();
    boxed.set_value(&surname, "Hopper".to_string()).unwrap();
    assert_eq!(boxed.get(&full).unwrap(), Some("Grace Hopper".to_string()));

    boxed.set_value(&surname, "Murray".to_string()).unwrap();
    assert_eq!(boxed.get(&full).unwrap(), Some("Grace Murray".to_string()));
}

// =============================================================================
// Validation Tests
// =============================================================================

/// Validation is fail-fast by default; invalid-allowed boxes defer it to
/// an explicit call.
#[test]
fn test_validation_policies() {
    let age = Property::<i64>::named("age")
        .validator(Validator::min(0))
        .validator(Validator::less_than(150))
        .build();
    let set = PropertySet::builder().with(&age).build().unwrap();

    // Fail-fast on set
    let boxed = PropertyBox::create(set.clone());
    assert!(boxed.set_value(&age, -5).is_err());

    // Invalid allowed: construction succeeds, explicit validation reports
    let boxed = PropertyBox::builder(set)
        .invalid_allowed(true)
        .set(&age, -5)
        .build()
        .unwrap();
    assert_eq!(boxed.get(&age).unwrap(), Some(-5));
    assert!(boxed.validate().is_err());
}

/// validate_all reports every violation at once.
#[test]
fn test_validate_all_aggregates_violations() {
    let age = Property::<i64>::named("age").validator(Validator::min(0)).build();
    let name = Property::<String>::named("name")
        .validator(Validator::not_empty())
        .build();
    let set = PropertySet::builder().with(&age).with(&name).build().unwrap();

    let boxed = PropertyBox::builder(set)
        .invalid_allowed(true)
        .set(&age, -1)
        .set(&name, "".to_string())
        .build()
        .unwrap();

    let err = boxed.validate_all().unwrap_err();
    assert_eq!(err.violation_count(), 2);
}
