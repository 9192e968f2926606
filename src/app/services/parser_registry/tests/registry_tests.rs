//! Tests for storing, fetching and deleting recipes

use super::*;
use crate::Error;
use crate::app::models::ColumnSpec;

#[test]
fn test_store_and_get() {
    let registry = create_test_registry();
    let definition = create_test_definition("SWT", "KEYS", "Depth");

    registry.store(definition.clone(), true).unwrap();

    let fetched = registry.get(&LocationId::new("SWT", "KEYS"), "Depth").unwrap();
    assert_eq!(fetched, definition);
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_fail_if_exists() {
    let registry = create_test_registry();
    registry
        .store(create_test_definition("SWT", "KEYS", "Depth"), true)
        .unwrap();

    let result = registry.store(create_test_definition("SWT", "KEYS", "Depth"), true);
    assert!(matches!(result, Err(Error::AlreadyExists { .. })));

    let mut updated = create_test_definition("SWT", "KEYS", "Depth");
    updated.time_zone = "America/Chicago".to_string();
    registry.store(updated, false).unwrap();
    assert_eq!(
        registry
            .get(&LocationId::new("SWT", "KEYS"), "Depth")
            .unwrap()
            .time_zone,
        "America/Chicago"
    );
}

#[test]
fn test_unknown_location_is_rejected() {
    let registry = create_test_registry();
    let result = registry.store(create_test_definition("SWT", "NOWHERE", "Depth"), true);
    assert!(matches!(result, Err(Error::UnknownLocation { .. })));
    assert!(registry.is_empty());
}

#[test]
fn test_invalid_definitions_are_rejected() {
    let registry = create_test_registry();

    let mut gap = create_test_definition("SWT", "KEYS", "Depth");
    gap.parameters[1].ordinal = 2;
    assert!(matches!(registry.store(gap, true), Err(Error::InvalidArgument { .. })));

    let mut mixed = create_test_definition("SWT", "KEYS", "Depth");
    mixed.parameters[1].column = ColumnSpec::Columnar { start: 0, length: 4 };
    assert!(matches!(registry.store(mixed, true), Err(Error::InvalidArgument { .. })));

    let mut no_delimiter = create_test_definition("SWT", "KEYS", "Depth");
    no_delimiter.time_spec = TimeSpec::Indexed {
        time_field: 0,
        second_time_field: None,
        field_delimiter: String::new(),
        record_delimiter: "\n".to_string(),
    };
    assert!(matches!(registry.store(no_delimiter, true), Err(Error::InvalidArgument { .. })));

    let mut bad_zone = create_test_definition("SWT", "KEYS", "Depth");
    bad_zone.time_zone = "Moon/Tranquility".to_string();
    assert!(matches!(registry.store(bad_zone, true), Err(Error::InvalidArgument { .. })));

    let mut bad_format = create_test_definition("SWT", "KEYS", "Depth");
    bad_format.time_format = "whenever".to_string();
    assert!(matches!(registry.store(bad_format, true), Err(Error::InvalidArgument { .. })));

    assert!(registry.is_empty());
}

#[test]
fn test_get_and_delete_missing() {
    let registry = create_test_registry();
    let location = LocationId::new("SWT", "KEYS");

    assert!(matches!(registry.get(&location, "Depth"), Err(Error::NotFound { .. })));
    assert!(matches!(registry.delete(&location, "Depth"), Err(Error::NotFound { .. })));

    registry
        .store(create_test_definition("SWT", "KEYS", "Depth"), true)
        .unwrap();
    registry.delete(&location, "Depth").unwrap();
    assert!(!registry.contains(&location, "Depth"));
}

#[test]
fn test_registries_are_independent() {
    let first = create_test_registry();
    let second = create_test_registry();

    first
        .store(create_test_definition("SWT", "KEYS", "Depth"), true)
        .unwrap();

    assert_eq!(first.len(), 1);
    assert!(second.is_empty());
}
