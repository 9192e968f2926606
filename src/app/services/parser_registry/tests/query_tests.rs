//! Tests for recipe listings and catalogs

use super::*;

fn populated_registry() -> ParserDefinitionRegistry {
    let registry = create_test_registry();
    for (office, location, parameter) in [
        ("SWT", "TENK", "Depth"),
        ("SWT", "KEYS", "Pres"),
        ("HEC", "ALPHA", "Depth"),
        ("SWT", "KEYS", "Depth"),
    ] {
        registry
            .store(create_test_definition(office, location, parameter), true)
            .unwrap();
    }
    registry
}

fn keys(definitions: impl Iterator<Item = ParserDefinition>) -> Vec<String> {
    definitions
        .map(|d| format!("{}/{}", d.location_id, d.key_parameter))
        .collect()
}

#[test]
fn test_list_all_is_ordered() {
    let registry = populated_registry();
    assert_eq!(
        keys(registry.list_all()),
        vec!["HEC/ALPHA/Depth", "SWT/KEYS/Depth", "SWT/KEYS/Pres", "SWT/TENK/Depth"]
    );
}

#[test]
fn test_list_all_is_lazy_and_restartable() {
    let registry = populated_registry();

    let mut listing = registry.list_all();
    assert_eq!(listing.next().unwrap().location_id.name, "ALPHA");

    // Deletions made mid-walk are seen by the listing
    registry
        .delete(&LocationId::new("SWT", "TENK"), "Depth")
        .unwrap();
    assert_eq!(listing.count(), 2);

    assert_eq!(registry.list_all().count(), 3);
}

#[test]
fn test_catalog_masks() {
    let registry = populated_registry();

    let swt_depth = registry
        .catalog(Some("swt"), None, Some("depth"), true)
        .unwrap();
    assert_eq!(keys(swt_depth), vec!["SWT/KEYS/Depth", "SWT/TENK/Depth"]);

    let wildcard = registry.catalog(None, Some("?E*"), None, true).unwrap();
    assert_eq!(
        keys(wildcard),
        vec!["SWT/KEYS/Depth", "SWT/KEYS/Pres", "SWT/TENK/Depth"]
    );
}

#[test]
fn test_catalog_can_omit_parameters() {
    let registry = populated_registry();

    let summaries: Vec<_> = registry.catalog(None, None, None, false).unwrap().collect();
    assert_eq!(summaries.len(), 4);
    assert!(summaries.iter().all(|d| d.parameters.is_empty()));

    let full: Vec<_> = registry.catalog(None, None, None, true).unwrap().collect();
    assert!(full.iter().all(|d| d.parameters.len() == 2));
}

#[test]
fn test_catalog_on_empty_registry() {
    let registry = create_test_registry();
    assert_eq!(registry.catalog(Some("*"), Some("*"), Some("*"), true).unwrap().count(), 0);
}
