//! Tests for instance reads and listings

use super::*;
use crate::app::models::TimeWindow;
use crate::app::services::instance_store::{StoreRule, VersionedInstanceStore};

fn populated_store() -> VersionedInstanceStore {
    let store = VersionedInstanceStore::in_memory();
    store
        .store(&test_key("raw", Some(1)), &flat_rows(&[100, 200, 300], 1.0), StoreRule::ReplaceAll, false)
        .unwrap();
    store
        .store(&test_key("raw", Some(2)), &flat_rows(&[200, 400], 2.0), StoreRule::ReplaceAll, false)
        .unwrap();
    store
        .store(&test_key("obs", None), &flat_rows(&[500], 3.0), StoreRule::ReplaceAll, false)
        .unwrap();

    let other = ProfileInstanceKey::new("SWT", "TENK", "Depth", "raw", None);
    store
        .store(&other, &flat_rows(&[100], 4.0), StoreRule::ReplaceAll, false)
        .unwrap();
    store
}

#[test]
fn test_read_window_respects_inclusivity() {
    let store = populated_store();
    let key = test_key("raw", Some(1));

    let closed = store.read_window(&key, &TimeWindow::closed(100, 300)).unwrap();
    assert_eq!(closed.len(), 3);

    let open = TimeWindow::closed(100, 300).with_inclusivity(false, false);
    let rows = store.read_window(&key, &open).unwrap();
    assert_eq!(rows.iter().map(|r| r.timestamp).collect::<Vec<_>>(), vec![200]);

    assert_eq!(store.count_in_window(&key, &open).unwrap(), 1);
}

#[test]
fn test_neighbour_reads() {
    let store = populated_store();
    let key = test_key("raw", Some(1));

    let before = store.read_before(&key, 300, 5).unwrap();
    assert_eq!(before.iter().map(|r| r.timestamp).collect::<Vec<_>>(), vec![100, 200]);

    let after = store.read_after(&key, 100, 1).unwrap();
    assert_eq!(after.iter().map(|r| r.timestamp).collect::<Vec<_>>(), vec![200]);
}

#[test]
fn test_series_keys_are_scoped_and_ordered() {
    let store = populated_store();

    let keys = store.series_keys("SWT", "KEYS", "Depth").unwrap();
    assert_eq!(
        keys,
        vec![
            test_key("obs", None),
            test_key("raw", Some(1)),
            test_key("raw", Some(2)),
        ]
    );

    let raw = store.version_keys("SWT", "KEYS", "Depth", "raw").unwrap();
    assert_eq!(raw.len(), 2);
    assert!(store.series_keys("SWT", "NOPE", "Depth").unwrap().is_empty());
}

#[test]
fn test_summaries_do_not_need_rows() {
    let store = populated_store();
    let summaries: Vec<_> = store
        .list_instance_summaries(TimeWindow::closed(150, 450))
        .collect::<crate::Result<Vec<_>>>()
        .unwrap();

    assert_eq!(summaries.len(), 4);
    let raw_2 = summaries
        .iter()
        .find(|s| s.key == test_key("raw", Some(2)))
        .unwrap();
    assert_eq!(raw_2.row_count_in_window, 2);
    assert_eq!(raw_2.parameter_count, 2);
    assert_eq!(raw_2.first_timestamp, Some(200));
    assert_eq!(raw_2.last_timestamp, Some(400));
}

#[test]
fn test_summaries_skip_instances_dropped_mid_listing() {
    let store = VersionedInstanceStore::in_memory();
    for version in ["a", "b", "c"] {
        store
            .store(&test_key(version, None), &flat_rows(&[100], 1.0), StoreRule::ReplaceAll, false)
            .unwrap();
    }

    let mut listing = store.list_instance_summaries(TimeWindow::unbounded());
    let first = listing.next().unwrap().unwrap();
    assert_eq!(first.key, test_key("a", None));

    // "b" is already in the buffered key batch
    store.delete(&test_key("b", None), None, false).unwrap();

    let rest: Vec<ProfileInstanceKey> = listing.map(|s| s.unwrap().key).collect();
    assert_eq!(rest, vec![test_key("c", None)]);
}

#[test]
fn test_catalog_masks() {
    let store = populated_store();

    let keys: Vec<ProfileInstanceKey> = store
        .catalog(Some("swt"), Some("K*"), None, Some("r?w"), TimeWindow::unbounded())
        .unwrap()
        .map(|s| s.unwrap().key)
        .collect();
    assert_eq!(keys, vec![test_key("raw", Some(1)), test_key("raw", Some(2))]);

    let all = store
        .catalog(None, None, Some("DEPTH"), None, TimeWindow::unbounded())
        .unwrap()
        .count();
    assert_eq!(all, 4);
}

#[test]
fn test_listing_is_restartable() {
    let store = populated_store();
    let first: Vec<_> = store.partition_keys().map(|k| k.unwrap()).collect();
    let second: Vec<_> = store.partition_keys().map(|k| k.unwrap()).collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 4);
}
