//! Shared fixtures for instance store tests

use chrono::{DateTime, TimeZone, Utc};
use std::ops::Bound;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::app::adapters::memory_store::InMemoryPointStore;
use crate::app::models::{DecodedRow, ProfileInstanceKey};
use crate::app::services::instance_store::{PointStore, StoredPoint, VersionedInstanceStore};
use crate::{Error, Result};

mod query_tests;

pub fn version_date(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, 0, 0, 0).unwrap()
}

pub fn test_key(version: &str, day: Option<u32>) -> ProfileInstanceKey {
    ProfileInstanceKey::new("SWT", "KEYS", "Depth", version, day.map(version_date))
}

/// Rows at the given timestamps with two values each
pub fn rows(points: &[(i64, Option<f64>, Option<f64>)]) -> Vec<DecodedRow> {
    points
        .iter()
        .map(|&(ts, a, b)| DecodedRow::new(ts, vec![a, b]))
        .collect()
}

/// Rows at the given timestamps, both values equal to `value`
pub fn flat_rows(timestamps: &[i64], value: f64) -> Vec<DecodedRow> {
    timestamps
        .iter()
        .map(|&ts| DecodedRow::new(ts, vec![Some(value), Some(value)]))
        .collect()
}

/// Point store whose upserts fail once armed
#[derive(Debug, Default)]
pub struct FlakyPointStore {
    pub inner: InMemoryPointStore,
    pub fail_upserts: AtomicBool,
    pub fail_partway: AtomicBool,
}

impl FlakyPointStore {
    pub fn arm(&self) {
        self.fail_upserts.store(true, Ordering::SeqCst);
    }

    /// Next upsert writes its first point, then fails
    pub fn arm_partway(&self) {
        self.fail_partway.store(true, Ordering::SeqCst);
    }
}

impl PointStore for FlakyPointStore {
    fn scan(&self, key: &ProfileInstanceKey, start: i64, end: i64) -> Result<Vec<StoredPoint>> {
        self.inner.scan(key, start, end)
    }

    fn scan_before(&self, key: &ProfileInstanceKey, before: i64, limit: usize) -> Result<Vec<StoredPoint>> {
        self.inner.scan_before(key, before, limit)
    }

    fn scan_after(&self, key: &ProfileInstanceKey, after: i64, limit: usize) -> Result<Vec<StoredPoint>> {
        self.inner.scan_after(key, after, limit)
    }

    fn count(&self, key: &ProfileInstanceKey, start: i64, end: i64) -> Result<usize> {
        self.inner.count(key, start, end)
    }

    fn bounds(&self, key: &ProfileInstanceKey) -> Result<Option<(i64, i64)>> {
        self.inner.bounds(key)
    }

    fn parameter_count(&self, key: &ProfileInstanceKey) -> Result<Option<usize>> {
        self.inner.parameter_count(key)
    }

    fn upsert(&self, key: &ProfileInstanceKey, points: Vec<StoredPoint>) -> Result<()> {
        // Fail once, so the restore that follows succeeds
        if self.fail_upserts.swap(false, Ordering::SeqCst) {
            return Err(Error::upstream_unavailable("point store went away"));
        }
        if self.fail_partway.swap(false, Ordering::SeqCst) {
            let first = points.into_iter().take(1).collect();
            self.inner.upsert(key, first)?;
            return Err(Error::upstream_unavailable("point store went away mid-batch"));
        }
        self.inner.upsert(key, points)
    }

    fn delete_range(&self, key: &ProfileInstanceKey, start: i64, end: i64) -> Result<usize> {
        self.inner.delete_range(key, start, end)
    }

    fn ensure_partition(&self, key: &ProfileInstanceKey) -> Result<()> {
        self.inner.ensure_partition(key)
    }

    fn contains_partition(&self, key: &ProfileInstanceKey) -> Result<bool> {
        self.inner.contains_partition(key)
    }

    fn partitions(&self, start: Bound<&ProfileInstanceKey>, limit: usize) -> Result<Vec<ProfileInstanceKey>> {
        self.inner.partitions(start, limit)
    }

    fn drop_partition(&self, key: &ProfileInstanceKey) -> Result<bool> {
        self.inner.drop_partition(key)
    }
}

pub fn flaky_store() -> (Arc<FlakyPointStore>, VersionedInstanceStore) {
    let points = Arc::new(FlakyPointStore::default());
    let store = VersionedInstanceStore::new(points.clone());
    (points, store)
}
