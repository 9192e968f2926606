//! In-memory point store
//!
//! Partitions are `BTreeMap`s of timestamp to point inside one outer
//! `BTreeMap` keyed by instance key, guarded by a `parking_lot::RwLock`.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::ops::Bound;

use crate::Result;
use crate::app::models::ProfileInstanceKey;
use crate::app::services::instance_store::{PointStore, StoredPoint};

type Partition = BTreeMap<i64, StoredPoint>;

/// `BTreeMap`-backed [`PointStore`]
#[derive(Debug, Default)]
pub struct InMemoryPointStore {
    partitions: RwLock<BTreeMap<ProfileInstanceKey, Partition>>,
}

impl InMemoryPointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of points across all partitions
    pub fn total_points(&self) -> usize {
        self.partitions.read().values().map(BTreeMap::len).sum()
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.read().len()
    }
}

impl PointStore for InMemoryPointStore {
    fn scan(&self, key: &ProfileInstanceKey, start: i64, end: i64) -> Result<Vec<StoredPoint>> {
        if start > end {
            return Ok(Vec::new());
        }
        Ok(self
            .partitions
            .read()
            .get(key)
            .map(|p| p.range(start..=end).map(|(_, pt)| pt.clone()).collect())
            .unwrap_or_default())
    }

    fn scan_before(
        &self,
        key: &ProfileInstanceKey,
        before: i64,
        limit: usize,
    ) -> Result<Vec<StoredPoint>> {
        let guard = self.partitions.read();
        let Some(partition) = guard.get(key) else {
            return Ok(Vec::new());
        };
        let mut points: Vec<StoredPoint> = partition
            .range(..before)
            .rev()
            .take(limit)
            .map(|(_, pt)| pt.clone())
            .collect();
        points.reverse();
        Ok(points)
    }

    fn scan_after(
        &self,
        key: &ProfileInstanceKey,
        after: i64,
        limit: usize,
    ) -> Result<Vec<StoredPoint>> {
        let guard = self.partitions.read();
        let Some(partition) = guard.get(key) else {
            return Ok(Vec::new());
        };
        Ok(partition
            .range((Bound::Excluded(after), Bound::Unbounded))
            .take(limit)
            .map(|(_, pt)| pt.clone())
            .collect())
    }

    fn count(&self, key: &ProfileInstanceKey, start: i64, end: i64) -> Result<usize> {
        if start > end {
            return Ok(0);
        }
        Ok(self
            .partitions
            .read()
            .get(key)
            .map(|p| p.range(start..=end).count())
            .unwrap_or(0))
    }

    fn bounds(&self, key: &ProfileInstanceKey) -> Result<Option<(i64, i64)>> {
        let guard = self.partitions.read();
        Ok(guard.get(key).and_then(|p| {
            let first = p.keys().next()?;
            let last = p.keys().next_back()?;
            Some((*first, *last))
        }))
    }

    fn parameter_count(&self, key: &ProfileInstanceKey) -> Result<Option<usize>> {
        Ok(self
            .partitions
            .read()
            .get(key)
            .and_then(|p| p.values().next())
            .map(|pt| pt.values.len()))
    }

    fn upsert(&self, key: &ProfileInstanceKey, points: Vec<StoredPoint>) -> Result<()> {
        let mut guard = self.partitions.write();
        let partition = guard.entry(key.clone()).or_default();
        for point in points {
            partition.insert(point.timestamp, point);
        }
        Ok(())
    }

    fn delete_range(&self, key: &ProfileInstanceKey, start: i64, end: i64) -> Result<usize> {
        if start > end {
            return Ok(0);
        }
        let mut guard = self.partitions.write();
        let Some(partition) = guard.get_mut(key) else {
            return Ok(0);
        };
        let doomed: Vec<i64> = partition.range(start..=end).map(|(ts, _)| *ts).collect();
        for ts in &doomed {
            partition.remove(ts);
        }
        Ok(doomed.len())
    }

    fn ensure_partition(&self, key: &ProfileInstanceKey) -> Result<()> {
        self.partitions.write().entry(key.clone()).or_default();
        Ok(())
    }

    fn contains_partition(&self, key: &ProfileInstanceKey) -> Result<bool> {
        Ok(self.partitions.read().contains_key(key))
    }

    fn partitions(
        &self,
        start: Bound<&ProfileInstanceKey>,
        limit: usize,
    ) -> Result<Vec<ProfileInstanceKey>> {
        Ok(self
            .partitions
            .read()
            .range::<ProfileInstanceKey, _>((start, Bound::Unbounded))
            .take(limit)
            .map(|(key, _)| key.clone())
            .collect())
    }

    fn drop_partition(&self, key: &ProfileInstanceKey) -> Result<bool> {
        Ok(self.partitions.write().remove(key).is_some())
    }
}
