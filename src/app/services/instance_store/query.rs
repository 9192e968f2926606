//! Instance reads, series lookups and lazy listings
//!
//! Reads take the key's stripe read lock, so they never observe a partially
//! applied write. Listings walk the partition key space in batches and
//! summarise one instance at a time.

use std::collections::VecDeque;
use std::ops::Bound;

use super::store::VersionedInstanceStore;
use crate::app::models::{DecodedRow, InstanceSummary, ProfileInstanceKey, TimeWindow};
use crate::app::services::catalog_mask::{CatalogMasks, WildcardMask};
use crate::constants::PARTITION_SCAN_BATCH;
use crate::{Error, Result};

impl VersionedInstanceStore {
    pub fn contains(&self, key: &ProfileInstanceKey) -> Result<bool> {
        let _guard = self.locks.read(key);
        self.points.contains_partition(key)
    }

    /// Rows of `key` inside `window`, ascending
    pub fn read_window(&self, key: &ProfileInstanceKey, window: &TimeWindow) -> Result<Vec<DecodedRow>> {
        let Some((start, end)) = window.inclusive_bounds() else {
            return Ok(Vec::new());
        };
        let _guard = self.locks.read(key);
        Ok(self
            .points
            .scan(key, start, end)?
            .into_iter()
            .map(|p| DecodedRow::new(p.timestamp, p.values))
            .collect())
    }

    /// Up to `limit` rows of `key` strictly before `before`, ascending
    pub fn read_before(&self, key: &ProfileInstanceKey, before: i64, limit: usize) -> Result<Vec<DecodedRow>> {
        let _guard = self.locks.read(key);
        Ok(self
            .points
            .scan_before(key, before, limit)?
            .into_iter()
            .map(|p| DecodedRow::new(p.timestamp, p.values))
            .collect())
    }

    /// Up to `limit` rows of `key` strictly after `after`, ascending
    pub fn read_after(&self, key: &ProfileInstanceKey, after: i64, limit: usize) -> Result<Vec<DecodedRow>> {
        let _guard = self.locks.read(key);
        Ok(self
            .points
            .scan_after(key, after, limit)?
            .into_iter()
            .map(|p| DecodedRow::new(p.timestamp, p.values))
            .collect())
    }

    /// Number of rows of `key` inside `window`
    pub fn count_in_window(&self, key: &ProfileInstanceKey, window: &TimeWindow) -> Result<usize> {
        let Some((start, end)) = window.inclusive_bounds() else {
            return Ok(0);
        };
        let _guard = self.locks.read(key);
        self.points.count(key, start, end)
    }

    /// Every stored key of the series (office, location, key parameter), in key order
    pub fn series_keys(
        &self,
        office: &str,
        location: &str,
        key_parameter: &str,
    ) -> Result<Vec<ProfileInstanceKey>> {
        let floor = ProfileInstanceKey::new(office, location, key_parameter, "", None);
        let mut keys = Vec::new();
        let mut cursor: Option<ProfileInstanceKey> = None;

        loop {
            let start = match &cursor {
                Some(last) => Bound::Excluded(last),
                None => Bound::Included(&floor),
            };
            let batch = self.points.partitions(start, PARTITION_SCAN_BATCH)?;
            let exhausted = batch.len() < PARTITION_SCAN_BATCH;

            for key in batch {
                if !key.same_series(office, location, key_parameter) {
                    return Ok(keys);
                }
                cursor = Some(key.clone());
                keys.push(key);
            }

            if exhausted {
                return Ok(keys);
            }
        }
    }

    /// Keys of one version label of a series, oldest version-date first
    pub fn version_keys(
        &self,
        office: &str,
        location: &str,
        key_parameter: &str,
        version: &str,
    ) -> Result<Vec<ProfileInstanceKey>> {
        Ok(self
            .series_keys(office, location, key_parameter)?
            .into_iter()
            .filter(|k| k.version == version)
            .collect())
    }

    /// Lazy walk over every partition key in key order
    pub fn partition_keys(&self) -> PartitionKeys<'_> {
        PartitionKeys {
            store: self,
            cursor: None,
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }

    /// Summarise one instance without materialising its rows
    pub fn summarize(&self, key: &ProfileInstanceKey, window: &TimeWindow) -> Result<InstanceSummary> {
        let _guard = self.locks.read(key);
        if !self.points.contains_partition(key)? {
            return Err(Error::not_found(format!("instance {}", key)));
        }

        let row_count_in_window = match window.inclusive_bounds() {
            Some((start, end)) => self.points.count(key, start, end)?,
            None => 0,
        };
        let bounds = self.points.bounds(key)?;

        Ok(InstanceSummary {
            key: key.clone(),
            parameter_count: self.points.parameter_count(key)?.unwrap_or(0),
            row_count_in_window,
            first_timestamp: bounds.map(|(first, _)| first),
            last_timestamp: bounds.map(|(_, last)| last),
        })
    }

    /// Lazy sequence of summaries for every stored instance
    pub fn list_instance_summaries(
        &self,
        window: TimeWindow,
    ) -> impl Iterator<Item = Result<InstanceSummary>> + '_ {
        self.partition_keys()
            .filter_map(move |key| self.live_summary(key, &window))
    }

    /// Summaries of instances whose office, location, key parameter and
    /// version match the wildcard masks
    pub fn catalog(
        &self,
        office_mask: Option<&str>,
        location_mask: Option<&str>,
        parameter_mask: Option<&str>,
        version_mask: Option<&str>,
        window: TimeWindow,
    ) -> Result<impl Iterator<Item = Result<InstanceSummary>> + '_> {
        let masks = CatalogMasks::compile(office_mask, location_mask, parameter_mask)?;
        let version = WildcardMask::compile(version_mask)?;

        Ok(self
            .partition_keys()
            .filter(move |key| match key {
                Ok(key) => {
                    masks.matches(&key.office, &key.location, &key.key_parameter)
                        && version.matches(&key.version)
                }
                Err(_) => true,
            })
            .filter_map(move |key| self.live_summary(key, &window)))
    }

    /// Summary of a listed key, or `None` when it was dropped after the key scan
    fn live_summary(
        &self,
        key: Result<ProfileInstanceKey>,
        window: &TimeWindow,
    ) -> Option<Result<InstanceSummary>> {
        match key.and_then(|key| self.summarize(&key, window)) {
            Err(Error::NotFound { .. }) => None,
            other => Some(other),
        }
    }
}

/// Batched, restartable walk over the partition key space
pub struct PartitionKeys<'a> {
    store: &'a VersionedInstanceStore,
    cursor: Option<ProfileInstanceKey>,
    buffer: VecDeque<ProfileInstanceKey>,
    exhausted: bool,
}

impl PartitionKeys<'_> {
    fn refill(&mut self) -> Result<()> {
        let start = match &self.cursor {
            Some(last) => Bound::Excluded(last),
            None => Bound::Unbounded,
        };
        let batch = self.store.points.partitions(start, PARTITION_SCAN_BATCH)?;
        self.exhausted = batch.len() < PARTITION_SCAN_BATCH;
        if let Some(last) = batch.last() {
            self.cursor = Some(last.clone());
        }
        self.buffer.extend(batch);
        Ok(())
    }
}

impl Iterator for PartitionKeys<'_> {
    type Item = Result<ProfileInstanceKey>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(e) = self.refill() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }
        self.buffer.pop_front().map(Ok)
    }
}
