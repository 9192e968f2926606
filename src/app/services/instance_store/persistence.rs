//! Persistence collaborator for the instance store
//!
//! An ordered, range-scannable point store partitioned by
//! [`ProfileInstanceKey`]. All ranges are inclusive epoch-millisecond bounds.

use std::ops::Bound;

use crate::Result;
use crate::app::models::ProfileInstanceKey;

/// One persisted point of a profile instance
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPoint {
    pub timestamp: i64,
    pub values: Vec<Option<f64>>,
    pub protected: bool,
}

impl StoredPoint {
    pub fn new(timestamp: i64, values: Vec<Option<f64>>) -> Self {
        Self {
            timestamp,
            values,
            protected: false,
        }
    }

    pub fn with_protection(mut self, protected: bool) -> Self {
        self.protected = protected;
        self
    }
}

/// Ordered point storage partitioned by instance key
///
/// Implementations must keep points of a partition ordered by timestamp and
/// must be safe for concurrent use. Mutual exclusion between writers of one
/// key is provided by the caller.
pub trait PointStore: Send + Sync {
    /// Points of `key` with `start <= timestamp <= end`, ascending
    fn scan(&self, key: &ProfileInstanceKey, start: i64, end: i64) -> Result<Vec<StoredPoint>>;

    /// Up to `limit` points strictly before `before`, ascending
    fn scan_before(
        &self,
        key: &ProfileInstanceKey,
        before: i64,
        limit: usize,
    ) -> Result<Vec<StoredPoint>>;

    /// Up to `limit` points strictly after `after`, ascending
    fn scan_after(
        &self,
        key: &ProfileInstanceKey,
        after: i64,
        limit: usize,
    ) -> Result<Vec<StoredPoint>>;

    /// Number of points of `key` with `start <= timestamp <= end`
    fn count(&self, key: &ProfileInstanceKey, start: i64, end: i64) -> Result<usize>;

    /// First and last timestamps of `key`, or `None` when it holds no points
    fn bounds(&self, key: &ProfileInstanceKey) -> Result<Option<(i64, i64)>>;

    /// Value count of the first point of `key`
    fn parameter_count(&self, key: &ProfileInstanceKey) -> Result<Option<usize>>;

    /// Insert or overwrite points, creating the partition if needed
    fn upsert(&self, key: &ProfileInstanceKey, points: Vec<StoredPoint>) -> Result<()>;

    /// Remove points with `start <= timestamp <= end`; returns the number removed
    fn delete_range(&self, key: &ProfileInstanceKey, start: i64, end: i64) -> Result<usize>;

    /// Create an empty partition if absent
    fn ensure_partition(&self, key: &ProfileInstanceKey) -> Result<()>;

    fn contains_partition(&self, key: &ProfileInstanceKey) -> Result<bool>;

    /// Up to `limit` partition keys from `start` in key order
    fn partitions(
        &self,
        start: Bound<&ProfileInstanceKey>,
        limit: usize,
    ) -> Result<Vec<ProfileInstanceKey>>;

    /// Remove a partition and its points; returns whether it existed
    fn drop_partition(&self, key: &ProfileInstanceKey) -> Result<bool>;
}
