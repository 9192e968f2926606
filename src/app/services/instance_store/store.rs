//! Versioned instance store writes
//!
//! Every write runs under the key's stripe write lock, plans its effect
//! against a snapshot of the affected span, checks protection, and only then
//! touches the point store. A failure part-way restores the snapshot.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::lock_table::LockTable;
use super::persistence::{PointStore, StoredPoint};
use super::rules::StoreRule;
use super::stats::StoreReport;
use crate::app::adapters::memory_store::InMemoryPointStore;
use crate::app::models::{DecodedRow, Instance, ProfileInstanceKey};
use crate::config::Config;
use crate::constants::{DEFAULT_LOCK_STRIPES, DEFAULT_PAGE_SIZE};
use crate::{Error, Result};

/// Store of profile instances keyed by (office, location, key parameter,
/// version, version-date)
pub struct VersionedInstanceStore {
    pub(crate) points: Arc<dyn PointStore>,
    pub(crate) locks: LockTable,
    pub(crate) default_page_size: usize,
}

impl std::fmt::Debug for VersionedInstanceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionedInstanceStore")
            .field("lock_stripes", &self.locks.stripe_count())
            .field("default_page_size", &self.default_page_size)
            .finish()
    }
}

/// Planned effect of a write, computed before anything is persisted
struct WritePlan {
    upserts: Vec<StoredPoint>,
    report: StoreReport,
    protected_conflicts: usize,
}

impl VersionedInstanceStore {
    /// Create a store over a persistence collaborator
    pub fn new(points: Arc<dyn PointStore>) -> Self {
        Self {
            points,
            locks: LockTable::new(DEFAULT_LOCK_STRIPES),
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Create a store using configured lock stripes and page size
    pub fn from_config(points: Arc<dyn PointStore>, config: &Config) -> Self {
        Self {
            points,
            locks: LockTable::new(config.store.lock_stripes),
            default_page_size: config.retrieval.default_page_size,
        }
    }

    /// Create a store backed by an in-memory point store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryPointStore::new()))
    }

    /// Store rows under `key` using `rule`
    ///
    /// For `REPLACE_ALL` the replaced span is the rows' own timestamp range;
    /// an empty row set is a no-op. Use [`store_span`](Self::store_span) to
    /// clear a span explicitly.
    pub fn store(
        &self,
        key: &ProfileInstanceKey,
        rows: &[DecodedRow],
        rule: StoreRule,
        override_protection: bool,
    ) -> Result<StoreReport> {
        let Some(span) = row_span(rows) else {
            debug!("Empty store request for {}", key);
            return Ok(StoreReport::new());
        };
        self.store_span(key, rows, span, rule, override_protection)
    }

    /// Store rows under `key`, with `span` (inclusive) as the affected range
    ///
    /// Every row must fall inside `span`. Under `REPLACE_ALL` every existing
    /// point in the span that is not rewritten is deleted, so an empty row
    /// set clears the span.
    pub fn store_span(
        &self,
        key: &ProfileInstanceKey,
        rows: &[DecodedRow],
        span: (i64, i64),
        rule: StoreRule,
        override_protection: bool,
    ) -> Result<StoreReport> {
        let (start, end) = span;
        if start > end {
            return Err(Error::invalid_argument(format!(
                "Store span start {} is after end {}",
                start, end
            )));
        }
        if let Some(outside) = rows.iter().find(|r| r.timestamp < start || r.timestamp > end) {
            return Err(Error::invalid_argument(format!(
                "Row at {} lies outside store span {}..={}",
                outside.timestamp, start, end
            )));
        }

        let _guard = self.locks.write(key);
        self.validate_rows(key, rows)?;

        let existed = self.points.contains_partition(key)?;
        let snapshot = self.points.scan(key, start, end)?;
        let plan = plan_write(&snapshot, rows, rule);

        if plan.protected_conflicts > 0 && !override_protection {
            warn!(
                "Rejected {} store on {}: {} protected point(s)",
                rule, key, plan.protected_conflicts
            );
            return Err(Error::protected_data_conflict(
                key.to_string(),
                plan.protected_conflicts,
            ));
        }

        if plan.report.is_noop() {
            debug!("Store on {} changed nothing", key);
            return Ok(plan.report);
        }

        let applied = (|| -> Result<()> {
            self.points.ensure_partition(key)?;
            if rule == StoreRule::ReplaceAll {
                self.points.delete_range(key, start, end)?;
            }
            self.points.upsert(key, plan.upserts)
        })();

        if let Err(e) = applied {
            self.restore_span(key, span, snapshot, existed);
            return Err(e);
        }

        info!(
            "Stored {} on {}: {} inserted, {} updated, {} deleted",
            rule, key, plan.report.inserted, plan.report.updated, plan.report.deleted
        );
        Ok(plan.report)
    }

    /// Delete points at or before `as_of`, or the whole instance when `None`
    pub fn delete(
        &self,
        key: &ProfileInstanceKey,
        as_of: Option<i64>,
        override_protection: bool,
    ) -> Result<StoreReport> {
        let _guard = self.locks.write(key);
        if !self.points.contains_partition(key)? {
            return Err(Error::not_found(format!("instance {}", key)));
        }

        let end = as_of.unwrap_or(i64::MAX);
        let doomed = self.points.scan(key, i64::MIN, end)?;
        let protected = doomed.iter().filter(|p| p.protected).count();
        if protected > 0 && !override_protection {
            warn!("Rejected delete on {}: {} protected point(s)", key, protected);
            return Err(Error::protected_data_conflict(key.to_string(), protected));
        }

        let deleted = doomed.len();
        let applied = match as_of {
            None => self.points.drop_partition(key).map(|_| ()),
            Some(as_of) => self.points.delete_range(key, i64::MIN, as_of).map(|_| ()),
        };
        if let Err(e) = applied {
            self.restore_span(key, (i64::MIN, end), doomed, true);
            return Err(e);
        }

        info!(
            "Deleted {} point(s) from {}{}",
            deleted,
            key,
            if as_of.is_none() { " and dropped the instance" } else { "" }
        );
        Ok(StoreReport {
            deleted,
            ..StoreReport::new()
        })
    }

    /// Flag or clear protection on existing points within `span` (inclusive)
    ///
    /// # Returns
    /// Number of points whose flag changed
    pub fn set_protection(
        &self,
        key: &ProfileInstanceKey,
        span: (i64, i64),
        protected: bool,
    ) -> Result<usize> {
        let (start, end) = span;
        if start > end {
            return Err(Error::invalid_argument(format!(
                "Protection span start {} is after end {}",
                start, end
            )));
        }

        let _guard = self.locks.write(key);
        if !self.points.contains_partition(key)? {
            return Err(Error::not_found(format!("instance {}", key)));
        }

        let snapshot = self.points.scan(key, start, end)?;
        let changed: Vec<StoredPoint> = snapshot
            .iter()
            .filter(|p| p.protected != protected)
            .map(|p| p.clone().with_protection(protected))
            .collect();
        let count = changed.len();
        if count > 0 {
            if let Err(e) = self.points.upsert(key, changed) {
                self.restore_span(key, span, snapshot, true);
                return Err(e);
            }
        }

        debug!(
            "{} protection on {} point(s) of {}",
            if protected { "Set" } else { "Cleared" },
            count,
            key
        );
        Ok(count)
    }

    /// Fetch a whole instance
    pub fn get_instance(&self, key: &ProfileInstanceKey) -> Result<Instance> {
        let _guard = self.locks.read(key);
        if !self.points.contains_partition(key)? {
            return Err(Error::not_found(format!("instance {}", key)));
        }

        let mut instance = Instance::new(key.clone());
        instance.page_size = self.default_page_size;
        for point in self.points.scan(key, i64::MIN, i64::MAX)? {
            if point.protected {
                instance.protected.insert(point.timestamp);
            }
            instance
                .rows
                .insert(point.timestamp, DecodedRow::new(point.timestamp, point.values));
        }
        Ok(instance)
    }

    fn validate_rows(&self, key: &ProfileInstanceKey, rows: &[DecodedRow]) -> Result<()> {
        let Some(first) = rows.first() else {
            return Ok(());
        };

        let width = first.len();
        if width == 0 {
            return Err(Error::invalid_argument("Rows must carry at least one value"));
        }
        if let Some(row) = rows.iter().find(|r| r.len() != width) {
            return Err(Error::invalid_argument(format!(
                "Row at {} has {} value(s), expected {}",
                row.timestamp,
                row.len(),
                width
            )));
        }

        let mut seen = HashSet::with_capacity(rows.len());
        if let Some(row) = rows.iter().find(|r| !seen.insert(r.timestamp)) {
            return Err(Error::invalid_argument(format!(
                "Duplicate timestamp {} in store request",
                row.timestamp
            )));
        }

        if let Some(existing) = self.points.parameter_count(key)? {
            if existing != width {
                return Err(Error::invalid_argument(format!(
                    "Instance {} holds {} parameter(s), rows carry {}",
                    key, existing, width
                )));
            }
        }

        Ok(())
    }

    fn restore_span(
        &self,
        key: &ProfileInstanceKey,
        span: (i64, i64),
        snapshot: Vec<StoredPoint>,
        existed: bool,
    ) {
        warn!("Write to {} failed part-way, restoring previous contents", key);
        let restored = (|| -> Result<()> {
            if !existed {
                self.points.drop_partition(key)?;
                return Ok(());
            }
            self.points.ensure_partition(key)?;
            self.points.delete_range(key, span.0, span.1)?;
            self.points.upsert(key, snapshot)
        })();
        if let Err(e) = restored {
            error!("Failed to restore {} after a failed write: {}", key, e);
        }
    }
}

/// Inclusive timestamp range covered by `rows`
pub fn row_span(rows: &[DecodedRow]) -> Option<(i64, i64)> {
    let min = rows.iter().map(|r| r.timestamp).min()?;
    let max = rows.iter().map(|r| r.timestamp).max()?;
    Some((min, max))
}

fn plan_write(snapshot: &[StoredPoint], rows: &[DecodedRow], rule: StoreRule) -> WritePlan {
    let existing: BTreeMap<i64, &StoredPoint> =
        snapshot.iter().map(|p| (p.timestamp, p)).collect();
    let mut plan = WritePlan {
        upserts: Vec::with_capacity(rows.len()),
        report: StoreReport::new(),
        protected_conflicts: 0,
    };

    for row in rows {
        let current = existing.get(&row.timestamp).copied();
        match (current, rule.resolve(current, row)) {
            (None, Some(values)) => {
                plan.report.inserted += 1;
                plan.upserts.push(StoredPoint::new(row.timestamp, values));
            }
            (Some(point), Some(values)) if values != point.values => {
                plan.report.updated += 1;
                if point.protected {
                    plan.protected_conflicts += 1;
                }
                plan.upserts
                    .push(StoredPoint::new(row.timestamp, values).with_protection(point.protected));
            }
            (Some(point), _) => {
                plan.report.unchanged += 1;
                // REPLACE_ALL clears the span first, so kept points are rewritten
                if rule == StoreRule::ReplaceAll {
                    plan.upserts.push(point.clone());
                }
            }
            (None, None) => plan.report.unchanged += 1,
        }
    }

    if rule == StoreRule::ReplaceAll {
        let incoming: HashSet<i64> = rows.iter().map(|r| r.timestamp).collect();
        for point in snapshot.iter().filter(|p| !incoming.contains(&p.timestamp)) {
            plan.report.deleted += 1;
            if point.protected {
                plan.protected_conflicts += 1;
            }
        }
    }

    plan
}
