//! Window reads over one or several partitions
//!
//! The resolved sequence is the base window plus, when asked, one page of
//! rows on either side. Neighbour pages are read per partition with the
//! page size as limit, then folded: any timestamp among the `limit` folded
//! neighbours nearest the window is among the `limit` nearest of every
//! partition holding it, so the fold sees all of its cells.

use crate::app::models::{DecodedRow, ProfileInstanceKey, TimeWindow};
use crate::app::services::aggregation::{AggregationResolver, VersionSource};
use crate::app::services::instance_store::VersionedInstanceStore;
use crate::Result;

/// Reads windows of a fixed set of partitions
pub struct WindowReader<'a> {
    store: &'a VersionedInstanceStore,
    keys: Vec<ProfileInstanceKey>,
    resolver: Option<AggregationResolver>,
}

impl<'a> WindowReader<'a> {
    /// Reader over one partition, returned as stored
    pub fn single(store: &'a VersionedInstanceStore, key: ProfileInstanceKey) -> Self {
        Self {
            store,
            keys: vec![key],
            resolver: None,
        }
    }

    /// Reader folding several partitions with `resolver`
    pub fn folded(
        store: &'a VersionedInstanceStore,
        keys: Vec<ProfileInstanceKey>,
        resolver: AggregationResolver,
    ) -> Self {
        Self {
            store,
            keys,
            resolver: Some(resolver),
        }
    }

    pub fn keys(&self) -> &[ProfileInstanceKey] {
        &self.keys
    }

    /// Base window rows followed by optional neighbour pages, ascending
    pub fn resolve(
        &self,
        window: &TimeWindow,
        previous: bool,
        next: bool,
        page_size: usize,
    ) -> Result<Vec<DecodedRow>> {
        let mut rows = Vec::new();
        if previous {
            rows.extend(self.preceding(first_inside(window), page_size)?);
        }
        rows.extend(self.base(window)?);
        if next {
            // An empty exclusive window leaves its boundary point in the preceding page
            let after = rows
                .last()
                .map_or(last_inside(window), |row| row.timestamp.max(last_inside(window)));
            rows.extend(self.following(after, page_size)?);
        }
        Ok(rows)
    }

    /// Rows inside `window`
    pub fn base(&self, window: &TimeWindow) -> Result<Vec<DecodedRow>> {
        self.read(|key| self.store.read_window(key, window))
    }

    /// Up to `limit` rows strictly before `before`
    pub fn preceding(&self, before: i64, limit: usize) -> Result<Vec<DecodedRow>> {
        let mut rows = self.read(|key| self.store.read_before(key, before, limit))?;
        let excess = rows.len().saturating_sub(limit);
        rows.drain(..excess);
        Ok(rows)
    }

    /// Up to `limit` rows strictly after `after`
    pub fn following(&self, after: i64, limit: usize) -> Result<Vec<DecodedRow>> {
        let mut rows = self.read(|key| self.store.read_after(key, after, limit))?;
        rows.truncate(limit);
        Ok(rows)
    }

    fn read<F>(&self, read_key: F) -> Result<Vec<DecodedRow>>
    where
        F: Fn(&ProfileInstanceKey) -> Result<Vec<DecodedRow>>,
    {
        match (&self.resolver, self.keys.as_slice()) {
            (None, [key]) => read_key(key),
            (None, _) => Ok(Vec::new()),
            (Some(resolver), keys) => {
                let sources = keys
                    .iter()
                    .map(|key| Ok(VersionSource::new(key.clone(), read_key(key)?)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(resolver.resolve(sources))
            }
        }
    }
}

/// Exclusive lower bound for rows preceding the window
fn first_inside(window: &TimeWindow) -> i64 {
    if window.start_inclusive {
        window.start
    } else {
        window.start.saturating_add(1)
    }
}

/// Exclusive upper bound for rows following the window
fn last_inside(window: &TimeWindow) -> i64 {
    if window.end_inclusive {
        window.end
    } else {
        window.end.saturating_sub(1)
    }
}
