//! Version selection and cross-version aggregation
//!
//! A series may hold several partitions (version label, version-date). The
//! resolver folds the rows of those partitions into one ascending row
//! sequence, cell by cell:
//! - max version: the newest version-date defining a non-null value wins
//! - max aggregate: the arithmetic maximum of the non-null values wins
//!
//! Rows of different widths are padded with nulls to the widest row.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::app::models::{DecodedRow, ProfileInstanceKey};

/// How the rows of several partitions combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AggregationMode {
    MaxVersion,
    MaxAggregate,
}

/// Rows read from one partition of a series
#[derive(Debug, Clone, PartialEq)]
pub struct VersionSource {
    pub key: ProfileInstanceKey,
    pub rows: Vec<DecodedRow>,
}

impl VersionSource {
    pub fn new(key: ProfileInstanceKey, rows: Vec<DecodedRow>) -> Self {
        Self { key, rows }
    }
}

/// Folds partition rows into a single sequence
#[derive(Debug, Clone, Copy)]
pub struct AggregationResolver {
    mode: AggregationMode,
}

impl AggregationResolver {
    pub fn new(mode: AggregationMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> AggregationMode {
        self.mode
    }

    /// Combine `sources` into ascending rows with unique timestamps
    pub fn resolve(&self, mut sources: Vec<VersionSource>) -> Vec<DecodedRow> {
        // Oldest first, so later writes in the fold are newer versions.
        // Key order puts unversioned partitions before every dated one.
        sources.sort_by(|a, b| {
            a.key
                .version_date
                .cmp(&b.key.version_date)
                .then_with(|| a.key.cmp(&b.key))
        });

        let mut cells: BTreeMap<i64, Vec<Option<f64>>> = BTreeMap::new();
        for source in &sources {
            for row in &source.rows {
                let merged = cells.entry(row.timestamp).or_default();
                if merged.len() < row.values.len() {
                    merged.resize(row.values.len(), None);
                }
                for (slot, incoming) in merged.iter_mut().zip(&row.values) {
                    *slot = self.combine(*slot, *incoming);
                }
            }
        }

        let width = cells.values().map(Vec::len).max().unwrap_or(0);
        debug!(
            "Resolved {} partition(s) into {} row(s) ({:?})",
            sources.len(),
            cells.len(),
            self.mode
        );

        cells
            .into_iter()
            .map(|(timestamp, mut values)| {
                values.resize(width, None);
                DecodedRow::new(timestamp, values)
            })
            .collect()
    }

    fn combine(&self, current: Option<f64>, incoming: Option<f64>) -> Option<f64> {
        match (self.mode, current, incoming) {
            (_, current, None) => current,
            (_, None, incoming) => incoming,
            (AggregationMode::MaxVersion, Some(_), Some(newer)) => Some(newer),
            (AggregationMode::MaxAggregate, Some(a), Some(b)) => Some(a.max(b)),
        }
    }
}

/// Pick the newest partition that has data, given per-key row counts
///
/// Keys are compared by version-date with unversioned oldest.
pub fn latest_with_data<'a, I>(candidates: I) -> Option<&'a ProfileInstanceKey>
where
    I: IntoIterator<Item = (&'a ProfileInstanceKey, usize)>,
{
    candidates
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(key, _)| key)
        .max_by(|a, b| a.version_date.cmp(&b.version_date).then_with(|| a.cmp(b)))
}
