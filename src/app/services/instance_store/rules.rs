//! Store rules for writing rows into an existing instance
//!
//! Each rule decides, per incoming row, what the stored values become when
//! the instance already holds a point at that timestamp.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::persistence::StoredPoint;
use crate::app::models::DecodedRow;
use crate::constants::store_rules;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoreRule {
    /// Delete every existing point in the incoming span, then insert
    #[default]
    ReplaceAll,
    /// Point-by-point upsert; other points untouched
    Merge,
    /// Insert only timestamps the instance does not hold
    DoNotReplace,
    /// Fill null cells of existing points; insert new timestamps
    ReplaceMissingValuesOnly,
    /// Upsert where null incoming cells keep the existing value
    ReplaceWithNonMissing,
}

impl StoreRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreRule::ReplaceAll => store_rules::REPLACE_ALL,
            StoreRule::Merge => store_rules::MERGE,
            StoreRule::DoNotReplace => store_rules::DO_NOT_REPLACE,
            StoreRule::ReplaceMissingValuesOnly => store_rules::REPLACE_MISSING_VALUES_ONLY,
            StoreRule::ReplaceWithNonMissing => store_rules::REPLACE_WITH_NON_MISSING,
        }
    }

    /// Values to store for `incoming` given the existing point, or `None`
    /// when the existing point must be kept as is
    pub fn resolve(
        &self,
        existing: Option<&StoredPoint>,
        incoming: &DecodedRow,
    ) -> Option<Vec<Option<f64>>> {
        let Some(existing) = existing else {
            return Some(incoming.values.clone());
        };

        match self {
            StoreRule::ReplaceAll | StoreRule::Merge => Some(incoming.values.clone()),
            StoreRule::DoNotReplace => None,
            StoreRule::ReplaceMissingValuesOnly => Some(
                existing
                    .values
                    .iter()
                    .zip(&incoming.values)
                    .map(|(old, new)| old.or(*new))
                    .collect(),
            ),
            StoreRule::ReplaceWithNonMissing => Some(
                existing
                    .values
                    .iter()
                    .zip(&incoming.values)
                    .map(|(old, new)| new.or(*old))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for StoreRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreRule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        match normalized.as_str() {
            store_rules::REPLACE_ALL => Ok(StoreRule::ReplaceAll),
            store_rules::MERGE => Ok(StoreRule::Merge),
            store_rules::DO_NOT_REPLACE => Ok(StoreRule::DoNotReplace),
            store_rules::REPLACE_MISSING_VALUES_ONLY => Ok(StoreRule::ReplaceMissingValuesOnly),
            store_rules::REPLACE_WITH_NON_MISSING => Ok(StoreRule::ReplaceWithNonMissing),
            _ => Err(Error::invalid_argument(format!("Unknown store rule '{}'", s))),
        }
    }
}
