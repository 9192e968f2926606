//! Write outcome reports for the instance store

use serde::Serialize;

/// Outcome of a store, delete or protection call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StoreReport {
    /// Points written at timestamps the instance did not hold
    pub inserted: usize,

    /// Existing points whose values changed
    pub updated: usize,

    /// Existing points removed
    pub deleted: usize,

    /// Incoming points that left the instance as it was
    pub unchanged: usize,
}

impl StoreReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of points touched
    pub fn changed(&self) -> usize {
        self.inserted + self.updated + self.deleted
    }

    pub fn is_noop(&self) -> bool {
        self.changed() == 0
    }
}
