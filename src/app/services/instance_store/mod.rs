//! Versioned instance store for decoded profile rows
//!
//! Rows are persisted under a [`ProfileInstanceKey`] (office, location, key
//! parameter, version label, version-date) with replace/merge rules, point
//! protection and all-or-nothing writes.
//!
//! - [`store`] - Write path (store, delete, protection)
//! - [`query`] - Read path, series lookups and lazy listings
//! - [`rules`] - Store rules
//! - [`lock_table`] - Striped per-key locking
//! - [`persistence`] - Point store collaborator trait
//! - [`stats`] - Write reports
//!
//! [`ProfileInstanceKey`]: crate::app::models::ProfileInstanceKey

pub mod lock_table;
pub mod persistence;
pub mod query;
pub mod rules;
pub mod stats;
pub mod store;

#[cfg(test)]
pub mod tests;

// Re-export key types for convenience
pub use lock_table::LockTable;
pub use persistence::{PointStore, StoredPoint};
pub use query::PartitionKeys;
pub use rules::StoreRule;
pub use stats::StoreReport;
pub use store::{VersionedInstanceStore, row_span};
