//! Retrieval planner for versioned profile series
//!
//! Turns a [`RetrievalQuery`] into one page of rows. Validation runs before
//! any store access; the planner then picks the partitions to read, folds
//! them when the query spans versions, windows and paginates the result and
//! converts values into the requested units.
//!
//! ## Version resolution
//!
//! | Selectors                      | Mode                                   |
//! |--------------------------------|----------------------------------------|
//! | label + version-date           | [`VersionMode::Exact`]                 |
//! | label only                     | [`VersionMode::Latest`]                |
//! | `max_version`                  | [`VersionMode::MaxVersion`]            |
//! | nothing                        | [`VersionMode::MaxAggregate`], or [`VersionMode::Unversioned`] for a single undated partition |
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use hydroprofile::Config;
//! use hydroprofile::app::adapters::location_catalog::InMemoryLocationCatalog;
//! use hydroprofile::app::services::instance_store::VersionedInstanceStore;
//! use hydroprofile::app::services::parser_registry::ParserDefinitionRegistry;
//! use hydroprofile::app::services::retrieval_planner::{RetrievalPlanner, RetrievalQuery};
//!
//! # fn main() -> hydroprofile::Result<()> {
//! let store = Arc::new(VersionedInstanceStore::in_memory());
//! let definitions = Arc::new(ParserDefinitionRegistry::new(Arc::new(
//!     InMemoryLocationCatalog::new(),
//! )));
//! let planner = RetrievalPlanner::from_config(store, definitions, &Config::default())?;
//!
//! let query = RetrievalQuery::new("SWT", "KEYS", "Depth").with_version("raw").with_page_size(100);
//! let page = planner.retrieve(&query)?;
//! if let Some(cursor) = page.next_cursor {
//!     let _next = planner.retrieve(&query.clone().with_cursor(cursor))?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod cursor;
pub mod planner;
pub mod query;
pub mod result;
pub mod window;

#[cfg(test)]
pub mod tests;

pub use cursor::{CursorSigner, Direction, PageCursor};
pub use planner::RetrievalPlanner;
pub use query::{RetrievalQuery, VersionMode};
pub use result::{ResultRow, RetrievalResult};
pub use window::WindowReader;
