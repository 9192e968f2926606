//! Recipe listing and catalog queries
//!
//! Listings are lazy: each step takes the read lock, reads the single entry
//! after the previous key, and releases the lock. Concurrent writers are
//! therefore visible to a listing in progress.

use std::ops::Bound;

use super::{DefinitionKey, ParserDefinitionRegistry};
use crate::Result;
use crate::app::models::ParserDefinition;
use crate::app::services::catalog_mask::CatalogMasks;

impl ParserDefinitionRegistry {
    /// Lazy listing ordered by (location, key parameter)
    ///
    /// Calling again restarts from the first entry.
    pub fn list_all(&self) -> DefinitionListing<'_> {
        DefinitionListing {
            registry: self,
            last: None,
        }
    }

    /// Recipes matching wildcard masks on office, location and key parameter
    ///
    /// # Arguments
    /// * `office_mask`, `location_mask`, `parameter_mask` - `*`/`?` masks, case-insensitive; `None` matches all
    /// * `include_parameters` - When false, parameter lists are omitted from the results
    ///
    /// # Returns
    /// Lazy sequence in `list_all` order
    pub fn catalog(
        &self,
        office_mask: Option<&str>,
        location_mask: Option<&str>,
        parameter_mask: Option<&str>,
        include_parameters: bool,
    ) -> Result<impl Iterator<Item = ParserDefinition> + '_> {
        let masks = CatalogMasks::compile(office_mask, location_mask, parameter_mask)?;

        Ok(self
            .list_all()
            .filter(move |d| {
                masks.matches(&d.location_id.office, &d.location_id.name, &d.key_parameter)
            })
            .map(move |mut d| {
                if !include_parameters {
                    d.parameters.clear();
                }
                d
            }))
    }
}

/// Lazy, restartable walk over a registry
pub struct DefinitionListing<'a> {
    registry: &'a ParserDefinitionRegistry,
    last: Option<DefinitionKey>,
}

impl Iterator for DefinitionListing<'_> {
    type Item = ParserDefinition;

    fn next(&mut self) -> Option<Self::Item> {
        let definitions = self.registry.definitions.read();
        let lower = match &self.last {
            Some(last) => Bound::Excluded(last),
            None => Bound::Unbounded,
        };
        let (key, definition) = definitions
            .range::<DefinitionKey, _>((lower, Bound::Unbounded))
            .next()?;
        let (key, definition) = (key.clone(), definition.clone());
        drop(definitions);

        self.last = Some(key);
        Some(definition)
    }
}
