//! Parser definition registry
//!
//! This module stores declarative parser recipes keyed by (location, key
//! parameter). Registries are plain values injected where they are needed;
//! several may coexist, each with its own location catalog.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::app::adapters::location_catalog::LocationCatalog;
use crate::app::models::{LocationId, ParserDefinition};
use crate::app::services::profile_decoder::ProfileTextDecoder;
use crate::{Error, Result};

pub mod query;

#[cfg(test)]
pub mod tests;

pub use query::DefinitionListing;

/// Registry key: location then key parameter
pub type DefinitionKey = (LocationId, String);

/// Registry of parser recipes
pub struct ParserDefinitionRegistry {
    /// Recipes ordered by (location, key parameter)
    pub(crate) definitions: RwLock<BTreeMap<DefinitionKey, ParserDefinition>>,

    /// Location master data used to reject unknown locations
    pub(crate) catalog: Arc<dyn LocationCatalog>,
}

impl std::fmt::Debug for ParserDefinitionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserDefinitionRegistry")
            .field("definitions", &self.len())
            .finish()
    }
}

impl ParserDefinitionRegistry {
    /// Create an empty registry backed by a location catalog
    pub fn new(catalog: Arc<dyn LocationCatalog>) -> Self {
        Self {
            definitions: RwLock::new(BTreeMap::new()),
            catalog,
        }
    }

    /// Store a recipe
    ///
    /// # Arguments
    /// * `definition` - Recipe to store; validated and compiled first
    /// * `fail_if_exists` - Fail with `AlreadyExists` instead of overwriting
    pub fn store(&self, definition: ParserDefinition, fail_if_exists: bool) -> Result<()> {
        ProfileTextDecoder::validate_definition(&definition)?;

        let location = &definition.location_id;
        if !self.catalog.location_exists(&location.office, &location.name)? {
            return Err(Error::unknown_location(&location.office, &location.name));
        }

        let key = (location.clone(), definition.key_parameter.clone());
        let mut definitions = self.definitions.write();
        if fail_if_exists && definitions.contains_key(&key) {
            return Err(Error::already_exists(format!(
                "parser definition for {} / {}",
                key.0, key.1
            )));
        }

        let replaced = definitions.insert(key, definition).is_some();
        info!(
            "{} parser definition ({} total)",
            if replaced { "Replaced" } else { "Stored" },
            definitions.len()
        );
        Ok(())
    }

    /// Get the recipe for (location, key parameter)
    pub fn get(&self, location: &LocationId, key_parameter: &str) -> Result<ParserDefinition> {
        self.definitions
            .read()
            .get(&(location.clone(), key_parameter.to_string()))
            .cloned()
            .ok_or_else(|| {
                Error::not_found(format!(
                    "parser definition for {} / {}",
                    location, key_parameter
                ))
            })
    }

    /// Check whether a recipe exists for (location, key parameter)
    pub fn contains(&self, location: &LocationId, key_parameter: &str) -> bool {
        self.definitions
            .read()
            .contains_key(&(location.clone(), key_parameter.to_string()))
    }

    /// Delete the recipe for (location, key parameter)
    pub fn delete(&self, location: &LocationId, key_parameter: &str) -> Result<()> {
        let removed = self
            .definitions
            .write()
            .remove(&(location.clone(), key_parameter.to_string()));
        match removed {
            Some(_) => {
                debug!("Deleted parser definition for {} / {}", location, key_parameter);
                Ok(())
            }
            None => Err(Error::not_found(format!(
                "parser definition for {} / {}",
                location, key_parameter
            ))),
        }
    }

    /// Get the total number of recipes
    pub fn len(&self) -> usize {
        self.definitions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.read().is_empty()
    }
}
