//! Profile registry
//!
//! Profiles name the parameters that share one timestamp axis at a location.
//! A profile's parameter list must line up with the parser recipe for the
//! same (location, key parameter) whenever both exist.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::app::adapters::location_catalog::LocationCatalog;
use crate::app::models::{LocationId, ParserDefinition, Profile};
use crate::app::services::catalog_mask::CatalogMasks;
use crate::app::services::parser_registry::{DefinitionKey, ParserDefinitionRegistry};
use crate::{Error, Result};

/// Registry of profile documents keyed by (location, key parameter)
pub struct ProfileRegistry {
    profiles: RwLock<BTreeMap<DefinitionKey, Profile>>,
    catalog: Arc<dyn LocationCatalog>,
    definitions: Arc<ParserDefinitionRegistry>,
}

impl ProfileRegistry {
    pub fn new(catalog: Arc<dyn LocationCatalog>, definitions: Arc<ParserDefinitionRegistry>) -> Self {
        Self {
            profiles: RwLock::new(BTreeMap::new()),
            catalog,
            definitions,
        }
    }

    /// Store a profile
    pub fn store(&self, profile: Profile, fail_if_exists: bool) -> Result<()> {
        profile.validate()?;

        let location = &profile.location_id;
        if !self.catalog.location_exists(&location.office, &location.name)? {
            return Err(Error::unknown_location(&location.office, &location.name));
        }

        if let Ok(definition) = self.definitions.get(location, &profile.key_parameter) {
            check_parameter_count(&profile, &definition)?;
        }

        let key = (location.clone(), profile.key_parameter.clone());
        let mut profiles = self.profiles.write();
        if fail_if_exists && profiles.contains_key(&key) {
            return Err(Error::already_exists(format!(
                "profile for {} / {}",
                key.0, key.1
            )));
        }

        profiles.insert(key, profile);
        info!("Stored profile ({} total)", profiles.len());
        Ok(())
    }

    pub fn get(&self, location: &LocationId, key_parameter: &str) -> Result<Profile> {
        self.profiles
            .read()
            .get(&(location.clone(), key_parameter.to_string()))
            .cloned()
            .ok_or_else(|| {
                Error::not_found(format!("profile for {} / {}", location, key_parameter))
            })
    }

    pub fn delete(&self, location: &LocationId, key_parameter: &str) -> Result<()> {
        self.profiles
            .write()
            .remove(&(location.clone(), key_parameter.to_string()))
            .map(|_| ())
            .ok_or_else(|| {
                Error::not_found(format!("profile for {} / {}", location, key_parameter))
            })
    }

    /// Profiles matching wildcard masks, ordered by (location, key parameter)
    pub fn catalog(
        &self,
        office_mask: Option<&str>,
        location_mask: Option<&str>,
        parameter_mask: Option<&str>,
    ) -> Result<Vec<Profile>> {
        let masks = CatalogMasks::compile(office_mask, location_mask, parameter_mask)?;
        Ok(self
            .profiles
            .read()
            .values()
            .filter(|p| masks.matches(&p.location_id.office, &p.location_id.name, &p.key_parameter))
            .cloned()
            .collect())
    }

    pub fn len(&self) -> usize {
        self.profiles.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.read().is_empty()
    }
}

/// Profile parameter list length must equal the recipe's parameter count
pub fn check_parameter_count(profile: &Profile, definition: &ParserDefinition) -> Result<()> {
    if profile.parameter_list.len() != definition.parameter_count() {
        return Err(Error::invalid_argument(format!(
            "Profile for {} / {} lists {} parameter(s) but its parser definition declares {}",
            profile.location_id,
            profile.key_parameter,
            profile.parameter_list.len(),
            definition.parameter_count()
        )));
    }
    Ok(())
}
