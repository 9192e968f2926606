//! Decode-then-store pipeline for raw profile text
//!
//! The ingestor looks up the parser recipe for an instance key, decodes the
//! extract, orders the rows and writes them all-or-nothing. Nothing reaches
//! the store when decoding fails.

use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

use crate::app::models::{DecodedRow, ProfileInstanceKey};
use crate::app::services::instance_store::{StoreReport, StoreRule, VersionedInstanceStore};
use crate::app::services::parser_registry::ParserDefinitionRegistry;
use crate::app::services::profile_decoder::{DecodeStats, ProfileTextDecoder};
use crate::app::services::profile_registry::{ProfileRegistry, check_parameter_count};
use crate::config::Config;
use crate::{Error, Result};

/// Outcome of one ingest call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct IngestReport {
    pub key: ProfileInstanceKey,
    pub decode: DecodeStats,
    pub store: StoreReport,
    pub first_timestamp: Option<i64>,
    pub last_timestamp: Option<i64>,
}

/// Stores raw profile text under versioned instance keys
pub struct ProfileIngestor {
    definitions: Arc<ParserDefinitionRegistry>,
    profiles: Option<Arc<ProfileRegistry>>,
    store: Arc<VersionedInstanceStore>,
    decoder: ProfileTextDecoder,
}

impl ProfileIngestor {
    pub fn new(definitions: Arc<ParserDefinitionRegistry>, store: Arc<VersionedInstanceStore>) -> Self {
        Self {
            definitions,
            profiles: None,
            store,
            decoder: ProfileTextDecoder::new(),
        }
    }

    pub fn from_config(
        definitions: Arc<ParserDefinitionRegistry>,
        store: Arc<VersionedInstanceStore>,
        config: &Config,
    ) -> Self {
        Self::new(definitions, store).with_decoder(ProfileTextDecoder::from_config(&config.decoder))
    }

    /// Check registered profiles against recipes before each ingest
    pub fn with_profiles(mut self, profiles: Arc<ProfileRegistry>) -> Self {
        self.profiles = Some(profiles);
        self
    }

    pub fn with_decoder(mut self, decoder: ProfileTextDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    /// Decode `raw_text` with the recipe for `key` and store the rows
    ///
    /// # Arguments
    /// * `key` - Target instance; its location and key parameter select the recipe
    /// * `raw_text` - Extract in the recipe's indexed or columnar layout
    /// * `rule` - How incoming rows combine with stored points
    /// * `override_protection` - Allow modifying protected points
    pub fn store_profile_text(
        &self,
        key: &ProfileInstanceKey,
        raw_text: &str,
        rule: StoreRule,
        override_protection: bool,
    ) -> Result<IngestReport> {
        let location = key.location_id();
        let definition = self.definitions.get(&location, &key.key_parameter)?;

        if let Some(profiles) = &self.profiles {
            match profiles.get(&location, &key.key_parameter) {
                Ok(profile) => check_parameter_count(&profile, &definition)?,
                Err(Error::NotFound { .. }) => {}
                Err(e) => return Err(e),
            }
        }

        let decoded = self.decoder.decode(raw_text, &definition)?;
        let mut rows = decoded.rows;
        rows.sort_by_key(|r| r.timestamp);
        reject_duplicates(&rows)?;

        let store = self
            .store
            .store(key, &rows, rule, override_protection)
            .inspect_err(|e| warn!("Ingest into {} failed: {}", key, e))?;

        info!(
            "Ingested {} row(s) into {} ({} skipped, {} inserted, {} updated, {} deleted)",
            rows.len(),
            key,
            decoded.stats.rows_skipped,
            store.inserted,
            store.updated,
            store.deleted
        );

        Ok(IngestReport {
            key: key.clone(),
            decode: decoded.stats,
            store,
            first_timestamp: rows.first().map(|r| r.timestamp),
            last_timestamp: rows.last().map(|r| r.timestamp),
        })
    }
}

fn reject_duplicates(rows: &[DecodedRow]) -> Result<()> {
    let mut seen = HashSet::with_capacity(rows.len());
    match rows.iter().find(|r| !seen.insert(r.timestamp)) {
        Some(row) => Err(Error::invalid_argument(format!(
            "Extract holds more than one record at timestamp {}",
            row.timestamp
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::adapters::location_catalog::InMemoryLocationCatalog;
    use crate::app::models::{LocationId, ParameterInfo, ParserDefinition, Profile, TimeSpec};

    struct Harness {
        definitions: Arc<ParserDefinitionRegistry>,
        profiles: Arc<ProfileRegistry>,
        store: Arc<VersionedInstanceStore>,
        ingestor: ProfileIngestor,
    }

    fn harness() -> Harness {
        let catalog = Arc::new(InMemoryLocationCatalog::with_locations([LocationId::new(
            "SWT", "KEYS",
        )]));
        let definitions = Arc::new(ParserDefinitionRegistry::new(catalog.clone()));
        let profiles = Arc::new(ProfileRegistry::new(catalog, definitions.clone()));
        let store = Arc::new(VersionedInstanceStore::in_memory());
        let ingestor = ProfileIngestor::new(definitions.clone(), store.clone())
            .with_profiles(profiles.clone());
        definitions
            .store(
                ParserDefinition {
                    location_id: LocationId::new("SWT", "KEYS"),
                    key_parameter: "Depth".to_string(),
                    time_zone: "UTC".to_string(),
                    time_format: "EPOCH".to_string(),
                    time_spec: TimeSpec::Indexed {
                        time_field: 0,
                        second_time_field: None,
                        field_delimiter: ",".to_string(),
                        record_delimiter: "\n".to_string(),
                    },
                    parameters: vec![
                        ParameterInfo::indexed("Depth", "m", 0, 1),
                        ParameterInfo::indexed("Temp-Water", "C", 1, 2),
                    ],
                },
                true,
            )
            .unwrap();
        Harness {
            definitions,
            profiles,
            store,
            ingestor,
        }
    }

    fn key() -> ProfileInstanceKey {
        ProfileInstanceKey::new("SWT", "KEYS", "Depth", "raw", None)
    }

    #[test]
    fn test_ingest_sorts_and_stores() {
        let h = harness();
        let raw = "1568033350,,54.9\n1568033337,12.3,55.1\nnot-a-time,1,2\n";

        let report = h
            .ingestor
            .store_profile_text(&key(), raw, StoreRule::ReplaceAll, false)
            .unwrap();
        assert_eq!(report.decode.rows_skipped, 1);
        assert_eq!(report.store.inserted, 2);
        assert_eq!(report.first_timestamp, Some(1_568_033_337_000));
        assert_eq!(report.last_timestamp, Some(1_568_033_350_000));

        let instance = h.store.get_instance(&key()).unwrap();
        let rows = instance.ordered_rows();
        assert_eq!(rows[0].values, vec![Some(12.3), Some(55.1)]);
        assert_eq!(rows[1].values, vec![None, Some(54.9)]);
    }

    #[test]
    fn test_missing_definition() {
        let h = harness();
        let other = ProfileInstanceKey::new("SWT", "KEYS", "Elev", "raw", None);
        let result = h
            .ingestor
            .store_profile_text(&other, "1,2,3", StoreRule::Merge, false);
        assert!(matches!(result, Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_decode_failure_leaves_store_untouched() {
        let h = harness();
        let result = h
            .ingestor
            .store_profile_text(&key(), "garbage,1,2\n", StoreRule::ReplaceAll, false);
        assert!(matches!(result, Err(Error::EmptyResult { .. })));
        assert!(!h.store.contains(&key()).unwrap());
    }

    #[test]
    fn test_duplicate_timestamps_rejected() {
        let h = harness();
        let raw = "100,1,2\n100,3,4";
        let result = h
            .ingestor
            .store_profile_text(&key(), raw, StoreRule::ReplaceAll, false);
        assert!(matches!(result, Err(Error::InvalidArgument { .. })));
        assert!(!h.store.contains(&key()).unwrap());
    }

    #[test]
    fn test_profile_mismatch_after_recipe_change() {
        let h = harness();
        h.profiles
            .store(
                Profile {
                    location_id: LocationId::new("SWT", "KEYS"),
                    key_parameter: "Depth".to_string(),
                    description: String::new(),
                    parameter_list: vec!["Depth".to_string(), "Temp-Water".to_string()],
                    reference_ts_id: None,
                },
                true,
            )
            .unwrap();

        // Recipe narrowed after the profile was registered
        let mut narrowed = h
            .definitions
            .get(&LocationId::new("SWT", "KEYS"), "Depth")
            .unwrap();
        narrowed.parameters.truncate(1);
        h.definitions.store(narrowed, false).unwrap();

        let result = h
            .ingestor
            .store_profile_text(&key(), "100,1", StoreRule::ReplaceAll, false);
        assert!(matches!(result, Err(Error::InvalidArgument { .. })));
    }
}
