//! Shared fixtures for retrieval planner tests

use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;

use crate::Config;
use crate::app::adapters::location_catalog::InMemoryLocationCatalog;
use crate::app::models::{
    DecodedRow, LocationId, ParameterInfo, ParserDefinition, ProfileInstanceKey, TimeSpec,
};
use crate::app::services::instance_store::{StoreRule, VersionedInstanceStore};
use crate::app::services::parser_registry::ParserDefinitionRegistry;
use crate::app::services::retrieval_planner::RetrievalPlanner;


pub struct Fixture {
    pub store: Arc<VersionedInstanceStore>,
    pub definitions: Arc<ParserDefinitionRegistry>,
    pub planner: RetrievalPlanner,
}

impl Fixture {
    /// Store one value per timestamp in both columns
    pub fn put(&self, key: &ProfileInstanceKey, points: &[(i64, f64)]) {
        let rows: Vec<DecodedRow> = points
            .iter()
            .map(|&(ts, v)| DecodedRow::new(ts, vec![Some(v), Some(v)]))
            .collect();
        self.store
            .store(key, &rows, StoreRule::ReplaceAll, false)
            .unwrap();
    }

    pub fn put_rows(&self, key: &ProfileInstanceKey, rows: &[DecodedRow]) {
        self.store
            .store(key, rows, StoreRule::ReplaceAll, false)
            .unwrap();
    }
}

pub fn version_date(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, 0, 0, 0).unwrap()
}

pub fn key(version: &str, day: Option<u32>) -> ProfileInstanceKey {
    ProfileInstanceKey::new("SWT", "KEYS", "Depth", version, day.map(version_date))
}

/// Depth in metres and water temperature in Celsius
pub fn depth_temperature_definition() -> ParserDefinition {
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
    }
}

/// Planner over an empty store with no parser definitions
pub fn bare_fixture() -> Fixture {
    let catalog = Arc::new(InMemoryLocationCatalog::with_locations([LocationId::new(
        "SWT", "KEYS",
    )]));
    let store = Arc::new(VersionedInstanceStore::in_memory());
    let definitions = Arc::new(ParserDefinitionRegistry::new(catalog));
    let planner =
        RetrievalPlanner::from_config(store.clone(), definitions.clone(), &Config::default())
            .unwrap();
    Fixture {
        store,
        definitions,
        planner,
    }
}

/// Planner with the depth/temperature recipe registered
pub fn fixture() -> Fixture {
    let fixture = bare_fixture();
    fixture
        .definitions
        .store(depth_temperature_definition(), true)
        .unwrap();
    fixture
}

/// First value column of each returned row
pub fn first_values(result: &crate::app::services::retrieval_planner::RetrievalResult) -> Vec<Option<f64>> {
    result.rows.iter().map(|r| r.values[0]).collect()
}
