//! Shared fixtures for parser registry tests

use std::sync::Arc;

use crate::app::adapters::location_catalog::InMemoryLocationCatalog;
use crate::app::models::{LocationId, ParameterInfo, ParserDefinition, TimeSpec};
use crate::app::services::parser_registry::ParserDefinitionRegistry;

mod query_tests;
mod registry_tests;

pub fn create_test_definition(office: &str, location: &str, key_parameter: &str) -> ParserDefinition {
    ParserDefinition {
        location_id: LocationId::new(office, location),
        key_parameter: key_parameter.to_string(),
        time_zone: "UTC".to_string(),
        time_format: "MM/DD/YYYY,HH24:MI:SS".to_string(),
        time_spec: TimeSpec::Indexed {
            time_field: 0,
            second_time_field: Some(1),
            field_delimiter: ",".to_string(),
            record_delimiter: "\n".to_string(),
        },
        parameters: vec![
            ParameterInfo::indexed(key_parameter, "m", 0, 2),
            ParameterInfo::indexed("Temp-Water", "C", 1, 3),
        ],
    }
}

/// Registry whose catalog knows SWT/KEYS, SWT/TENK and HEC/ALPHA
pub fn create_test_registry() -> ParserDefinitionRegistry {
    let catalog = InMemoryLocationCatalog::with_locations([
        LocationId::new("SWT", "KEYS"),
        LocationId::new("SWT", "TENK"),
        LocationId::new("HEC", "ALPHA"),
    ]);
    ParserDefinitionRegistry::new(Arc::new(catalog))
}
