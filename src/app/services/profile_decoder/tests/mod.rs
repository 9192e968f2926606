//! Shared fixtures for profile decoder tests

use crate::app::models::{LocationId, ParameterInfo, ParserDefinition, TimeSpec};


/// 2019-09-09T12:48:57Z
pub const T0_MILLIS: i64 = 1_568_033_337_000;

/// Indexed recipe with an epoch-seconds time in field 0 and two parameters
pub fn indexed_definition(time_format: &str, time_zone: &str) -> ParserDefinition {
    ParserDefinition {
        location_id: LocationId::new("SWT", "KEYS"),
        key_parameter: "Depth".to_string(),
        time_zone: time_zone.to_string(),
        time_format: time_format.to_string(),
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

/// Indexed recipe with the date and time split across fields 0 and 1
pub fn split_time_definition(time_zone: &str) -> ParserDefinition {
    ParserDefinition {
        time_format: "MM/DD/YYYY,HH24:MI:SS".to_string(),
        time_zone: time_zone.to_string(),
        time_spec: TimeSpec::Indexed {
            time_field: 0,
            second_time_field: Some(1),
            field_delimiter: ",".to_string(),
            record_delimiter: "\n".to_string(),
        },
        parameters: vec![
            ParameterInfo::indexed("Depth", "m", 0, 2),
            ParameterInfo::indexed("Temp-Water", "C", 1, 3),
        ],
        ..indexed_definition("EPOCH", "UTC")
    }
}

/// Columnar recipe: time in characters 0..19, depth 20..26, temperature 27..33
pub fn columnar_definition() -> ParserDefinition {
    ParserDefinition {
        location_id: LocationId::new("SWT", "KEYS"),
        key_parameter: "Depth".to_string(),
        time_zone: "UTC".to_string(),
        time_format: "%Y-%m-%d %H:%M:%S".to_string(),
        time_spec: TimeSpec::Columnar {
            time_start: 0,
            time_length: 19,
        },
        parameters: vec![
            ParameterInfo::columnar("Depth", "m", 0, 20, 6),
            ParameterInfo::columnar("Temp-Water", "C", 1, 27, 6),
        ],
    }
}
