//! Profile text decoder for raw hydrologic extracts
//!
//! This module turns raw text and a declarative [`ParserDefinition`] into an
//! ordered sequence of per-timestamp, multi-parameter rows.
//!
//! ## Architecture
//!
//! - [`decoder`] - Decode orchestration and skip policy
//! - [`indexed`] - Delimited record decoding
//! - [`columnar`] - Fixed-width line decoding
//! - [`time_format`] - Time format and zone compilation
//! - [`field_parsers`] - Field extraction and value coercion
//! - [`stats`] - Decode statistics and result structures
//!
//! ## Usage
//!
//! ```rust
//! use hydroprofile::app::services::profile_decoder::ProfileTextDecoder;
//! use hydroprofile::{LocationId, ParameterInfo, ParserDefinition, TimeSpec};
//!
//! let definition = ParserDefinition {
//!     location_id: LocationId::new("SWT", "KEYS"),
//!     key_parameter: "Depth".to_string(),
//!     time_zone: "UTC".to_string(),
//!     time_format: "EPOCH".to_string(),
//!     time_spec: TimeSpec::Indexed {
//!         time_field: 0,
//!         second_time_field: None,
//!         field_delimiter: ",".to_string(),
//!         record_delimiter: "\n".to_string(),
//!     },
//!     parameters: vec![
//!         ParameterInfo::indexed("Depth", "m", 0, 1),
//!         ParameterInfo::indexed("Temp-Water", "C", 1, 2),
//!     ],
//! };
//!
//! let result = ProfileTextDecoder::new()
//!     .decode("1568033337,12.3,55.1\n1568033350,,54.9", &definition)
//!     .unwrap();
//! assert_eq!(result.rows.len(), 2);
//! assert_eq!(result.rows[1].values, vec![None, Some(54.9)]);
//! ```
//!
//! [`ParserDefinition`]: crate::app::models::ParserDefinition

pub mod columnar;
pub mod decoder;
pub mod field_parsers;
pub mod indexed;
pub mod stats;
pub mod time_format;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use decoder::ProfileTextDecoder;
pub use stats::{DecodeResult, DecodeStats};
pub use time_format::{ParsedTz, TimeFormat, TimeParser};
