//! Core profile text decoder
//!
//! This module provides the decode orchestration: compiling the recipe's time
//! handling, dispatching on the recipe variant, and applying the skip policy.

use tracing::{debug, info, warn};

use super::columnar::{decode_line, split_lines};
use super::indexed::{IndexedLayout, decode_record, split_records};
use super::stats::{DecodeResult, DecodeStats};
use super::time_format::TimeParser;
use crate::app::models::{DecodedRow, ParserDefinition, TimeSpec};
use crate::config::DecoderConfig;
use crate::constants::DEFAULT_MAX_RECORDED_ERRORS;
use crate::{Error, Result};

/// Decoder for raw profile extracts
///
/// Stateless apart from its error cap; one instance can decode any number of
/// extracts concurrently.
#[derive(Debug, Clone)]
pub struct ProfileTextDecoder {
    max_recorded_errors: usize,
}

impl ProfileTextDecoder {
    /// Create a decoder with default settings
    pub fn new() -> Self {
        Self {
            max_recorded_errors: DEFAULT_MAX_RECORDED_ERRORS,
        }
    }

    /// Create a decoder from configuration
    pub fn from_config(config: &DecoderConfig) -> Self {
        Self {
            max_recorded_errors: config.max_recorded_errors,
        }
    }

    /// Set the cap on retained row error messages
    pub fn with_max_recorded_errors(mut self, max: usize) -> Self {
        self.max_recorded_errors = max;
        self
    }

    /// Check a recipe's structure and compile its time format and zone
    pub fn validate_definition(definition: &ParserDefinition) -> Result<TimeParser> {
        definition.validate()?;
        TimeParser::compile(&definition.time_format, &definition.time_zone)
    }

    /// Decode raw text into per-timestamp rows using a recipe
    ///
    /// # Arguments
    /// * `raw` - Extract text
    /// * `definition` - Parser recipe for the extract's location
    ///
    /// # Returns
    /// Rows in source order with skip statistics. Fails with `EmptyResult`
    /// when the text holds no records or every record fails its timestamp.
    pub fn decode(&self, raw: &str, definition: &ParserDefinition) -> Result<DecodeResult> {
        let time_parser = Self::validate_definition(definition)?;
        let parameters = definition.ordered_parameters();
        let mut stats = DecodeStats::new();
        let mut rows = Vec::new();

        debug!(
            "Decoding {} bytes for {} / {}",
            raw.len(),
            definition.location_id,
            definition.key_parameter
        );

        match &definition.time_spec {
            TimeSpec::Indexed {
                time_field,
                second_time_field,
                field_delimiter,
                record_delimiter,
            } => {
                let layout = IndexedLayout {
                    time_field: *time_field,
                    second_time_field: *second_time_field,
                    field_delimiter,
                    record_delimiter,
                };
                for (record_number, record) in split_records(raw, record_delimiter) {
                    let decoded =
                        decode_record(record_number, record, &layout, &parameters, &time_parser);
                    self.accumulate(decoded, &mut rows, &mut stats);
                }
            }
            TimeSpec::Columnar {
                time_start,
                time_length,
            } => {
                for (record_number, line) in split_lines(raw) {
                    let decoded = decode_line(
                        record_number,
                        line,
                        *time_start,
                        *time_length,
                        &parameters,
                        &time_parser,
                    );
                    self.accumulate(decoded, &mut rows, &mut stats);
                }
            }
        }

        if stats.total_records == 0 {
            return Err(Error::empty_result("extract contains no records"));
        }
        if rows.is_empty() {
            warn!(
                "All {} record(s) for {} failed to decode",
                stats.total_records, definition.location_id
            );
            return Err(Error::empty_result(format!(
                "all {} record(s) failed to decode; first error: {}",
                stats.total_records,
                stats.errors.first().map(String::as_str).unwrap_or("unknown")
            )));
        }

        info!(
            "Decoded {} rows from {} records ({} skipped, {} null values)",
            stats.rows_decoded, stats.total_records, stats.rows_skipped, stats.null_values
        );

        Ok(DecodeResult { rows, stats })
    }

    fn accumulate(
        &self,
        decoded: Result<DecodedRow>,
        rows: &mut Vec<DecodedRow>,
        stats: &mut DecodeStats,
    ) {
        stats.total_records += 1;
        match decoded {
            Ok(row) => {
                stats.null_values += row.values.iter().filter(|v| v.is_none()).count();
                stats.rows_decoded += 1;
                rows.push(row);
            }
            Err(e) => {
                warn!("Skipped row: {}", e);
                stats.record_skip(e.to_string(), self.max_recorded_errors);
            }
        }
    }
}

impl Default for ProfileTextDecoder {
    fn default() -> Self {
        Self::new()
    }
}
