//! Fixed-width line decoding
//!
//! Each physical line is one record. The time column and every parameter
//! column are fixed character ranges.

use super::field_parsers::{parse_value, slice_chars};
use super::time_format::TimeParser;
use crate::app::models::{ColumnSpec, DecodedRow, ParameterInfo};
use crate::{Error, Result};

/// Split raw text into numbered, non-blank physical lines
pub fn split_lines(raw: &str) -> Vec<(usize, &str)> {
    raw.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !line.trim().is_empty())
        .collect()
}

/// Decode one fixed-width line
pub fn decode_line(
    record_number: usize,
    line: &str,
    time_start: usize,
    time_length: usize,
    parameters: &[&ParameterInfo],
    time_parser: &TimeParser,
) -> Result<DecodedRow> {
    let time_text = slice_chars(line, time_start, time_length)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| {
            Error::malformed_record(
                record_number,
                format!(
                    "line of {} character(s) is too short for time column {}..{}",
                    line.chars().count(),
                    time_start,
                    time_start.saturating_add(time_length)
                ),
            )
        })?;

    let timestamp = time_parser
        .parse_millis(time_text)
        .map_err(|message| Error::definition_mismatch(record_number, message))?;

    let values = parameters
        .iter()
        .map(|param| match param.column {
            ColumnSpec::Columnar { start, length } => {
                slice_chars(line, start, length).and_then(parse_value)
            }
            ColumnSpec::Indexed { .. } => None,
        })
        .collect();

    Ok(DecodedRow::new(timestamp, values))
}
