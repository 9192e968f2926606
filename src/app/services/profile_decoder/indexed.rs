//! Delimited record decoding
//!
//! Records are split on the recipe's record delimiter, then fields on its
//! field delimiter. The time may span two fields (date and time), which are
//! re-joined with the field delimiter before parsing.

use super::field_parsers::{get_field, parse_value, strip_carriage_return};
use super::time_format::TimeParser;
use crate::app::models::{ColumnSpec, DecodedRow, ParameterInfo};
use crate::{Error, Result};

/// Field layout of an indexed recipe
#[derive(Debug, Clone)]
pub struct IndexedLayout<'a> {
    pub time_field: usize,
    pub second_time_field: Option<usize>,
    pub field_delimiter: &'a str,
    pub record_delimiter: &'a str,
}

/// Split raw text into numbered, non-blank records
///
/// Record numbers are 1-based positions in the raw text, so blank records
/// still advance the numbering.
pub fn split_records<'t>(raw: &'t str, record_delimiter: &str) -> Vec<(usize, &'t str)> {
    raw.split(record_delimiter)
        .enumerate()
        .map(|(i, record)| (i + 1, strip_carriage_return(record, record_delimiter)))
        .filter(|(_, record)| !record.trim().is_empty())
        .collect()
}

/// Decode one delimited record
pub fn decode_record(
    record_number: usize,
    record: &str,
    layout: &IndexedLayout<'_>,
    parameters: &[&ParameterInfo],
    time_parser: &TimeParser,
) -> Result<DecodedRow> {
    let fields: Vec<&str> = record.split(layout.field_delimiter).collect();

    let time_text = match layout.second_time_field {
        None => get_field(&fields, layout.time_field)
            .ok_or_else(|| missing_time(record_number, layout.time_field, fields.len()))?
            .to_string(),
        Some(second) => {
            let date = get_field(&fields, layout.time_field)
                .ok_or_else(|| missing_time(record_number, layout.time_field, fields.len()))?;
            let time = get_field(&fields, second)
                .ok_or_else(|| missing_time(record_number, second, fields.len()))?;
            format!("{}{}{}", date, layout.field_delimiter, time)
        }
    };

    let timestamp = time_parser
        .parse_millis(&time_text)
        .map_err(|message| Error::definition_mismatch(record_number, message))?;

    let values = parameters
        .iter()
        .map(|param| match param.column {
            ColumnSpec::Indexed { index } => fields.get(index).and_then(|f| parse_value(f)),
            ColumnSpec::Columnar { .. } => None,
        })
        .collect();

    Ok(DecodedRow::new(timestamp, values))
}

fn missing_time(record_number: usize, index: usize, field_count: usize) -> Error {
    Error::malformed_record(
        record_number,
        format!(
            "time field {} missing or empty ({} field(s) in record)",
            index, field_count
        ),
    )
}
