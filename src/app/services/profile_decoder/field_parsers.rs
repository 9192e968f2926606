//! Field extraction utilities for profile records
//!
//! Helpers for pulling a parameter value out of a delimited field or a
//! fixed-width character range, with the null tolerance policy applied.

/// Coerce field text to a finite value
///
/// Empty, unparsable and non-finite text all become `None`.
pub fn parse_value(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Slice a character range out of a fixed-width line
///
/// Offsets are 0-based and counted in characters. Returns `None` when the
/// line ends before `start + length`.
pub fn slice_chars(line: &str, start: usize, length: usize) -> Option<&str> {
    if length == 0 {
        return None;
    }

    let mut boundaries = line
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(line.len()));

    let begin = boundaries.nth(start)?;
    let end = boundaries.nth(length - 1)?;
    Some(&line[begin..end])
}

/// Strip the carriage return left behind when CRLF text is split on `\n`
pub fn strip_carriage_return<'a>(record: &'a str, record_delimiter: &str) -> &'a str {
    if record_delimiter == "\n" {
        record.strip_suffix('\r').unwrap_or(record)
    } else {
        record
    }
}

/// Get a trimmed, non-empty field by 0-based index
pub fn get_field<'a>(fields: &[&'a str], index: usize) -> Option<&'a str> {
    fields
        .get(index)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}
