//! Time format and zone compilation for profile timestamps
//!
//! A recipe names its time format as a chrono pattern, an Oracle-style
//! pattern or an epoch form, and its zone as UTC, a fixed offset or an IANA
//! name. Both are compiled once per decode pass into a [`TimeParser`].

use chrono::{
    DateTime, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc,
};
use regex::Regex;
use std::sync::LazyLock;

use crate::constants::{EPOCH_MILLIS_FORMATS, EPOCH_SECONDS_FORMATS, ORACLE_FORMAT_TOKENS};
use crate::{Error, Result};

static OFFSET_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:UTC|GMT)?([+-])(\d{2}):?(\d{2})$").expect("offset pattern is valid")
});

/// Zone applied to local wall-clock times
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParsedTz {
    Utc,
    Fixed(FixedOffset),
    Olson(chrono_tz::Tz),
}

impl ParsedTz {
    /// Parse a zone spelling: `UTC`/`Z`, `+05:00`/`-0800`, or an IANA name
    pub fn parse(zone: &str) -> Result<Self> {
        let trimmed = zone.trim();
        if trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("UTC")
            || trimmed.eq_ignore_ascii_case("Z")
            || trimmed.eq_ignore_ascii_case("GMT")
        {
            return Ok(ParsedTz::Utc);
        }

        if let Some(caps) = OFFSET_PATTERN.captures(trimmed) {
            let hours: i32 = caps[2].parse().unwrap_or(0);
            let minutes: i32 = caps[3].parse().unwrap_or(0);
            let seconds = hours * 3600 + minutes * 60;
            let seconds = if &caps[1] == "-" { -seconds } else { seconds };
            return FixedOffset::east_opt(seconds)
                .map(ParsedTz::Fixed)
                .ok_or_else(|| Error::invalid_argument(format!("Offset out of range: '{}'", zone)));
        }

        trimmed
            .parse::<chrono_tz::Tz>()
            .map(ParsedTz::Olson)
            .map_err(|_| Error::invalid_argument(format!("Unknown time zone '{}'", zone)))
    }

    /// Resolve a local time to an instant
    ///
    /// Ambiguous local times resolve to the earlier instant. Local times that
    /// do not exist in the zone yield `None`.
    pub fn localize(&self, naive: &NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            ParsedTz::Utc => Some(Utc.from_utc_datetime(naive)),
            ParsedTz::Fixed(offset) => offset
                .from_local_datetime(naive)
                .single()
                .map(|dt| dt.with_timezone(&Utc)),
            ParsedTz::Olson(tz) => match tz.from_local_datetime(naive) {
                LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
                LocalResult::Ambiguous(earliest, latest) => {
                    Some(earliest.min(latest).with_timezone(&Utc))
                }
                LocalResult::None => None,
            },
        }
    }

    /// Render an instant as RFC 3339 text in this zone
    pub fn format_millis(&self, timestamp_ms: i64) -> Option<String> {
        let utc = DateTime::<Utc>::from_timestamp_millis(timestamp_ms)?;
        Some(match self {
            ParsedTz::Utc => utc.to_rfc3339(),
            ParsedTz::Fixed(offset) => utc.with_timezone(offset).to_rfc3339(),
            ParsedTz::Olson(tz) => utc.with_timezone(tz).to_rfc3339(),
        })
    }
}

/// Compiled time format
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeFormat {
    /// chrono strftime pattern
    Pattern(String),
    EpochSeconds,
    EpochMillis,
}

impl TimeFormat {
    /// Compile a format spelling
    ///
    /// Anything containing `%` is taken as a chrono pattern; epoch names are
    /// matched case-insensitively; everything else is translated from
    /// Oracle-style tokens.
    pub fn compile(format: &str) -> Result<Self> {
        let trimmed = format.trim();
        if trimmed.is_empty() {
            return Err(Error::invalid_argument("Time format cannot be empty"));
        }

        if EPOCH_SECONDS_FORMATS
            .iter()
            .any(|f| f.eq_ignore_ascii_case(trimmed))
        {
            return Ok(TimeFormat::EpochSeconds);
        }
        if EPOCH_MILLIS_FORMATS
            .iter()
            .any(|f| f.eq_ignore_ascii_case(trimmed))
        {
            return Ok(TimeFormat::EpochMillis);
        }

        let pattern = if trimmed.contains('%') {
            trimmed.to_string()
        } else {
            translate_oracle_format(trimmed)
        };

        if !pattern.contains('%') {
            return Err(Error::invalid_argument(format!(
                "Time format '{}' contains no date or time fields",
                format
            )));
        }

        // chrono rejects malformed specifiers only when a pattern is used
        if chrono::format::StrftimeItems::new(&pattern)
            .any(|item| matches!(item, chrono::format::Item::Error))
        {
            return Err(Error::invalid_argument(format!(
                "Time format '{}' is not a valid pattern",
                format
            )));
        }

        Ok(TimeFormat::Pattern(pattern))
    }

    pub fn is_epoch(&self) -> bool {
        !matches!(self, TimeFormat::Pattern(_))
    }
}

/// Translate Oracle-style tokens (`YYYY`, `HH24`, `MI`, ...) into chrono specifiers
pub fn translate_oracle_format(format: &str) -> String {
    let mut output = String::with_capacity(format.len() * 2);
    let mut rest = format;

    'scan: while !rest.is_empty() {
        let upper = rest.to_ascii_uppercase();
        for (token, replacement) in ORACLE_FORMAT_TOKENS {
            if upper.starts_with(token) {
                output.push_str(replacement);
                rest = &rest[token.len()..];
                continue 'scan;
            }
        }

        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            if c == '%' {
                output.push_str("%%");
            } else if c != '"' {
                output.push(c);
            }
        }
        rest = chars.as_str();
    }

    output
}

/// Zone-aware timestamp parser for one recipe
#[derive(Debug, Clone)]
pub struct TimeParser {
    format: TimeFormat,
    zone: ParsedTz,
}

impl TimeParser {
    /// Compile a recipe's time format and zone
    pub fn compile(format: &str, zone: &str) -> Result<Self> {
        Ok(Self {
            format: TimeFormat::compile(format)?,
            zone: ParsedTz::parse(zone)?,
        })
    }

    pub fn format(&self) -> &TimeFormat {
        &self.format
    }

    pub fn zone(&self) -> ParsedTz {
        self.zone
    }

    /// Parse timestamp text into epoch milliseconds
    ///
    /// The error string describes the mismatch; the caller attaches the record number.
    pub fn parse_millis(&self, text: &str) -> std::result::Result<i64, String> {
        let text = text.trim();
        match &self.format {
            TimeFormat::EpochSeconds => parse_epoch(text, 1000.0),
            TimeFormat::EpochMillis => parse_epoch(text, 1.0),
            TimeFormat::Pattern(pattern) => self.parse_pattern(text, pattern),
        }
    }

    fn parse_pattern(&self, text: &str, pattern: &str) -> std::result::Result<i64, String> {
        if has_offset_specifier(pattern) {
            return DateTime::parse_from_str(text, pattern)
                .map(|dt| dt.timestamp_millis())
                .map_err(|e| format!("'{}' does not match '{}': {}", text, pattern, e));
        }

        let naive = match NaiveDateTime::parse_from_str(text, pattern) {
            Ok(naive) => naive,
            Err(datetime_err) => NaiveDate::parse_from_str(text, pattern)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .ok_or_else(|| {
                    format!("'{}' does not match '{}': {}", text, pattern, datetime_err)
                })?,
        };

        self.zone
            .localize(&naive)
            .map(|dt| dt.timestamp_millis())
            .ok_or_else(|| format!("Local time '{}' does not exist in the recipe's zone", text))
    }
}

fn has_offset_specifier(pattern: &str) -> bool {
    pattern.contains("%z") || pattern.contains("%:z") || pattern.contains("%#z")
}

fn parse_epoch(text: &str, scale: f64) -> std::result::Result<i64, String> {
    if let Ok(whole) = text.parse::<i64>() {
        return whole
            .checked_mul(scale as i64)
            .ok_or_else(|| format!("Epoch value '{}' is out of range", text));
    }

    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => {
            let millis = (value * scale).round();
            if millis.abs() < i64::MAX as f64 {
                Ok(millis as i64)
            } else {
                Err(format!("Epoch value '{}' is out of range", text))
            }
        }
        _ => Err(format!("'{}' is not an epoch value", text)),
    }
}
