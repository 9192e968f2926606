//! Data models for hydrologic profile processing
//!
//! This module contains the core data structures for parser recipes, profiles,
//! versioned instance keys, and decoded rows.

use crate::constants::{DEFAULT_FIELD_DELIMITER, DEFAULT_PAGE_SIZE, DEFAULT_RECORD_DELIMITER};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

// =============================================================================
// Location Identity
// =============================================================================

/// Office-scoped location identifier
///
/// Ordering is by office then name, which fixes the listing order of the
/// registries.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LocationId {
    /// Owning office (e.g. "SWT", "HEC")
    pub office: String,

    /// Location name within the office
    pub name: String,
}

impl LocationId {
    pub fn new(office: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            office: office.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.office, self.name)
    }
}

// =============================================================================
// Parser Recipe
// =============================================================================

/// Where a parameter's value lives inside one record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ColumnSpec {
    /// 0-based field index after splitting on the field delimiter
    Indexed { index: usize },

    /// 0-based character offset and width in a fixed-width line
    Columnar { start: usize, length: usize },
}

impl ColumnSpec {
    pub fn is_indexed(&self) -> bool {
        matches!(self, ColumnSpec::Indexed { .. })
    }
}

/// Description of one decoded parameter column
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ParameterInfo {
    /// Parameter name (e.g. "Depth", "Temp-Water")
    pub parameter: String,

    /// Canonical unit of the stored values
    pub unit: String,

    /// Position of the value in every decoded row
    pub ordinal: usize,

    /// Location of the value in the raw record
    pub column: ColumnSpec,
}

impl ParameterInfo {
    pub fn indexed(parameter: &str, unit: &str, ordinal: usize, index: usize) -> Self {
        Self {
            parameter: parameter.to_string(),
            unit: unit.to_string(),
            ordinal,
            column: ColumnSpec::Indexed { index },
        }
    }

    pub fn columnar(parameter: &str, unit: &str, ordinal: usize, start: usize, length: usize) -> Self {
        Self {
            parameter: parameter.to_string(),
            unit: unit.to_string(),
            ordinal,
            column: ColumnSpec::Columnar { start, length },
        }
    }
}

fn default_record_delimiter() -> String {
    DEFAULT_RECORD_DELIMITER.to_string()
}

fn default_field_delimiter() -> String {
    DEFAULT_FIELD_DELIMITER.to_string()
}

/// How the timestamp of a record is located
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TimeSpec {
    /// Delimited records; the time is one field, or a date and a time field
    /// re-joined with the field delimiter before parsing
    #[serde(rename_all = "kebab-case")]
    Indexed {
        time_field: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        second_time_field: Option<usize>,
        #[serde(default = "default_field_delimiter")]
        field_delimiter: String,
        #[serde(default = "default_record_delimiter")]
        record_delimiter: String,
    },

    /// Fixed-width lines; the time occupies a character range
    #[serde(rename_all = "kebab-case")]
    Columnar { time_start: usize, time_length: usize },
}

/// Declarative recipe for decoding one location's profile extracts
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ParserDefinition {
    pub location_id: LocationId,
    pub key_parameter: String,

    /// Zone applied to local times ("UTC", "+05:00", "America/Chicago")
    pub time_zone: String,

    /// chrono, Oracle-style or epoch time pattern
    pub time_format: String,

    pub time_spec: TimeSpec,

    /// Parameters in ordinal order
    pub parameters: Vec<ParameterInfo>,
}

impl ParserDefinition {
    /// Number of values in every row decoded with this recipe
    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    /// Canonical units in ordinal order
    pub fn units(&self) -> Vec<String> {
        self.ordered_parameters()
            .into_iter()
            .map(|p| p.unit.clone())
            .collect()
    }

    /// Parameter names in ordinal order
    pub fn parameter_names(&self) -> Vec<String> {
        self.ordered_parameters()
            .into_iter()
            .map(|p| p.parameter.clone())
            .collect()
    }

    /// Parameters sorted by ordinal
    pub fn ordered_parameters(&self) -> Vec<&ParameterInfo> {
        let mut params: Vec<&ParameterInfo> = self.parameters.iter().collect();
        params.sort_by_key(|p| p.ordinal);
        params
    }

    /// Validate structural invariants of the recipe
    ///
    /// Time zone and format compilation is checked by the decoder.
    pub fn validate(&self) -> Result<()> {
        if self.key_parameter.trim().is_empty() {
            return Err(Error::invalid_argument("Key parameter cannot be empty"));
        }

        if self.location_id.name.trim().is_empty() || self.location_id.office.trim().is_empty() {
            return Err(Error::invalid_argument(
                "Location id requires both office and name",
            ));
        }

        if self.parameters.is_empty() {
            return Err(Error::invalid_argument(
                "Parser definition must declare at least one parameter",
            ));
        }

        // Ordinals must be exactly 0..n
        let ordinals: BTreeSet<usize> = self.parameters.iter().map(|p| p.ordinal).collect();
        if ordinals.len() != self.parameters.len() {
            return Err(Error::invalid_argument(
                "Parameter ordinals must be unique",
            ));
        }
        if ordinals.iter().copied().ne(0..self.parameters.len()) {
            return Err(Error::invalid_argument(format!(
                "Parameter ordinals must be contiguous from 0, found {:?}",
                ordinals
            )));
        }

        let mut names = HashSet::new();
        for param in &self.parameters {
            if param.parameter.trim().is_empty() {
                return Err(Error::invalid_argument("Parameter name cannot be empty"));
            }
            if !names.insert(param.parameter.as_str()) {
                return Err(Error::invalid_argument(format!(
                    "Duplicate parameter '{}'",
                    param.parameter
                )));
            }
        }

        match &self.time_spec {
            TimeSpec::Indexed {
                field_delimiter,
                record_delimiter,
                ..
            } => {
                if field_delimiter.is_empty() || record_delimiter.is_empty() {
                    return Err(Error::invalid_argument("Delimiters cannot be empty"));
                }
                if field_delimiter == record_delimiter {
                    return Err(Error::invalid_argument(
                        "Field and record delimiters must differ",
                    ));
                }
                if let Some(param) = self.parameters.iter().find(|p| !p.column.is_indexed()) {
                    return Err(Error::invalid_argument(format!(
                        "Parameter '{}' uses a columnar layout in an indexed definition",
                        param.parameter
                    )));
                }
            }
            TimeSpec::Columnar {
                time_start,
                time_length,
            } => {
                if *time_length == 0 {
                    return Err(Error::invalid_argument("Time column length cannot be zero"));
                }
                if time_start.checked_add(*time_length).is_none() {
                    return Err(Error::invalid_argument(format!(
                        "Time column {}+{} overflows the line position range",
                        time_start, time_length
                    )));
                }
                for param in &self.parameters {
                    match param.column {
                        ColumnSpec::Columnar { start, length }
                            if length > 0 && start.checked_add(length).is_some() => {}
                        ColumnSpec::Columnar { length: 0, .. } => {
                            return Err(Error::invalid_argument(format!(
                                "Parameter '{}' has a zero-width column",
                                param.parameter
                            )));
                        }
                        ColumnSpec::Columnar { start, length } => {
                            return Err(Error::invalid_argument(format!(
                                "Parameter '{}' column {}+{} overflows the line position range",
                                param.parameter, start, length
                            )));
                        }
                        ColumnSpec::Indexed { .. } => {
                            return Err(Error::invalid_argument(format!(
                                "Parameter '{}' uses an indexed layout in a columnar definition",
                                param.parameter
                            )));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

// =============================================================================
// Profile
// =============================================================================

/// Named grouping of parameters sharing one timestamp axis at a location
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Profile {
    pub location_id: LocationId,
    pub key_parameter: String,

    #[serde(default)]
    pub description: String,

    /// Parameter names; index 0 is the key parameter
    pub parameter_list: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_ts_id: Option<String>,
}

impl Profile {
    pub fn validate(&self) -> Result<()> {
        if self.parameter_list.is_empty() {
            return Err(Error::invalid_argument(
                "Profile parameter list cannot be empty",
            ));
        }
        if self.parameter_list[0] != self.key_parameter {
            return Err(Error::invalid_argument(format!(
                "First profile parameter '{}' must be the key parameter '{}'",
                self.parameter_list[0], self.key_parameter
            )));
        }
        let unique: HashSet<&String> = self.parameter_list.iter().collect();
        if unique.len() != self.parameter_list.len() {
            return Err(Error::invalid_argument(
                "Profile parameter list contains duplicates",
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Versioned Instances
// =============================================================================

/// Address of one stored profile instance
///
/// Ordering places an unversioned instance (`version_date == None`) before
/// every dated revision of the same version label.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProfileInstanceKey {
    pub office: String,
    pub location: String,
    pub key_parameter: String,

    /// Version label (e.g. "raw", "obs")
    pub version: String,

    /// Revision instant within the label; `None` means unversioned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_date: Option<DateTime<Utc>>,
}

impl ProfileInstanceKey {
    pub fn new(
        office: &str,
        location: &str,
        key_parameter: &str,
        version: &str,
        version_date: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            office: office.to_string(),
            location: location.to_string(),
            key_parameter: key_parameter.to_string(),
            version: version.to_string(),
            version_date,
        }
    }

    pub fn location_id(&self) -> LocationId {
        LocationId::new(&self.office, &self.location)
    }

    /// True when this key belongs to the series (office, location, key parameter)
    pub fn same_series(&self, office: &str, location: &str, key_parameter: &str) -> bool {
        self.office == office && self.location == location && self.key_parameter == key_parameter
    }
}

impl fmt::Display for ProfileInstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}@",
            self.office, self.location, self.key_parameter, self.version
        )?;
        match self.version_date {
            Some(date) => write!(f, "{}", date.to_rfc3339()),
            None => write!(f, "unversioned"),
        }
    }
}

/// One decoded timestamp with a nullable value per parameter ordinal
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DecodedRow {
    /// Epoch milliseconds
    pub timestamp: i64,

    /// Values indexed by parameter ordinal
    pub values: Vec<Option<f64>>,
}

impl DecodedRow {
    pub fn new(timestamp: i64, values: Vec<Option<f64>>) -> Self {
        Self { timestamp, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True when no parameter carries a value
    pub fn is_all_null(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }
}

/// A stored profile instance with all of its rows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Instance {
    pub key: ProfileInstanceKey,

    /// Rows keyed by timestamp (unique, ascending)
    pub rows: BTreeMap<i64, DecodedRow>,

    /// Timestamps currently flagged protected
    pub protected: BTreeSet<i64>,

    pub page_size: usize,
}

impl Instance {
    pub fn new(key: ProfileInstanceKey) -> Self {
        Self {
            key,
            rows: BTreeMap::new(),
            protected: BTreeSet::new(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn first_timestamp(&self) -> Option<i64> {
        self.rows.keys().next().copied()
    }

    pub fn last_timestamp(&self) -> Option<i64> {
        self.rows.keys().next_back().copied()
    }

    /// Number of values per row (0 for an empty instance)
    pub fn parameter_count(&self) -> usize {
        self.rows.values().next().map(DecodedRow::len).unwrap_or(0)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Rows in ascending timestamp order
    pub fn ordered_rows(&self) -> Vec<DecodedRow> {
        self.rows.values().cloned().collect()
    }
}

/// Summary of a stored instance without its row data
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct InstanceSummary {
    pub key: ProfileInstanceKey,
    pub parameter_count: usize,
    pub row_count_in_window: usize,
    pub first_timestamp: Option<i64>,
    pub last_timestamp: Option<i64>,
}

// =============================================================================
// Time Windows
// =============================================================================

/// Closed or half-open time window in epoch milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
    pub start_inclusive: bool,
    pub end_inclusive: bool,
}

impl TimeWindow {
    /// Window including both ends
    pub fn closed(start: i64, end: i64) -> Self {
        Self {
            start,
            end,
            start_inclusive: true,
            end_inclusive: true,
        }
    }

    /// Window covering every representable timestamp
    pub fn unbounded() -> Self {
        Self::closed(i64::MIN, i64::MAX)
    }

    pub fn with_inclusivity(mut self, start_inclusive: bool, end_inclusive: bool) -> Self {
        self.start_inclusive = start_inclusive;
        self.end_inclusive = end_inclusive;
        self
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        let after_start = if self.start_inclusive {
            timestamp >= self.start
        } else {
            timestamp > self.start
        };
        let before_end = if self.end_inclusive {
            timestamp <= self.end
        } else {
            timestamp < self.end
        };
        after_start && before_end
    }

    /// Equivalent inclusive bounds, or `None` when the window is empty
    pub fn inclusive_bounds(&self) -> Option<(i64, i64)> {
        let start = if self.start_inclusive {
            self.start
        } else {
            self.start.checked_add(1)?
        };
        let end = if self.end_inclusive {
            self.end
        } else {
            self.end.checked_sub(1)?
        };
        (start <= end).then_some((start, end))
    }

    pub fn validate(&self) -> Result<()> {
        if self.start > self.end {
            return Err(Error::invalid_argument(format!(
                "Window start {} is after end {}",
                self.start, self.end
            )));
        }
        Ok(())
    }
}
