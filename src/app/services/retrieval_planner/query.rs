//! Retrieval queries and version-mode selection

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::app::models::{LocationId, TimeWindow};
use crate::{Error, Result};

/// A request for one page of a profile series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetrievalQuery {
    pub office: String,
    pub location: String,
    pub key_parameter: String,

    /// Version label; `None` addresses every version of the series
    pub version: Option<String>,
    pub version_date: Option<DateTime<Utc>>,
    pub max_version: bool,

    pub window: TimeWindow,

    /// Presentation zone for rendered timestamps; configured default when unset
    pub time_zone: Option<String>,

    /// Target units by parameter ordinal; index 0 is the key parameter
    pub requested_units: Vec<String>,

    /// Prepend one page of rows preceding the window
    pub previous: bool,
    /// Append one page of rows following the window
    pub next: bool,

    /// Rows per page; configured default when unset
    pub page_size: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_cursor: Option<String>,
}

impl RetrievalQuery {
    /// Query over the whole timeline of a series with default settings
    pub fn new(office: &str, location: &str, key_parameter: &str) -> Self {
        Self {
            office: office.to_string(),
            location: location.to_string(),
            key_parameter: key_parameter.to_string(),
            version: None,
            version_date: None,
            max_version: false,
            window: TimeWindow::unbounded(),
            time_zone: None,
            requested_units: Vec::new(),
            previous: false,
            next: false,
            page_size: None,
            page_cursor: None,
        }
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    pub fn with_version_date(mut self, version_date: DateTime<Utc>) -> Self {
        self.version_date = Some(version_date);
        self
    }

    pub fn with_max_version(mut self, max_version: bool) -> Self {
        self.max_version = max_version;
        self
    }

    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_time_zone(mut self, zone: &str) -> Self {
        self.time_zone = Some(zone.to_string());
        self
    }

    pub fn with_requested_units<S: AsRef<str>>(mut self, units: &[S]) -> Self {
        self.requested_units = units.iter().map(|u| u.as_ref().to_string()).collect();
        self
    }

    pub fn with_previous(mut self, previous: bool) -> Self {
        self.previous = previous;
        self
    }

    pub fn with_next(mut self, next: bool) -> Self {
        self.next = next;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.page_cursor = Some(cursor.into());
        self
    }

    pub fn location_id(&self) -> LocationId {
        LocationId::new(&self.office, &self.location)
    }

    /// Stable digest of every field except the page cursor
    pub fn fingerprint(&self) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        let mut field = |bytes: &[u8]| {
            hasher.update(&(bytes.len() as u64).to_le_bytes());
            hasher.update(bytes);
        };

        field(self.office.as_bytes());
        field(self.location.as_bytes());
        field(self.key_parameter.as_bytes());
        field(self.version.as_deref().unwrap_or("\u{0}none").as_bytes());
        field(
            &self
                .version_date
                .map(|d| d.timestamp_millis().to_be_bytes())
                .unwrap_or_default(),
        );
        field(&[
            self.max_version as u8,
            self.window.start_inclusive as u8,
            self.window.end_inclusive as u8,
            self.previous as u8,
            self.next as u8,
            self.version_date.is_some() as u8,
        ]);
        field(&self.window.start.to_be_bytes());
        field(&self.window.end.to_be_bytes());
        field(self.time_zone.as_deref().unwrap_or_default().as_bytes());
        for unit in &self.requested_units {
            field(unit.as_bytes());
        }
        field(&(self.page_size.unwrap_or(0) as u64).to_be_bytes());

        *hasher.finalize().as_bytes()
    }
}

/// How the planner turns partitions into a row sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionMode {
    /// One partition addressed by label and version-date
    Exact,
    /// Newest version-date of a label with data in the window
    Latest,
    /// Per cell, the newest version-date with a non-null value
    MaxVersion,
    /// Per cell, the maximum over every version of the series
    MaxAggregate,
    /// The series' only partition, which has no version-date
    Unversioned,
}

impl VersionMode {
    /// Mode implied by the query's selectors
    ///
    /// `MaxAggregate` may still narrow to `Unversioned` once the series'
    /// partitions are known.
    pub fn for_query(query: &RetrievalQuery) -> Result<Self> {
        match (&query.version, query.version_date, query.max_version) {
            (_, Some(_), true) => Err(Error::invalid_argument(
                "version-date and max-version cannot both be set",
            )),
            (None, Some(_), false) => Err(Error::invalid_argument(
                "version-date requires a version label",
            )),
            (Some(_), Some(_), false) => Ok(VersionMode::Exact),
            (_, None, true) => Ok(VersionMode::MaxVersion),
            (Some(_), None, false) => Ok(VersionMode::Latest),
            (None, None, false) => Ok(VersionMode::MaxAggregate),
        }
    }
}
