//! Retrieval results

use serde::{Deserialize, Serialize};

use super::query::VersionMode;
use crate::app::models::ProfileInstanceKey;

/// One returned row, with its timestamp rendered in the query's zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResultRow {
    /// Epoch milliseconds
    pub timestamp: i64,
    /// RFC 3339 text in the presentation zone
    pub time: String,
    pub values: Vec<Option<f64>>,
}

/// One page of a resolved profile series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetrievalResult {
    pub office: String,
    pub location: String,
    pub key_parameter: String,
    pub version: Option<String>,

    pub mode: VersionMode,
    /// Partitions the rows were read from, in key order
    pub sources: Vec<ProfileInstanceKey>,

    pub time_zone: String,
    /// Unit of each value column; empty when no parser definition is registered
    pub units: Vec<String>,
    /// Parameter name of each value column; empty when no parser definition is registered
    pub parameters: Vec<String>,

    pub rows: Vec<ResultRow>,
    pub page_size: usize,

    /// Rows in the resolved sequence across all pages
    pub total_rows: usize,
    pub first_timestamp: Option<i64>,
    pub last_timestamp: Option<i64>,
    pub page_first_timestamp: Option<i64>,
    pub page_last_timestamp: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_cursor: Option<String>,
}

impl RetrievalResult {
    pub fn timestamps(&self) -> Vec<i64> {
        self.rows.iter().map(|r| r.timestamp).collect()
    }

    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }
}
