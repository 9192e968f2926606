//! Decode statistics and result structures
//!
//! This module provides types for tracking skipped rows and null cells
//! while decoding profile text.

use crate::app::models::DecodedRow;
use serde::{Deserialize, Serialize};

/// Decode result with rows in source order and statistics
#[derive(Debug, Clone, Serialize)]
pub struct DecodeResult {
    /// Decoded rows in source record order
    pub rows: Vec<DecodedRow>,

    /// Decode statistics
    pub stats: DecodeStats,
}

/// Decode statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DecodeStats {
    /// Non-blank records encountered
    pub total_records: usize,

    /// Rows successfully decoded
    pub rows_decoded: usize,

    /// Rows skipped because the timestamp could not be read
    pub rows_skipped: usize,

    /// Parameter cells recorded as null
    pub null_values: usize,

    /// Row-level error messages, capped by configuration
    pub errors: Vec<String>,
}

impl DecodeStats {
    /// Create new empty statistics
    pub fn new() -> Self {
        Self {
            total_records: 0,
            rows_decoded: 0,
            rows_skipped: 0,
            null_values: 0,
            errors: Vec::new(),
        }
    }

    /// Record a skipped row, keeping at most `cap` messages
    pub fn record_skip(&mut self, message: String, cap: usize) {
        self.rows_skipped += 1;
        if self.errors.len() < cap {
            self.errors.push(message);
        }
    }

    /// Calculate success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_records == 0 {
            0.0
        } else {
            (self.rows_decoded as f64 / self.total_records as f64) * 100.0
        }
    }

    /// True when at least one record was skipped
    pub fn has_skips(&self) -> bool {
        self.rows_skipped > 0
    }
}

impl Default for DecodeStats {
    fn default() -> Self {
        Self::new()
    }
}
