//! Application constants for hydroprofile
//!
//! This module contains default values, format tokens and limits used
//! throughout the decoder, store and retrieval planner.

// =============================================================================
// Decoder Defaults
// =============================================================================

/// Default record delimiter for indexed profile text
pub const DEFAULT_RECORD_DELIMITER: &str = "\n";

/// Default field delimiter for indexed profile text
pub const DEFAULT_FIELD_DELIMITER: &str = ",";

/// Maximum number of per-row error messages retained in decode statistics
pub const DEFAULT_MAX_RECORDED_ERRORS: usize = 100;

/// Time format spellings that denote seconds since the Unix epoch
pub const EPOCH_SECONDS_FORMATS: &[&str] = &["%s", "EPOCH", "EPOCH_SECONDS"];

/// Time format spellings that denote milliseconds since the Unix epoch
pub const EPOCH_MILLIS_FORMATS: &[&str] = &["EPOCH_MILLIS", "EPOCH_MS"];

/// Oracle-style time format tokens and their chrono equivalents.
///
/// Longest tokens first so `HH24` wins over `HH` and `YYYY` over `YY`.
pub const ORACLE_FORMAT_TOKENS: &[(&str, &str)] = &[
    ("YYYY", "%Y"),
    ("HH24", "%H"),
    ("HH12", "%I"),
    ("MON", "%b"),
    ("FF3", "%3f"),
    ("FF", "%f"),
    ("YY", "%y"),
    ("MM", "%m"),
    ("DD", "%d"),
    ("HH", "%H"),
    ("MI", "%M"),
    ("SS", "%S"),
    ("AM", "%p"),
    ("PM", "%p"),
];

// =============================================================================
// Retrieval Defaults
// =============================================================================

/// Default number of rows per retrieval page
pub const DEFAULT_PAGE_SIZE: usize = 500;

/// Upper bound on rows per retrieval page
pub const DEFAULT_MAX_PAGE_SIZE: usize = 10_000;

/// Default presentation time zone for retrieval results
pub const DEFAULT_TIME_ZONE: &str = "UTC";

/// Context string for deriving the cursor signing key
pub const CURSOR_KEY_CONTEXT: &str = "hydroprofile 2024 page-cursor signing key v1";

/// Cursor format version embedded in every token
pub const CURSOR_VERSION: u8 = 1;

// =============================================================================
// Store Defaults
// =============================================================================

/// Number of lock stripes in the per-key lock table
pub const DEFAULT_LOCK_STRIPES: usize = 64;

/// Partition keys fetched per step when listing instances
pub const PARTITION_SCAN_BATCH: usize = 256;

/// Store rule names accepted on the wire
pub mod store_rules {
    pub const REPLACE_ALL: &str = "REPLACE_ALL";
    pub const MERGE: &str = "MERGE";
    pub const DO_NOT_REPLACE: &str = "DO_NOT_REPLACE";
    pub const REPLACE_MISSING_VALUES_ONLY: &str = "REPLACE_MISSING_VALUES_ONLY";
    pub const REPLACE_WITH_NON_MISSING: &str = "REPLACE_WITH_NON_MISSING";
}

// =============================================================================
// Environment Overrides
// =============================================================================

/// Environment variable overriding the cursor signing secret
pub const ENV_CURSOR_SECRET: &str = "HYDROPROFILE_CURSOR_SECRET";

/// Environment variable overriding the default page size
pub const ENV_PAGE_SIZE: &str = "HYDROPROFILE_PAGE_SIZE";
