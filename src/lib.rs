//! hydroprofile library
//!
//! Decoding and versioned retrieval of hydrologic time series profiles.
//!
//! A *profile* groups several parameters (depth, water temperature, dissolved
//! oxygen, ...) that share one timestamp axis at a location. This library provides:
//! - A registry of declarative parser recipes (indexed or fixed-width columnar)
//! - Decoding of raw text extracts into per-timestamp, multi-parameter rows
//! - A versioned instance store with replace/merge rules and point protection
//! - Version selection and cross-version aggregation for retrieval
//! - Windowed, cursor-paginated retrieval with unit conversion

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod aggregation;
        pub mod catalog_mask;
        pub mod instance_store;
        pub mod parser_registry;
        pub mod profile_decoder;
        pub mod profile_ingest;
        pub mod profile_registry;
        pub mod retrieval_planner;
        pub mod unit_converter;
    }
    pub mod adapters {
        pub mod location_catalog;
        pub mod memory_store;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{
    ColumnSpec, DecodedRow, Instance, LocationId, ParameterInfo, ParserDefinition, Profile,
    ProfileInstanceKey, TimeSpec,
};
pub use config::Config;

/// Result type alias for profile operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for profile decoding, storage and retrieval
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Requested entity does not exist
    #[error("Not found: {what}")]
    NotFound { what: String },

    /// Entity exists and the caller asked to fail in that case
    #[error("Already exists: {what}")]
    AlreadyExists { what: String },

    /// Request is invalid before any data is consulted
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Record is structurally too short for the recipe
    #[error("Malformed record {record}: {message}")]
    MalformedRecord { record: usize, message: String },

    /// Record content does not match the recipe's time format or zone
    #[error("Record {record} does not match parser definition: {message}")]
    DefinitionMismatch { record: usize, message: String },

    /// Decode produced no usable rows
    #[error("No rows decoded: {message}")]
    EmptyResult { message: String },

    /// Write would modify protected points without override
    #[error("Protected data conflict on {key}: {protected_points} protected point(s) would be modified")]
    ProtectedDataConflict {
        key: String,
        protected_points: usize,
    },

    /// Unit name is not registered with the converter
    #[error("Unknown unit: '{unit}'")]
    UnknownUnit { unit: String },

    /// Units are registered but measure different quantities
    #[error("Incompatible units: cannot convert '{from}' to '{to}'")]
    IncompatibleUnits { from: String, to: String },

    /// Pagination cursor is garbled, forged, or belongs to another query
    #[error("Invalid page cursor: {reason}")]
    InvalidCursor { reason: String },

    /// Location is not known to the catalog collaborator
    #[error("Unknown location: {office}/{location}")]
    UnknownLocation { office: String, location: String },

    /// A collaborator (catalog, persistence) could not serve the request
    #[error("Upstream unavailable: {message}")]
    UpstreamUnavailable { message: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Document (de)serialization failed
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl Error {
    /// Create a not found error
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Create an already exists error
    pub fn already_exists(what: impl Into<String>) -> Self {
        Self::AlreadyExists { what: what.into() }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a malformed record error
    pub fn malformed_record(record: usize, message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            record,
            message: message.into(),
        }
    }

    /// Create a definition mismatch error
    pub fn definition_mismatch(record: usize, message: impl Into<String>) -> Self {
        Self::DefinitionMismatch {
            record,
            message: message.into(),
        }
    }

    /// Create an empty result error
    pub fn empty_result(message: impl Into<String>) -> Self {
        Self::EmptyResult {
            message: message.into(),
        }
    }

    /// Create a protected data conflict error
    pub fn protected_data_conflict(key: impl Into<String>, protected_points: usize) -> Self {
        Self::ProtectedDataConflict {
            key: key.into(),
            protected_points,
        }
    }

    /// Create an unknown unit error
    pub fn unknown_unit(unit: impl Into<String>) -> Self {
        Self::UnknownUnit { unit: unit.into() }
    }

    /// Create an incompatible units error
    pub fn incompatible_units(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::IncompatibleUnits {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Create an invalid cursor error
    pub fn invalid_cursor(reason: impl Into<String>) -> Self {
        Self::InvalidCursor {
            reason: reason.into(),
        }
    }

    /// Create an unknown location error
    pub fn unknown_location(office: impl Into<String>, location: impl Into<String>) -> Self {
        Self::UnknownLocation {
            office: office.into(),
            location: location.into(),
        }
    }

    /// Create an upstream unavailable error
    pub fn upstream_unavailable(message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Per-row decode failures are counted and skipped rather than aborting a batch
    pub fn is_row_level(&self) -> bool {
        matches!(
            self,
            Error::MalformedRecord { .. } | Error::DefinitionMismatch { .. }
        )
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Error::NotFound { .. } => "not_found",
            Error::AlreadyExists { .. } => "already_exists",
            Error::InvalidArgument { .. } => "invalid_argument",
            Error::MalformedRecord { .. } => "malformed_record",
            Error::DefinitionMismatch { .. } => "definition_mismatch",
            Error::EmptyResult { .. } => "empty_result",
            Error::ProtectedDataConflict { .. } => "protected_data_conflict",
            Error::UnknownUnit { .. } => "unknown_unit",
            Error::IncompatibleUnits { .. } => "incompatible_units",
            Error::InvalidCursor { .. } => "invalid_cursor",
            Error::UnknownLocation { .. } => "unknown_location",
            Error::UpstreamUnavailable { .. } => "upstream_unavailable",
            Error::Configuration { .. } => "configuration",
            Error::Io { .. } => "io",
            Error::Serialization { .. } => "serialization",
        }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            message: error.to_string(),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Self::Configuration {
            message: format!("Invalid TOML: {}", error),
        }
    }
}
