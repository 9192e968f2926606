//! Configuration management and validation.
//!
//! Provides configuration structures for the decoder, the instance store,
//! the retrieval planner and the unit table, loaded from TOML with
//! environment overrides for deployment secrets.

use crate::app::services::unit_converter::UnitDefinition;
use crate::constants::{
    DEFAULT_FIELD_DELIMITER, DEFAULT_LOCK_STRIPES, DEFAULT_MAX_PAGE_SIZE,
    DEFAULT_MAX_RECORDED_ERRORS, DEFAULT_PAGE_SIZE, DEFAULT_RECORD_DELIMITER, DEFAULT_TIME_ZONE,
    ENV_CURSOR_SECRET, ENV_PAGE_SIZE,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Decoder defaults applied when a recipe omits delimiters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DecoderConfig {
    /// Record delimiter for indexed recipes
    pub record_delimiter: String,

    /// Field delimiter for indexed recipes
    pub field_delimiter: String,

    /// Cap on per-row error messages kept in decode statistics
    pub max_recorded_errors: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            record_delimiter: DEFAULT_RECORD_DELIMITER.to_string(),
            field_delimiter: DEFAULT_FIELD_DELIMITER.to_string(),
            max_recorded_errors: DEFAULT_MAX_RECORDED_ERRORS,
        }
    }
}

/// Retrieval planner settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RetrievalConfig {
    /// Page size used when a query leaves it unset
    pub default_page_size: usize,

    /// Largest page size a query may request
    pub max_page_size: usize,

    /// Presentation zone used when a query leaves it unset
    pub default_time_zone: String,

    /// Secret mixed into the cursor signing key
    pub cursor_secret: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            default_time_zone: DEFAULT_TIME_ZONE.to_string(),
            cursor_secret: String::from("hydroprofile-development-secret"),
        }
    }
}

/// Instance store settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StoreConfig {
    /// Number of stripes in the per-key lock table
    pub lock_stripes: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            lock_stripes: DEFAULT_LOCK_STRIPES,
        }
    }
}

/// Additional unit definitions merged into the built-in table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UnitsConfig {
    pub extra: Vec<UnitDefinition>,
}

/// Global configuration for profile processing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub decoder: DecoderConfig,
    pub retrieval: RetrievalConfig,
    pub store: StoreConfig,
    pub units: UnitsConfig,
}

impl Config {
    /// Parse configuration from a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file and apply environment overrides
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::io(format!("Failed to read config {}", path.display()), e)
        })?;
        let config = Self::from_toml_str(&content)?.apply_env_overrides()?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Apply `HYDROPROFILE_*` environment overrides
    pub fn apply_env_overrides(self) -> Result<Self> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = lookup(ENV_CURSOR_SECRET) {
            debug!("Cursor secret overridden from {}", ENV_CURSOR_SECRET);
            self.retrieval.cursor_secret = secret;
        }

        if let Some(raw) = lookup(ENV_PAGE_SIZE) {
            let page_size = raw.trim().parse::<usize>().map_err(|_| {
                Error::configuration(format!("{} must be a positive integer, got '{}'", ENV_PAGE_SIZE, raw))
            })?;
            self.retrieval.default_page_size = page_size;
        }

        self.validate()?;
        Ok(self)
    }

    /// Set the default page size
    pub fn with_default_page_size(mut self, page_size: usize) -> Self {
        self.retrieval.default_page_size = page_size;
        self
    }

    /// Set the maximum page size
    pub fn with_max_page_size(mut self, max_page_size: usize) -> Self {
        self.retrieval.max_page_size = max_page_size;
        self
    }

    /// Set the default presentation time zone
    pub fn with_default_time_zone(mut self, zone: impl Into<String>) -> Self {
        self.retrieval.default_time_zone = zone.into();
        self
    }

    /// Set the cursor signing secret
    pub fn with_cursor_secret(mut self, secret: impl Into<String>) -> Self {
        self.retrieval.cursor_secret = secret.into();
        self
    }

    /// Set the lock stripe count
    pub fn with_lock_stripes(mut self, stripes: usize) -> Self {
        self.store.lock_stripes = stripes;
        self
    }

    /// Register an additional unit
    pub fn with_extra_unit(mut self, unit: UnitDefinition) -> Self {
        self.units.extra.push(unit);
        self
    }

    /// Validate cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.decoder.record_delimiter.is_empty() || self.decoder.field_delimiter.is_empty() {
            return Err(Error::configuration("Decoder delimiters cannot be empty"));
        }
        if self.decoder.record_delimiter == self.decoder.field_delimiter {
            return Err(Error::configuration(
                "Decoder record and field delimiters must differ",
            ));
        }

        let retrieval = &self.retrieval;
        if retrieval.max_page_size == 0 {
            return Err(Error::configuration("max-page-size must be at least 1"));
        }
        if retrieval.default_page_size == 0 || retrieval.default_page_size > retrieval.max_page_size {
            return Err(Error::configuration(format!(
                "default-page-size must be between 1 and {}, got {}",
                retrieval.max_page_size, retrieval.default_page_size
            )));
        }
        if retrieval.default_time_zone.parse::<chrono_tz::Tz>().is_err()
            && !retrieval.default_time_zone.eq_ignore_ascii_case("UTC")
        {
            return Err(Error::configuration(format!(
                "Unknown default time zone '{}'",
                retrieval.default_time_zone
            )));
        }
        if retrieval.cursor_secret.is_empty() {
            return Err(Error::configuration("cursor-secret cannot be empty"));
        }

        if self.store.lock_stripes == 0 {
            return Err(Error::configuration("lock-stripes must be at least 1"));
        }

        for unit in &self.units.extra {
            unit.validate().map_err(|e| Error::configuration(e.to_string()))?;
        }

        Ok(())
    }
}
