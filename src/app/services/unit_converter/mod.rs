//! Unit conversion for retrieved profile values
//!
//! Conversions go through the base unit of a dimension using each unit's
//! linear factor and offset. Units of different dimensions never convert.

use std::collections::HashMap;
use tracing::debug;

use crate::config::UnitsConfig;
use crate::{Error, Result};

pub mod units;

pub use units::{UnitDefinition, builtin_units};

/// Precomputed linear conversion between two units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearConversion {
    scale: f64,
    shift: f64,
}

impl LinearConversion {
    pub fn identity() -> Self {
        Self {
            scale: 1.0,
            shift: 0.0,
        }
    }

    pub fn apply(&self, value: f64) -> f64 {
        value * self.scale + self.shift
    }

    pub fn is_identity(&self) -> bool {
        self.scale == 1.0 && self.shift == 0.0
    }
}

/// Registry of units with linear conversions
#[derive(Debug, Clone)]
pub struct UnitConverter {
    units: HashMap<String, UnitDefinition>,
}

impl UnitConverter {
    /// Converter with the built-in unit table
    pub fn new() -> Self {
        let mut converter = Self {
            units: HashMap::new(),
        };
        for unit in builtin_units() {
            converter.units.insert(unit.name.clone(), unit);
        }
        converter
    }

    /// Converter with the built-in table plus configured units
    pub fn from_config(config: &UnitsConfig) -> Result<Self> {
        let mut converter = Self::new();
        for unit in &config.extra {
            converter.register(unit.clone())?;
        }
        Ok(converter)
    }

    /// Register or replace a unit
    pub fn register(&mut self, unit: UnitDefinition) -> Result<()> {
        unit.validate()?;
        debug!("Registered unit '{}' ({})", unit.name, unit.dimension);
        self.units.insert(unit.name.clone(), unit);
        Ok(())
    }

    /// Look up a unit by exact name, then case-insensitively
    pub fn unit(&self, name: &str) -> Result<&UnitDefinition> {
        self.units
            .get(name)
            .or_else(|| {
                self.units
                    .values()
                    .find(|u| u.name.eq_ignore_ascii_case(name))
            })
            .ok_or_else(|| Error::unknown_unit(name))
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.unit(name).is_ok()
    }

    /// Conversion from `from` to `to`
    pub fn conversion(&self, from: &str, to: &str) -> Result<LinearConversion> {
        if from == to {
            return Ok(LinearConversion::identity());
        }

        let source = self.unit(from)?;
        let target = self.unit(to)?;
        if source.dimension != target.dimension {
            return Err(Error::incompatible_units(from, to));
        }

        // to_base then from_base, folded into one linear map
        Ok(LinearConversion {
            scale: source.factor / target.factor,
            shift: (source.offset - target.offset) / target.factor,
        })
    }

    /// Convert a single value
    pub fn convert(&self, value: f64, from: &str, to: &str) -> Result<f64> {
        Ok(self.conversion(from, to)?.apply(value))
    }
}

impl Default for UnitConverter {
    fn default() -> Self {
        Self::new()
    }
}
