//! Unit definitions and the built-in unit table
//!
//! Every unit converts linearly to its dimension's base unit:
//! `base = value * factor + offset`.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A unit and its linear relation to the dimension's base unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UnitDefinition {
    pub name: String,
    pub dimension: String,
    pub factor: f64,
    #[serde(default)]
    pub offset: f64,
}

impl UnitDefinition {
    pub fn new(name: &str, dimension: &str, factor: f64, offset: f64) -> Self {
        Self {
            name: name.to_string(),
            dimension: dimension.to_string(),
            factor,
            offset,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() || self.dimension.trim().is_empty() {
            return Err(Error::invalid_argument(
                "Unit name and dimension cannot be empty",
            ));
        }
        if !self.factor.is_finite() || self.factor == 0.0 || !self.offset.is_finite() {
            return Err(Error::invalid_argument(format!(
                "Unit '{}' needs a finite, non-zero factor and a finite offset",
                self.name
            )));
        }
        Ok(())
    }

    pub fn to_base(&self, value: f64) -> f64 {
        value * self.factor + self.offset
    }

    pub fn from_base(&self, value: f64) -> f64 {
        (value - self.offset) / self.factor
    }
}

pub mod dimensions {
    pub const LENGTH: &str = "length";
    pub const TEMPERATURE: &str = "temperature";
    pub const PRESSURE: &str = "pressure";
    pub const FLOW: &str = "flow";
    pub const VELOCITY: &str = "velocity";
    pub const VOLUME: &str = "volume";
    pub const CONCENTRATION: &str = "concentration";
    pub const CONDUCTIVITY: &str = "conductivity";
    pub const PERCENT: &str = "percent";
}

const CUBIC_FOOT_M3: f64 = 0.028_316_846_592;
const ACRE_FOOT_M3: f64 = 1_233.481_837_547_52;

/// (name, dimension, factor, offset)
const BUILTIN_UNITS: &[(&str, &str, f64, f64)] = &[
    // Length, base metre
    ("m", dimensions::LENGTH, 1.0, 0.0),
    ("cm", dimensions::LENGTH, 0.01, 0.0),
    ("mm", dimensions::LENGTH, 0.001, 0.0),
    ("km", dimensions::LENGTH, 1000.0, 0.0),
    ("ft", dimensions::LENGTH, 0.3048, 0.0),
    ("in", dimensions::LENGTH, 0.0254, 0.0),
    ("mi", dimensions::LENGTH, 1609.344, 0.0),
    // Temperature, base degree Celsius
    ("C", dimensions::TEMPERATURE, 1.0, 0.0),
    ("degC", dimensions::TEMPERATURE, 1.0, 0.0),
    ("F", dimensions::TEMPERATURE, 5.0 / 9.0, -32.0 * 5.0 / 9.0),
    ("degF", dimensions::TEMPERATURE, 5.0 / 9.0, -32.0 * 5.0 / 9.0),
    ("K", dimensions::TEMPERATURE, 1.0, -273.15),
    // Pressure, base kilopascal
    ("kPa", dimensions::PRESSURE, 1.0, 0.0),
    ("Pa", dimensions::PRESSURE, 0.001, 0.0),
    ("hPa", dimensions::PRESSURE, 0.1, 0.0),
    ("mb", dimensions::PRESSURE, 0.1, 0.0),
    ("mbar", dimensions::PRESSURE, 0.1, 0.0),
    ("bar", dimensions::PRESSURE, 100.0, 0.0),
    ("atm", dimensions::PRESSURE, 101.325, 0.0),
    ("psi", dimensions::PRESSURE, 6.894_757_293_168, 0.0),
    ("in-hg", dimensions::PRESSURE, 3.386_389, 0.0),
    ("mm-hg", dimensions::PRESSURE, 0.133_322_387_415, 0.0),
    // Flow, base cubic metre per second
    ("cms", dimensions::FLOW, 1.0, 0.0),
    ("cfs", dimensions::FLOW, CUBIC_FOOT_M3, 0.0),
    ("kcfs", dimensions::FLOW, CUBIC_FOOT_M3 * 1000.0, 0.0),
    ("gpm", dimensions::FLOW, 0.000_063_090_196_4, 0.0),
    ("mgd", dimensions::FLOW, 0.043_812_636_4, 0.0),
    // Velocity, base metre per second
    ("m/s", dimensions::VELOCITY, 1.0, 0.0),
    ("ft/s", dimensions::VELOCITY, 0.3048, 0.0),
    ("mph", dimensions::VELOCITY, 0.44704, 0.0),
    ("kph", dimensions::VELOCITY, 1000.0 / 3600.0, 0.0),
    ("knot", dimensions::VELOCITY, 1852.0 / 3600.0, 0.0),
    // Volume, base cubic metre
    ("m3", dimensions::VOLUME, 1.0, 0.0),
    ("L", dimensions::VOLUME, 0.001, 0.0),
    ("ft3", dimensions::VOLUME, CUBIC_FOOT_M3, 0.0),
    ("gal", dimensions::VOLUME, 0.003_785_411_784, 0.0),
    ("ac-ft", dimensions::VOLUME, ACRE_FOOT_M3, 0.0),
    ("kaf", dimensions::VOLUME, ACRE_FOOT_M3 * 1000.0, 0.0),
    // Concentration, base milligram per litre
    ("mg/l", dimensions::CONCENTRATION, 1.0, 0.0),
    ("ppm", dimensions::CONCENTRATION, 1.0, 0.0),
    ("g/l", dimensions::CONCENTRATION, 1000.0, 0.0),
    ("ug/l", dimensions::CONCENTRATION, 0.001, 0.0),
    ("ppb", dimensions::CONCENTRATION, 0.001, 0.0),
    // Conductivity, base micromho per centimetre
    ("umho/cm", dimensions::CONDUCTIVITY, 1.0, 0.0),
    ("uS/cm", dimensions::CONDUCTIVITY, 1.0, 0.0),
    ("mS/cm", dimensions::CONDUCTIVITY, 1000.0, 0.0),
    ("S/m", dimensions::CONDUCTIVITY, 10_000.0, 0.0),
    // Dimensionless, base percent
    ("%", dimensions::PERCENT, 1.0, 0.0),
    ("fraction", dimensions::PERCENT, 100.0, 0.0),
];

/// The built-in unit table
pub fn builtin_units() -> Vec<UnitDefinition> {
    BUILTIN_UNITS
        .iter()
        .map(|&(name, dimension, factor, offset)| UnitDefinition::new(name, dimension, factor, offset))
        .collect()
}
