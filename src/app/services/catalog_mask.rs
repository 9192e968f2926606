//! Wildcard masks for catalog listings
//!
//! Masks use `*` for any run of characters and `?` for exactly one, and
//! match case-insensitively. An absent mask matches everything.

use regex::{Regex, RegexBuilder};

use crate::{Error, Result};

/// Compiled case-insensitive wildcard mask
#[derive(Debug, Clone)]
pub struct WildcardMask {
    pattern: Option<Regex>,
}

impl WildcardMask {
    /// Compile a mask; `None` and `"*"` match everything
    pub fn compile(mask: Option<&str>) -> Result<Self> {
        let mask = match mask.map(str::trim) {
            None | Some("") | Some("*") => return Ok(Self::any()),
            Some(mask) => mask,
        };

        let mut expression = String::with_capacity(mask.len() + 8);
        expression.push('^');
        for c in mask.chars() {
            match c {
                '*' => expression.push_str(".*"),
                '?' => expression.push('.'),
                other => expression.push_str(&regex::escape(&other.to_string())),
            }
        }
        expression.push('$');

        let pattern = RegexBuilder::new(&expression)
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::invalid_argument(format!("Invalid mask '{}': {}", mask, e)))?;

        Ok(Self {
            pattern: Some(pattern),
        })
    }

    /// Mask matching every value
    pub fn any() -> Self {
        Self { pattern: None }
    }

    pub fn matches(&self, value: &str) -> bool {
        self.pattern.as_ref().is_none_or(|p| p.is_match(value))
    }
}

/// Masks for office, location and parameter
#[derive(Debug, Clone)]
pub struct CatalogMasks {
    pub office: WildcardMask,
    pub location: WildcardMask,
    pub parameter: WildcardMask,
}

impl CatalogMasks {
    pub fn compile(
        office: Option<&str>,
        location: Option<&str>,
        parameter: Option<&str>,
    ) -> Result<Self> {
        Ok(Self {
            office: WildcardMask::compile(office)?,
            location: WildcardMask::compile(location)?,
            parameter: WildcardMask::compile(parameter)?,
        })
    }

    pub fn matches(&self, office: &str, location: &str, parameter: &str) -> bool {
        self.office.matches(office)
            && self.location.matches(location)
            && self.parameter.matches(parameter)
    }
}
