//! Table configuration
//!
//! Describes the bounds (`N`, `MAX`), the process-start values, the possible-unit
//! mask, and an optional load-time `capacities` parameter. Loaded from TOML:
//!
//! ```toml
//! units = 8
//! max_capacity = 1024
//! initial = 1024
//! impossible = [5]
//! capacities = "0-3:1024,4-7:512"
//! ```

use crate::controller::DEFAULT_MAX_CONFIGURATION_LEN;
use crate::error::ConfigError;
use crate::store::CapacityStore;
use serde::Deserialize;
use std::path::Path;

/// Default number of unit slots
pub const DEFAULT_UNITS: usize = 8;

/// Scheduler capacity scale
pub const DEFAULT_MAX_CAPACITY: u64 = 1024;

/// Configuration for building an [`OverrideController`](crate::OverrideController)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverrideConfig {
    /// Number of unit slots; inferred from `values` when omitted
    pub units: Option<usize>,
    /// Largest accepted capacity
    pub max_capacity: u64,
    /// Uniform process-start value (defaults to `max_capacity`)
    pub initial: Option<u64>,
    /// Explicit process-start values, one per unit
    pub values: Option<Vec<u64>>,
    /// Slots that exist but do not correspond to a real unit
    pub impossible: Vec<u32>,
    /// Read-back length limit
    pub max_configuration_len: usize,
    /// Configuration string applied right after load
    pub capacities: Option<String>,
}

impl Default for OverrideConfig {
    fn default() -> Self {
        Self {
            units: None,
            max_capacity: DEFAULT_MAX_CAPACITY,
            initial: None,
            values: None,
            impossible: Vec::new(),
            max_configuration_len: DEFAULT_MAX_CONFIGURATION_LEN,
            capacities: None,
        }
    }
}

impl OverrideConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read configuration from a TOML file
    ///
    /// # Errors
    /// - `ConfigError::Io` if the file cannot be read
    /// - `ConfigError::Toml` if it is not a valid configuration
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// `ConfigError::Toml` on syntax errors or unknown keys
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Set number of units
    #[must_use]
    pub fn with_units(mut self, units: usize) -> Self {
        self.units = Some(units);
        self
    }

    /// Set maximum capacity
    #[must_use]
    pub fn with_max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    /// Set uniform process-start value
    #[must_use]
    pub fn with_initial(mut self, initial: u64) -> Self {
        self.initial = Some(initial);
        self
    }

    /// Set explicit process-start values
    #[must_use]
    pub fn with_values(mut self, values: Vec<u64>) -> Self {
        self.values = Some(values);
        self
    }

    /// Mark slots as not possible
    #[must_use]
    pub fn with_impossible(mut self, impossible: Vec<u32>) -> Self {
        self.impossible = impossible;
        self
    }

    /// Set load-time configuration string
    #[must_use]
    pub fn with_capacities(mut self, capacities: impl Into<String>) -> Self {
        self.capacities = Some(capacities.into());
        self
    }

    /// Set read-back length limit
    #[must_use]
    pub fn with_max_configuration_len(mut self, len: usize) -> Self {
        self.max_configuration_len = len;
        self
    }

    /// Number of unit slots this configuration describes
    ///
    /// # Errors
    /// `ConfigError::Invalid` if `units` and `values` disagree
    pub fn resolved_units(&self) -> Result<usize, ConfigError> {
        match (self.units, &self.values) {
            (Some(units), Some(values)) if units != values.len() => {
                Err(ConfigError::invalid(format!(
                    "units = {units} but {} values given",
                    values.len()
                )))
            }
            (_, Some(values)) => Ok(values.len()),
            (Some(units), None) => Ok(units),
            (None, None) => Ok(DEFAULT_UNITS),
        }
    }

    /// Build the capacity store
    ///
    /// # Errors
    /// `ConfigError::Invalid` for conflicting or out-of-bounds settings
    pub fn build_store(&self) -> Result<CapacityStore, ConfigError> {
        let units = self.resolved_units()?;

        let values = match (&self.values, self.initial) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::invalid(
                    "`values` and `initial` are mutually exclusive",
                ))
            }
            (Some(values), None) => values.clone(),
            (None, initial) => vec![initial.unwrap_or(self.max_capacity); units],
        };

        let mut possible = vec![true; units];
        for &unit in &self.impossible {
            let slot = possible.get_mut(unit as usize).ok_or_else(|| {
                ConfigError::invalid(format!("impossible unit {unit} outside {units} units"))
            })?;
            *slot = false;
        }

        CapacityStore::new(values, self.max_capacity)?.with_possible(possible)
    }
}
