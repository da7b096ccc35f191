//! Simulation configuration.
//!
//! Every balancing constant lives here rather than in the algorithms that
//! consume it. Files are TOML; any omitted field takes its default.
//!
//! ```toml
//! starting_credits = 2000
//!
//! [stability]
//! pollution_threshold = 80
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Width and height of the standard city grid.
pub const GRID_SIZE: u16 = 17;

/// Largest accepted grid side.
pub const MAX_GRID_SIZE: u16 = 128;

/// Error loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid TOML for [`SimConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value is outside its allowed range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Stability model rates.
///
/// Rates are per simulated second and are scaled by
/// [`update_interval_secs`](Self::update_interval_secs) each tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityConfig {
    /// Stability of a freshly founded city.
    pub base_stability: f64,
    /// Gain per second while services cover the city.
    pub service_per_second: f64,
    /// Loss per second while population exceeds job capacity.
    pub unemployment_penalty: f64,
    /// Pollution load above which the pollution penalty applies.
    pub pollution_threshold: i64,
    /// Loss per second while pollution is above the threshold.
    pub pollution_penalty: f64,
    /// Loss per second while power demand exceeds supply.
    pub power_deficit_penalty: f64,
    /// Simulated seconds per tick.
    pub update_interval_secs: f64,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            base_stability: 100.0,
            service_per_second: 0.06,
            unemployment_penalty: 0.4,
            pollution_threshold: 60,
            pollution_penalty: 0.15,
            power_deficit_penalty: 0.6,
            update_interval_secs: 5.0,
        }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Grid width in tiles.
    pub grid_width: u16,
    /// Grid height in tiles.
    pub grid_height: u16,
    /// Credits available on day 0.
    pub starting_credits: u64,
    /// Flat road price used for road demolition refunds.
    pub road_flat_cost: u64,
    /// Share of the current level cost refunded on demolition.
    pub demolish_refund_percent: u8,
    /// Stability model rates.
    pub stability: StabilityConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            grid_width: GRID_SIZE,
            grid_height: GRID_SIZE,
            starting_credits: 1000,
            road_flat_cost: 50,
            demolish_refund_percent: 25,
            stability: StabilityConfig::default(),
        }
    }
}

impl SimConfig {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or a value is out of range.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or fails validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Check that every value is inside its allowed range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "grid must be non-empty, got {}x{}",
                self.grid_width, self.grid_height
            )));
        }
        if self.grid_width > MAX_GRID_SIZE || self.grid_height > MAX_GRID_SIZE {
            return Err(ConfigError::Invalid(format!(
                "grid sides are capped at {MAX_GRID_SIZE}, got {}x{}",
                self.grid_width, self.grid_height
            )));
        }
        if self.demolish_refund_percent > 100 {
            return Err(ConfigError::Invalid(format!(
                "demolish_refund_percent {} exceeds 100",
                self.demolish_refund_percent
            )));
        }

        let s = &self.stability;
        let rates = [
            ("base_stability", s.base_stability),
            ("service_per_second", s.service_per_second),
            ("unemployment_penalty", s.unemployment_penalty),
            ("pollution_penalty", s.pollution_penalty),
            ("power_deficit_penalty", s.power_deficit_penalty),
            ("update_interval_secs", s.update_interval_secs),
        ];
        for (name, value) in rates {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "stability.{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if s.base_stability > 100.0 {
            return Err(ConfigError::Invalid(format!(
                "stability.base_stability {} exceeds 100",
                s.base_stability
            )));
        }

        Ok(())
    }

    /// Refund for demolishing something that cost `cost`, rounded down.
    #[must_use]
    pub fn refund_for(&self, cost: u64) -> u64 {
        cost.saturating_mul(u64::from(self.demolish_refund_percent)) / 100
    }
}
