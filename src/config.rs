//! Plant configuration parameters
//!
//! Static characteristics of the boiler the controller is attached to.
//! The controller core trusts this record as given; [`PlantConfiguration::validate`]
//! is run by the loaders (CLI, [`Controller::try_new`](crate::fsm::Controller::try_new))
//! before a record is handed over.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Upper bound on the number of pumps a plant may declare.
/// Sizes the controller's fixed-capacity pump bitsets.
pub const MAX_PUMPS: usize = 8;

/// Default cycle period in seconds.
pub const DEFAULT_CYCLE_PERIOD_SECS: f64 = 5.0;

/// Immutable boiler characteristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantConfiguration {
    // --- Vessel ---
    /// Total capacity of the boiler (level units).
    pub capacity: f64,

    // --- Level thresholds ---
    /// Lower limit M1; a predicted level at or below it forces an emergency stop.
    pub minimal_limit_level: f64,
    /// Upper limit M2; a predicted level at or above it forces an emergency stop.
    pub maximal_limit_level: f64,
    /// Lower edge N1 of the normal band.
    pub minimal_normal_level: f64,
    /// Upper edge N2 of the normal band.
    pub maximal_normal_level: f64,

    // --- Pumps ---
    /// Throughput of each pump (level units per second), indexed by pump.
    pub pump_capacities: Vec<f64>,

    // --- Steam ---
    /// Maximum steam output rate (level units per second).
    pub maximal_steam_rate: f64,

    // --- Timing ---
    /// Cycle period in seconds; the horizon of every level estimate.
    #[serde(default = "default_cycle_period")]
    pub cycle_period_secs: f64,
}

fn default_cycle_period() -> f64 {
    DEFAULT_CYCLE_PERIOD_SECS
}

impl Default for PlantConfiguration {
    fn default() -> Self {
        Self {
            // Vessel
            capacity: 1000.0,

            // Thresholds
            minimal_limit_level: 100.0,
            maximal_limit_level: 900.0,
            minimal_normal_level: 200.0,
            maximal_normal_level: 800.0,

            // Pumps
            pump_capacities: vec![10.0; 4],

            // Steam
            maximal_steam_rate: 10.0,

            // Timing
            cycle_period_secs: DEFAULT_CYCLE_PERIOD_SECS,
        }
    }
}

impl PlantConfiguration {
    /// Number of pumps fitted to the plant.
    pub fn pump_count(&self) -> usize {
        self.pump_capacities.len()
    }

    /// Capacity of pump `index`, or `None` if the plant has no such pump.
    pub fn pump_capacity(&self, index: usize) -> Option<f64> {
        self.pump_capacities.get(index).copied()
    }

    /// Midpoint of the normal band.
    pub fn normal_midpoint(&self) -> f64 {
        (self.minimal_normal_level + self.maximal_normal_level) / 2.0
    }

    /// Check every field against its physically meaningful range.
    ///
    /// Rejects rather than clamps: a record that fails here must never
    /// reach the controller.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            self.capacity,
            self.minimal_limit_level,
            self.maximal_limit_level,
            self.minimal_normal_level,
            self.maximal_normal_level,
            self.maximal_steam_rate,
            self.cycle_period_secs,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::ValidationFailed("all values must be finite"));
        }
        if self.capacity <= 0.0 {
            return Err(ConfigError::ValidationFailed("capacity must be positive"));
        }
        if self.minimal_limit_level < 0.0 {
            return Err(ConfigError::ValidationFailed(
                "minimal_limit_level must not be negative",
            ));
        }
        if self.minimal_limit_level >= self.minimal_normal_level {
            return Err(ConfigError::ValidationFailed(
                "minimal_limit_level must be below minimal_normal_level",
            ));
        }
        if self.minimal_normal_level >= self.maximal_normal_level {
            return Err(ConfigError::ValidationFailed(
                "minimal_normal_level must be below maximal_normal_level",
            ));
        }
        if self.maximal_normal_level >= self.maximal_limit_level {
            return Err(ConfigError::ValidationFailed(
                "maximal_normal_level must be below maximal_limit_level",
            ));
        }
        if self.maximal_limit_level > self.capacity {
            return Err(ConfigError::ValidationFailed(
                "maximal_limit_level must not exceed capacity",
            ));
        }
        if self.pump_capacities.is_empty() || self.pump_capacities.len() > MAX_PUMPS {
            return Err(ConfigError::ValidationFailed(
                "pump count must be between 1 and MAX_PUMPS",
            ));
        }
        if self
            .pump_capacities
            .iter()
            .any(|c| !c.is_finite() || *c <= 0.0)
        {
            return Err(ConfigError::ValidationFailed(
                "pump capacities must be positive",
            ));
        }
        if self.maximal_steam_rate <= 0.0 {
            return Err(ConfigError::ValidationFailed(
                "maximal_steam_rate must be positive",
            ));
        }
        if self.cycle_period_secs <= 0.0 {
            return Err(ConfigError::ValidationFailed(
                "cycle_period_secs must be positive",
            ));
        }
        Ok(())
    }
}
