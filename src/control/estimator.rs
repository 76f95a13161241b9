//! Water level bound estimation.
//!
//! Conservative bounds on the level one cycle ahead:
//!
//! ```text
//! min = level + T·q·open − T·steam_max
//! max = level + T·q·open − T·steam
//! ```
//!
//! `T` is the cycle period, `q` the capacity of pump 0 (used for every
//! open pump), `open` the number of pumps the controller has commanded
//! open.

use crate::config::PlantConfiguration;
use crate::sensors::Reading;

/// Estimated `[min, max]` range of the level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelBounds {
    pub min: f64,
    pub max: f64,
}

impl LevelBounds {
    /// Degenerate bounds around a known level.
    pub fn exact(level: f64) -> Self {
        Self {
            min: level,
            max: level,
        }
    }

    /// True if either bound reaches a limit threshold.
    pub fn breaches_limits(&self, config: &PlantConfiguration) -> bool {
        self.min <= config.minimal_limit_level || self.max >= config.maximal_limit_level
    }
}

/// Water added by `open_pumps` pumps over one cycle.
// TODO: sum the capacities of the pumps actually open once the physical
// units report per-pump throughput; pump 0 stands in for all of them.
fn inflow(config: &PlantConfiguration, open_pumps: usize) -> f64 {
    let per_pump = config.pump_capacity(0).unwrap_or(0.0);
    config.cycle_period_secs * per_pump * open_pumps as f64
}

/// Steam rate usable for the upper bound.
///
/// A failed or out-of-range reading cannot be trusted, so the bound
/// assumes no steam leaves the boiler.
fn observed_steam(config: &PlantConfiguration, steam: Reading) -> f64 {
    steam.within(config.maximal_steam_rate).unwrap_or(0.0)
}

/// Bounds on next cycle's level from a valid current reading.
pub fn estimate(
    config: &PlantConfiguration,
    level: f64,
    open_pumps: usize,
    steam: Reading,
) -> LevelBounds {
    let period = config.cycle_period_secs;
    let filled = level + inflow(config, open_pumps);
    LevelBounds {
        min: filled - period * config.maximal_steam_rate,
        max: filled - period * observed_steam(config, steam),
    }
}

/// Advance bounds one cycle without a level reading.
///
/// Used while the level sensor is down.  Results are clamped to the
/// physical vessel.
pub fn propagate(
    config: &PlantConfiguration,
    bounds: LevelBounds,
    open_pumps: usize,
    steam: Reading,
) -> LevelBounds {
    let period = config.cycle_period_secs;
    let added = inflow(config, open_pumps);
    let min = bounds.min + added - period * config.maximal_steam_rate;
    let max = bounds.max + added - period * observed_steam(config, steam);
    LevelBounds {
        min: min.clamp(0.0, config.capacity),
        max: max.clamp(0.0, config.capacity),
    }
}
