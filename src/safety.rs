//! Failure detector.
//!
//! Every check here reads the cycle's [`SensorSnapshot`] and reacts to
//! what it finds by raising a [`Failure`] on the context: the failure is
//! logged, its notification is appended to the outgoing mailbox and the
//! mode it forces is requested.  Checks never short-circuit each other;
//! several failures found in one cycle each emit their own notification.
//!
//! ## Check families
//!
//! | Check                    | Runs in            | Forces            |
//! |--------------------------|--------------------|-------------------|
//! | [`check_transmission`]   | every cycle, first | EMERGENCY_STOP    |
//! | [`check_initialisation`] | WAITING            | ES / DEGRADED     |
//! | [`check_runtime`]        | NORMAL             | DEGRADED / RESCUE |
//! | [`check_level_sensor`]   | NORMAL, DEGRADED   | RESCUE            |
//! | [`check_predictive`]     | NORMAL, DEGRADED, RESCUE | EMERGENCY_STOP |

use log::debug;

use crate::config::PlantConfiguration;
use crate::control::estimator::LevelBounds;
use crate::error::{Failure, TransmissionFault};
use crate::fsm::Mode;
use crate::fsm::context::{FsmContext, SensorSnapshot};
use crate::sensors::Reading;

/// Verify the cycle carries every mandatory signal.
///
/// Returns the unique level and steam readings on success.  Pump arrays
/// must hold exactly one entry per configured pump.
pub fn check_transmission(
    config: &PlantConfiguration,
    snapshot: &SensorSnapshot,
) -> Result<(Reading, Reading), TransmissionFault> {
    let level = snapshot.level.ok_or(TransmissionFault::LevelMissing)?;
    let steam = snapshot.steam.ok_or(TransmissionFault::SteamMissing)?;

    let expected = config.pump_count();
    let got = snapshot.pump_states.len();
    if got != expected {
        return Err(TransmissionFault::PumpStateCount { expected, got });
    }
    let got = snapshot.pump_control_states.len();
    if got != expected {
        return Err(TransmissionFault::PumpControlStateCount { expected, got });
    }

    Ok((level, steam))
}

// ── Initialisation ─────────────────────────────────────────────

/// Sanity checks run on every WAITING cycle.
pub fn check_initialisation(ctx: &mut FsmContext) {
    let config = ctx.config;

    // ── Level sensor ──────────────────────────────────────────
    if ctx.level.failed_or_exceeds(config.capacity) {
        ctx.raise(Failure::LevelSensor, Mode::EmergencyStop);
    }

    // Pump 0 is filling yet the vessel reads empty, or it is idle and
    // the sensor is stuck at saturation.
    let sensed = ctx.sensors.pump_state(0);
    let control = ctx.sensors.pump_control_states.first().copied();
    if sensed == Some(true) && control == Some(true) && ctx.level.is(0.0) {
        ctx.raise(Failure::LevelSensor, Mode::EmergencyStop);
    }
    if sensed == Some(false) && control == Some(false) && ctx.level.is(100.0) {
        ctx.raise(Failure::LevelSensor, Mode::EmergencyStop);
    }

    // ── Pump controllers ──────────────────────────────────────
    check_pump_controllers(ctx);

    // ── Steam sensor ──────────────────────────────────────────
    check_steam_range(ctx);
}

// ── Runtime ────────────────────────────────────────────────────

/// Failure checks run after the pump policy on every NORMAL cycle.
///
/// Pump comparisons use the commands as they stood at the start of the
/// cycle: that is what the sensed states respond to.
pub fn check_runtime(ctx: &mut FsmContext) {
    // ── Pump 0 ignored an open command ────────────────────────
    if ctx.start.is_pump_open(0)
        && ctx.sensors.pump_state(0) == Some(false)
        && !ctx.start.lower_mid_pump_open
        && !ctx.state.degraded_steam
    {
        ctx.detect(Failure::Pump(0));
    }

    // ── Pump controllers ──────────────────────────────────────
    check_pump_controllers(ctx);

    // ── Steam sensor ──────────────────────────────────────────
    check_steam_range(ctx);
    if ctx.steam.is(0.0) && ctx.start.is_pump_open(1) {
        ctx.state.degraded_steam = true;
        ctx.detect(Failure::SteamSensor);
    }

    // ── Level sensor ──────────────────────────────────────────
    check_level_sensor(ctx);
}

/// Level reading failed or above the upper limit: the sensor is suspect.
pub fn check_level_sensor(ctx: &mut FsmContext) {
    if ctx.level.failed_or_exceeds(ctx.config.maximal_limit_level) {
        ctx.detect(Failure::LevelSensor);
    }
}

/// Estimated bounds reach a limit threshold: stop before it is crossed.
pub fn check_predictive(ctx: &mut FsmContext, bounds: LevelBounds) {
    if bounds.breaches_limits(ctx.config) {
        debug!(
            "predicted level [{:.1}, {:.1}] against limits [{:.1}, {:.1}]",
            bounds.min,
            bounds.max,
            ctx.config.minimal_limit_level,
            ctx.config.maximal_limit_level
        );
        ctx.detect(Failure::PredictiveBreach);
    }
}

// ── Internal ───────────────────────────────────────────────────

/// One notification per pump whose sensed state disagrees with its
/// controller.
fn check_pump_controllers(ctx: &mut FsmContext) {
    let mismatched: Vec<usize> = ctx.sensors.pump_control_mismatches().collect();
    for pump in mismatched {
        ctx.detect(Failure::PumpControl(pump));
    }
}

/// Steam reading failed or above the maximal rate.
fn check_steam_range(ctx: &mut FsmContext) {
    if ctx.steam.failed_or_exceeds(ctx.config.maximal_steam_rate) {
        ctx.state.degraded_steam = true;
        ctx.state.steam_error = true;
        ctx.detect(Failure::SteamSensor);
    }
}
