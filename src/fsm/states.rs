//! Concrete mode handlers.
//!
//! One `fn` per mode, selected by an exhaustive match in [`dispatch`].
//! Handlers never broadcast the mode themselves; the
//! [`Controller`](super::Controller) does that once the cycle is over.
//!
//! ```text
//!  WAITING ──[units ready]──▶ NORMAL ◀──[ack + repaired]── DEGRADED
//!     │                        │  ▲                          ▲  │
//!     │                [unit failure]                        │  │
//!     │                        └──────────────▶──────────────┘  │
//!     │                           │  [level sensor failure]     │
//!     │                           ▼                             │
//!     │                        RESCUE ──[level ack]──▶ NORMAL / DEGRADED
//!     │
//!  Any mode ──[vital loss / predicted limit breach]──▶ EMERGENCY_STOP
//! ```

use log::{debug, error, info};

use crate::control::estimator::{self, LevelBounds};
use crate::control::pump_policy::{self, Bands};
use crate::error::Failure;
use crate::mailbox::Message;
use crate::safety;

use super::Mode;
use super::context::FsmContext;

/// Run the handler for the current mode.
pub fn dispatch(ctx: &mut FsmContext) {
    let before = ctx.mode();
    match before {
        Mode::Waiting => waiting_update(ctx),
        Mode::Ready => ready_update(ctx),
        Mode::Normal => normal_update(ctx),
        Mode::Degraded => degraded_update(ctx),
        Mode::Rescue => rescue_update(ctx),
        Mode::EmergencyStop => emergency_stop_update(ctx),
    }
    if before != Mode::Rescue && ctx.mode() == Mode::Rescue {
        rescue_entry_check(ctx);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  WAITING: initialisation handshake
// ═══════════════════════════════════════════════════════════════════════════

fn waiting_update(ctx: &mut FsmContext) {
    safety::check_initialisation(ctx);

    if ctx.sensors.units_waiting {
        let config = ctx.config;

        // Steam must be quiescent before the boiler may start.
        if !ctx.steam.is(0.0) {
            halt(ctx, "steam flowing during initialisation");
        }
        if ctx.level.failed_or_exceeds(config.capacity) {
            ctx.raise(Failure::LevelSensor, Mode::EmergencyStop);
        }
        if ctx.level.exceeds(config.maximal_normal_level) {
            info!("WAITING: level above normal band, opening valve");
            ctx.send(Message::Valve);
        }
        if let Some(level) = ctx.level.value() {
            if level < config.minimal_normal_level {
                info!("WAITING: level {level:.1} below normal band, filling");
                ctx.open_pump(0);
                ctx.open_pump(1);
            }
        }
        if ctx.sensors.level_failure_ack {
            halt(ctx, "level failure acknowledged during initialisation");
        }
        if let Some(level) = ctx.level.value() {
            if level > config.minimal_normal_level && level < config.maximal_normal_level {
                ctx.send(Message::ProgramReady);
            }
        }
    }

    // Units ready: start operating unless initialisation already
    // degraded or stopped the controller this cycle.
    if ctx.sensors.units_ready && ctx.mode() == Mode::Waiting {
        ctx.transition(Mode::Normal);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  READY: declared by the protocol, never entered
// ═══════════════════════════════════════════════════════════════════════════

fn ready_update(_ctx: &mut FsmContext) {}

// ═══════════════════════════════════════════════════════════════════════════
//  NORMAL
// ═══════════════════════════════════════════════════════════════════════════

fn normal_update(ctx: &mut FsmContext) {
    // A failed level reading yields no estimate; the runtime checks
    // below move the controller to RESCUE.
    if let Some(bounds) = ctx.estimate() {
        safety::check_predictive(ctx, bounds);
        run_policy(ctx, bounds);
    }
    safety::check_runtime(ctx);
}

// ═══════════════════════════════════════════════════════════════════════════
//  DEGRADED: keep steering, wait for acknowledged repairs
// ═══════════════════════════════════════════════════════════════════════════

fn degraded_update(ctx: &mut FsmContext) {
    let bounds = ctx.estimate();
    if let Some(bounds) = bounds {
        run_policy(ctx, bounds);
    }

    // ── Pump controller repaired ──────────────────────────────
    if ctx.sensors.pump_control_failure_ack.is_some() {
        let agreeing: Vec<usize> = ctx.sensors.pump_control_matches().collect();
        for pump in agreeing {
            repaired(ctx, Message::PumpControlRepaired(pump), Mode::Normal);
        }
    }

    // ── Pump repaired ─────────────────────────────────────────
    if ctx.sensors.pump_failure_ack.is_some()
        && ctx.sensors.pump_state(0) == Some(ctx.start.is_pump_open(0))
    {
        repaired(ctx, Message::PumpRepaired(0), Mode::Normal);
    }

    // ── Steam sensor repaired ─────────────────────────────────
    if ctx.sensors.steam_failure_ack {
        let recovered = if ctx.state.steam_error {
            ctx.steam.within(ctx.config.maximal_steam_rate).is_some()
        } else {
            ctx.steam.exceeds(0.0)
        };
        if recovered {
            ctx.state.degraded_steam = false;
            ctx.state.steam_error = false;
            repaired(ctx, Message::SteamRepaired, Mode::Normal);
        }
    }

    safety::check_level_sensor(ctx);
    if let Some(bounds) = bounds {
        safety::check_predictive(ctx, bounds);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  RESCUE: level sensor down, steer on propagated bounds
// ═══════════════════════════════════════════════════════════════════════════

fn rescue_update(ctx: &mut FsmContext) {
    let config = ctx.config;

    if ctx.steam.within(config.maximal_steam_rate).is_none() {
        halt(ctx, "steam sensor unusable while level sensor is down");
        return;
    }
    let Some(previous) = ctx.state.rescue_bounds else {
        halt(ctx, "no trustworthy level to estimate from");
        return;
    };

    // Last cycle's bounds carried over the pumps and steam of that cycle.
    let current = estimator::propagate(
        config,
        previous,
        ctx.start.open_pump_count(),
        ctx.state.previous_steam,
    );
    ctx.state.rescue_bounds = Some(current);
    let next = ctx.lookahead(current);
    debug!(
        "RESCUE: level within [{:.1}, {:.1}], next [{:.1}, {:.1}]",
        current.min, current.max, next.min, next.max
    );

    safety::check_predictive(ctx, next);
    if ctx.mode().is_terminal() {
        return;
    }
    run_policy(ctx, next);

    if ctx.sensors.level_failure_ack && ctx.level.within(config.capacity).is_some() {
        let next = if ctx.state.degraded_steam {
            Mode::Degraded
        } else {
            Mode::Normal
        };
        repaired(ctx, Message::LevelRepaired, next);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  EMERGENCY_STOP: terminal
// ═══════════════════════════════════════════════════════════════════════════

fn emergency_stop_update(_ctx: &mut FsmContext) {
    debug!("EMERGENCY_STOP: holding");
}

/// The cycle the level sensor is lost still gets a predictive check.
fn rescue_entry_check(ctx: &mut FsmContext) {
    if let Some(current) = ctx.state.rescue_bounds {
        let next = ctx.lookahead(current);
        safety::check_predictive(ctx, next);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Shared helpers
// ═══════════════════════════════════════════════════════════════════════════

/// Evaluate the pump policy against `bounds` and execute it.
fn run_policy(ctx: &mut FsmContext, bounds: LevelBounds) {
    let bands = Bands::from_config(ctx.config);
    let decision = pump_policy::decide(&bands, bounds, ctx.state.is_pump_open(0));
    ctx.apply(&decision);
}

fn repaired(ctx: &mut FsmContext, notification: Message, next: Mode) {
    info!("REPAIRED: {notification:?}");
    ctx.send(notification);
    ctx.transition(next);
}

/// Emergency stop without a unit-specific notification.
fn halt(ctx: &mut FsmContext, reason: &str) {
    if !ctx.mode().is_terminal() {
        error!("{}: {reason}", ctx.mode());
    }
    ctx.transition(Mode::EmergencyStop);
}
