//! Band-based pump policy.
//!
//! The normal band `[N1, N2]` is split at its midpoint and quarter points:
//!
//! ```text
//!  N1 ─── lower_mid ─── mid ─── upper_mid ─── N2
//!   │  open 2,3   │ open 1 │ close 3 │ close 2,3 │
//!  ≤N1: open 1,2,3                      ≥N2: close 1,2,3
//! ```
//!
//! Rules are evaluated in a fixed order and several may fire in one cycle;
//! the extreme rules come last so they override the mid-band ones.
//! Pumps are numbered from 1 in the rules and indexed from 0 in commands.

use crate::config::PlantConfiguration;

use super::estimator::LevelBounds;

/// A single actuator command produced by the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpCommand {
    Open(usize),
    Close(usize),
}

/// Commands for one cycle, in emission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicyDecision {
    pub commands: Vec<PumpCommand>,
    /// New value of the lower-mid flag, if a rule touched it.
    pub lower_mid_pump_open: Option<bool>,
}

/// Thresholds derived from the normal band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bands {
    pub low: f64,
    pub lower_mid: f64,
    pub mid: f64,
    pub upper_mid: f64,
    pub high: f64,
}

impl Bands {
    pub fn from_config(config: &PlantConfiguration) -> Self {
        let low = config.minimal_normal_level;
        let high = config.maximal_normal_level;
        let mid = (low + high) / 2.0;
        Self {
            low,
            lower_mid: (mid + low) / 2.0,
            mid,
            upper_mid: (mid + high) / 2.0,
            high,
        }
    }
}

/// Decide which pumps to open or close for the estimated `bounds`.
///
/// `pump0_open` is the controller's belief about pump 0 before the policy
/// runs; the lower-mid rule leaves an already open pump alone.
pub fn decide(bands: &Bands, bounds: LevelBounds, pump0_open: bool) -> PolicyDecision {
    use PumpCommand::{Close, Open};

    let LevelBounds { min, max } = bounds;
    let mut decision = PolicyDecision::default();
    let cmds = &mut decision.commands;

    // 1. Upper quarter of the band: drop the two auxiliary pumps.
    if max >= bands.upper_mid && max <= bands.high {
        cmds.extend([Close(2), Close(1)]);
    }
    // 2. Just above the midpoint: drop pump 3.
    if max >= bands.mid && max <= bands.upper_mid {
        cmds.push(Close(2));
    }
    // 3. Just below the midpoint: bring in pump 1.  Skipped while pump 1 is
    // already on, so the lower-mid flag only records openings made here.
    if !pump0_open && min >= bands.lower_mid && min <= bands.mid {
        cmds.push(Open(0));
        decision.lower_mid_pump_open = Some(true);
    }
    // 4. Lower quarter of the band: bring in pumps 2 and 3.
    if min >= bands.low && min <= bands.lower_mid {
        cmds.extend([Open(2), Open(1)]);
    }
    // 5. Above the band: everything off.
    if max >= bands.high {
        cmds.extend([Close(0), Close(1), Close(2)]);
    }
    // 6. Below the band: everything on.
    if min <= bands.low {
        cmds.extend([Open(0), Open(1), Open(2)]);
        decision.lower_mid_pump_open = Some(false);
    }

    decision
}

/// Pump states after applying `decision` to `pumps`.  Out-of-range
/// commands are ignored.
pub fn simulate(pumps: &[bool], decision: &PolicyDecision) -> Vec<bool> {
    let mut out = pumps.to_vec();
    for command in &decision.commands {
        let (index, open) = match *command {
            PumpCommand::Open(i) => (i, true),
            PumpCommand::Close(i) => (i, false),
        };
        if let Some(slot) = out.get_mut(index) {
            *slot = open;
        }
    }
    out
}
