//! State threaded through every mode handler.
//!
//! [`ControllerState`] is what persists between cycles; [`FsmContext`] is
//! the per-cycle "blackboard" that bundles it with the configuration, the
//! decoded sensor snapshot and the outgoing mailbox.  Handlers read from
//! and write to the context only.

use log::{debug, error, info, warn};

use crate::config::{MAX_PUMPS, PlantConfiguration};
use crate::control::estimator::{self, LevelBounds};
use crate::control::pump_policy::{PolicyDecision, PumpCommand};
use crate::error::Failure;
use crate::mailbox::{Mailbox, Message};
use crate::sensors::Reading;

use super::Mode;

/// One flag per pump, sized by the plant's pump count.
pub type PumpSet = heapless::Vec<bool, MAX_PUMPS>;

// ---------------------------------------------------------------------------
// Sensor snapshot (read-only to state handlers; written by the sensor hub)
// ---------------------------------------------------------------------------

/// Everything the controller consumes from one incoming mailbox.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorSnapshot {
    /// Unique LEVEL reading, if exactly one arrived.
    pub level: Option<Reading>,
    /// Unique STEAM reading, if exactly one arrived.
    pub steam: Option<Reading>,
    /// Sensed pump states, arrival order.
    pub pump_states: Vec<bool>,
    /// Pump controller states, arrival order.
    pub pump_control_states: Vec<bool>,

    /// STEAM_BOILER_WAITING present.
    pub units_waiting: bool,
    /// PHYSICAL_UNITS_READY present.
    pub units_ready: bool,

    pub level_failure_ack: bool,
    /// Pump index carried by a PUMP_FAILURE_ACKNOWLEDGEMENT.
    pub pump_failure_ack: Option<usize>,
    /// Pump index carried by a PUMP_CONTROL_FAILURE_ACKNOWLEDGEMENT.
    pub pump_control_failure_ack: Option<usize>,
    pub steam_failure_ack: bool,
}

impl SensorSnapshot {
    /// Sensed state of pump `index`.
    pub fn pump_state(&self, index: usize) -> Option<bool> {
        self.pump_states.get(index).copied()
    }

    /// Indices where the sensed state disagrees with the pump controller.
    pub fn pump_control_mismatches(&self) -> impl Iterator<Item = usize> + '_ {
        self.pump_states
            .iter()
            .zip(&self.pump_control_states)
            .enumerate()
            .filter(|(_, (sensed, control))| sensed != control)
            .map(|(i, _)| i)
    }

    /// Indices where the sensed state agrees with the pump controller.
    pub fn pump_control_matches(&self) -> impl Iterator<Item = usize> + '_ {
        self.pump_states
            .iter()
            .zip(&self.pump_control_states)
            .enumerate()
            .filter(|(_, (sensed, control))| sensed == control)
            .map(|(i, _)| i)
    }
}

// ---------------------------------------------------------------------------
// Persistent controller state
// ---------------------------------------------------------------------------

/// State that survives between cycles.  Owned by the
/// [`Controller`](super::Controller); mutated once per cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState {
    /// Current operating mode.
    pub mode: Mode,
    /// Pumps the controller has commanded open.
    pub pump_open: PumpSet,
    /// Pump 0 was last opened by the lower-mid band rule rather than the
    /// below-normal rule.
    pub lower_mid_pump_open: bool,
    /// Sticky: a steam sensor failure has been detected and not repaired.
    pub degraded_steam: bool,
    /// Sticky: that steam failure was an out-of-range reading (as opposed
    /// to zero steam while pumping).
    pub steam_error: bool,
    /// Last level reading that was valid and within the limit band.
    pub last_valid_level: Option<f64>,
    /// Steam reading of the previous configured cycle; `Failed` before
    /// the first.
    pub previous_steam: Reading,
    /// Bounds on the current level, carried while the level sensor is
    /// down.
    pub rescue_bounds: Option<LevelBounds>,
}

impl ControllerState {
    /// Fresh state: WAITING, every pump closed.
    pub fn new(pump_count: usize) -> Self {
        let mut pump_open = PumpSet::new();
        for _ in 0..pump_count.min(MAX_PUMPS) {
            // Capacity checked by the loop bound.
            let _ = pump_open.push(false);
        }
        Self {
            mode: Mode::Waiting,
            pump_open,
            lower_mid_pump_open: false,
            degraded_steam: false,
            steam_error: false,
            last_valid_level: None,
            previous_steam: Reading::Failed,
            rescue_bounds: None,
        }
    }

    /// Number of pumps the controller believes are open.
    pub fn open_pump_count(&self) -> usize {
        self.pump_open.iter().filter(|open| **open).count()
    }

    pub fn is_pump_open(&self, index: usize) -> bool {
        self.pump_open.get(index).copied().unwrap_or(false)
    }

    /// Move to `next` if the edge exists.  Returns `true` if the mode changed.
    ///
    /// EMERGENCY_STOP has no outgoing edge, so once reached every request
    /// is refused.
    pub fn enter(&mut self, next: Mode) -> bool {
        if self.mode == next {
            return false;
        }
        if !self.mode.can_transition_to(next) {
            debug!("mode transition refused: {} -> {}", self.mode, next);
            return false;
        }
        info!("mode transition: {} -> {}", self.mode, next);
        self.mode = next;
        self.on_enter(next);
        true
    }

    fn on_enter(&mut self, mode: Mode) {
        match mode {
            Mode::Normal | Mode::Degraded => {
                self.rescue_bounds = None;
            }
            Mode::EmergencyStop => {
                error!("EMERGENCY STOP: controller halted");
            }
            Mode::Waiting | Mode::Ready | Mode::Rescue => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Start-of-cycle command snapshot
// ---------------------------------------------------------------------------

/// The controller's commands as they stood when the cycle began.
///
/// Sensed pump states describe the plant's response to *these* commands,
/// not to anything decided later in the same cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSnapshot {
    pub pump_open: PumpSet,
    pub lower_mid_pump_open: bool,
}

impl CommandSnapshot {
    pub fn is_pump_open(&self, index: usize) -> bool {
        self.pump_open.get(index).copied().unwrap_or(false)
    }

    pub fn open_pump_count(&self) -> usize {
        self.pump_open.iter().filter(|open| **open).count()
    }
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The context passed to every mode handler for one cycle.
pub struct FsmContext<'a> {
    /// Plant characteristics.
    pub config: &'a PlantConfiguration,
    /// Decoded incoming signals.
    pub sensors: SensorSnapshot,
    /// Unique level reading (its presence is checked before dispatch).
    pub level: Reading,
    /// Unique steam reading (its presence is checked before dispatch).
    pub steam: Reading,
    /// Persistent state being mutated.
    pub state: &'a mut ControllerState,
    /// Commands as they stood at the start of the cycle.
    pub start: CommandSnapshot,
    outgoing: &'a mut Mailbox,
}

impl<'a> FsmContext<'a> {
    pub fn new(
        config: &'a PlantConfiguration,
        sensors: SensorSnapshot,
        level: Reading,
        steam: Reading,
        state: &'a mut ControllerState,
        outgoing: &'a mut Mailbox,
    ) -> Self {
        let start = CommandSnapshot {
            pump_open: state.pump_open.clone(),
            lower_mid_pump_open: state.lower_mid_pump_open,
        };
        Self {
            config,
            sensors,
            level,
            steam,
            state,
            start,
            outgoing,
        }
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    /// Request a mode change.  Refused edges are ignored.
    pub fn transition(&mut self, next: Mode) -> bool {
        let entered = self.state.enter(next);
        if entered && next == Mode::Rescue {
            self.seed_rescue();
        }
        entered
    }

    /// Bounds on the current level from the last trusted reading, carried
    /// over the previous cycle's pumps and steam.
    fn seed_rescue(&mut self) {
        let config = self.config;
        let open = self.start.open_pump_count();
        let steam = self.state.previous_steam;
        self.state.rescue_bounds = self
            .state
            .last_valid_level
            .map(|level| estimator::propagate(config, LevelBounds::exact(level), open, steam));
        match self.state.rescue_bounds {
            Some(b) => info!("RESCUE: tracking level from [{:.1}, {:.1}]", b.min, b.max),
            None => warn!("RESCUE: no trustworthy level to start from"),
        }
    }

    /// Record a detected failure: log it, notify the physical units and
    /// move to `mode`.
    pub fn raise(&mut self, failure: Failure, mode: Mode) {
        if mode == Mode::EmergencyStop {
            error!("FAILURE DETECTED: {failure}");
        } else {
            warn!("FAILURE DETECTED: {failure}");
        }
        if let Some(notification) = failure.notification() {
            self.outgoing.send(notification);
        }
        self.transition(mode);
    }

    /// Raise `failure` with the mode it forces during operation.
    pub fn detect(&mut self, failure: Failure) {
        self.raise(failure, failure.forced_mode());
    }

    /// Append an outgoing message.
    pub fn send(&mut self, message: Message) {
        self.outgoing.send(message);
    }

    /// Command pump `index` open.  Pumps the plant does not have are skipped.
    pub fn open_pump(&mut self, index: usize) {
        if let Some(slot) = self.state.pump_open.get_mut(index) {
            *slot = true;
            self.outgoing.send(Message::OpenPump(index));
        }
    }

    /// Command pump `index` closed.  Pumps the plant does not have are skipped.
    pub fn close_pump(&mut self, index: usize) {
        if let Some(slot) = self.state.pump_open.get_mut(index) {
            *slot = false;
            self.outgoing.send(Message::ClosePump(index));
        }
    }

    /// Bounds on next cycle's level from the current reading, or `None`
    /// while the level sensor is failed.
    pub fn estimate(&self) -> Option<LevelBounds> {
        self.level.value().map(|level| {
            estimator::estimate(self.config, level, self.state.open_pump_count(), self.steam)
        })
    }

    /// Bounds on next cycle's level from bounds on the current one.
    pub fn lookahead(&self, current: LevelBounds) -> LevelBounds {
        estimator::propagate(self.config, current, self.state.open_pump_count(), self.steam)
    }

    /// Execute a pump policy decision in order.
    pub fn apply(&mut self, decision: &PolicyDecision) {
        for command in &decision.commands {
            match *command {
                PumpCommand::Open(pump) => self.open_pump(pump),
                PumpCommand::Close(pump) => self.close_pump(pump),
            }
        }
        if let Some(flag) = decision.lower_mid_pump_open {
            self.state.lower_mid_pump_open = flag;
        }
    }
}
