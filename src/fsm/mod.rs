//! Mode state machine: the controller core.
//!
//! Each cycle the [`Controller`] runs:
//!
//! ```text
//!  incoming ──▶ read_snapshot ──▶ transmission check ──┬─▶ EMERGENCY_STOP
//!                                                      │
//!                                                      └─▶ dispatch(mode)
//!                                                            │
//!                       WAITING · READY · NORMAL · DEGRADED · RESCUE · EMERGENCY_STOP
//!                                                            │
//!  outgoing ◀── actuator commands + notifications ◀──────────┘
//!           ◀── one mode broadcast (post-cycle mode)
//! ```
//!
//! Handlers request transitions through [`ControllerState::enter`], which
//! only follows documented edges.  EMERGENCY_STOP has none, so it is
//! absorbing both within a cycle and across cycles.

pub mod context;
pub mod states;

use core::fmt;

use log::debug;

use crate::config::PlantConfiguration;
use crate::error::{Failure, Result};
use crate::mailbox::{BroadcastMode, Mailbox, Message};
use crate::safety;
use crate::sensors;

use context::{ControllerState, FsmContext};

// ---------------------------------------------------------------------------
// Mode identity
// ---------------------------------------------------------------------------

/// Operating regime of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Initialisation: waiting for the physical units.
    Waiting,
    /// Declared by the protocol; no transition leads here.
    Ready,
    /// All units healthy; steer the level into the normal band.
    Normal,
    /// Some unit other than the level sensor has failed.
    Degraded,
    /// The level sensor has failed; steer on estimates alone.
    Rescue,
    /// Terminal.  Vital units lost or a limit about to be crossed.
    EmergencyStop,
}

impl Mode {
    /// Every mode, in declaration order.
    pub const ALL: [Mode; 6] = [
        Mode::Waiting,
        Mode::Ready,
        Mode::Normal,
        Mode::Degraded,
        Mode::Rescue,
        Mode::EmergencyStop,
    ];

    /// Display name, as shown by [`Controller::status_message`].
    pub fn name(self) -> &'static str {
        match self {
            Self::Waiting => "WAITING",
            Self::Ready => "READY",
            Self::Normal => "NORMAL",
            Self::Degraded => "DEGRADED",
            Self::Rescue => "RESCUE",
            Self::EmergencyStop => "EMERGENCY_STOP",
        }
    }

    /// Payload announced to the physical units while in this mode.
    pub fn broadcast(self) -> BroadcastMode {
        match self {
            Self::Waiting | Self::Ready => BroadcastMode::Initialisation,
            Self::Normal => BroadcastMode::Normal,
            Self::Degraded => BroadcastMode::Degraded,
            Self::Rescue => BroadcastMode::Rescue,
            Self::EmergencyStop => BroadcastMode::EmergencyStop,
        }
    }

    /// Whether the edge `self -> next` exists.
    pub fn can_transition_to(self, next: Mode) -> bool {
        match self {
            Self::Waiting | Self::Ready => matches!(
                next,
                Self::Normal | Self::Degraded | Self::EmergencyStop
            ),
            Self::Normal => matches!(next, Self::Degraded | Self::Rescue | Self::EmergencyStop),
            Self::Degraded => matches!(next, Self::Normal | Self::Rescue | Self::EmergencyStop),
            Self::Rescue => matches!(next, Self::Normal | Self::Degraded | Self::EmergencyStop),
            Self::EmergencyStop => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::EmergencyStop)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// The steam boiler controller.
///
/// Owns the persistent [`ControllerState`] and an optional plant
/// configuration.  Without a configuration every cycle is a no-op.
#[derive(Debug, Clone)]
pub struct Controller {
    configuration: Option<PlantConfiguration>,
    state: ControllerState,
    cycles: u64,
}

impl Controller {
    /// Construct a controller.  `None` models "not yet configured".
    pub fn new(configuration: Option<PlantConfiguration>) -> Self {
        let pump_count = configuration
            .as_ref()
            .map_or(0, PlantConfiguration::pump_count);
        Self {
            configuration,
            state: ControllerState::new(pump_count),
            cycles: 0,
        }
    }

    /// Validate `configuration` and construct a configured controller.
    pub fn try_new(configuration: PlantConfiguration) -> Result<Self> {
        configuration.validate()?;
        Ok(Self::new(Some(configuration)))
    }

    /// Process one clock tick.
    ///
    /// Reads `incoming`, updates the persistent state and appends actuator
    /// commands, notifications and exactly one mode broadcast to
    /// `outgoing`.
    pub fn cycle(&mut self, incoming: &Mailbox, outgoing: &mut Mailbox) {
        let Some(config) = self.configuration.as_ref() else {
            return;
        };
        self.cycles += 1;
        let snapshot = sensors::read_snapshot(incoming);

        match safety::check_transmission(config, &snapshot) {
            Err(fault) => {
                log::error!("FAILURE DETECTED: {}", Failure::Transmission(fault));
                self.state.enter(Mode::EmergencyStop);
            }
            Ok((level, steam)) => {
                if let Some(level) = level.within(config.maximal_limit_level) {
                    if self.state.mode != Mode::Rescue {
                        self.state.last_valid_level = Some(level);
                    }
                }
                let mut ctx =
                    FsmContext::new(config, snapshot, level, steam, &mut self.state, outgoing);
                states::dispatch(&mut ctx);
                self.state.previous_steam = steam;
            }
        }

        debug!("cycle {} ends in {}", self.cycles, self.state.mode);
        outgoing.send(Message::Mode(self.state.mode.broadcast()));
    }

    /// Current mode's display name.
    pub fn status_message(&self) -> String {
        self.state.mode.name().to_string()
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    /// Read-only view of the persistent state.
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn configuration(&self) -> Option<&PlantConfiguration> {
        self.configuration.as_ref()
    }

    /// Cycles run with a configuration; unconfigured ticks are not counted.
    pub fn configured_cycles(&self) -> u64 {
        self.cycles
    }
}
