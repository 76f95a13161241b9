//! Unified error and failure types for the boiler controller.
//!
//! Two families live here:
//!
//! - [`Failure`]: a detected plant failure.  These are *values*, not Rust
//!   errors: the controller reacts to them by changing mode and notifying
//!   the physical units.  All variants are `Copy` so they pass through the
//!   detector and state machine without allocation.
//! - [`Error`]: things that go wrong around the core (bad configuration,
//!   unreadable traces).  Every fallible API outside the cycle returns it.

use core::fmt;

use crate::fsm::Mode;
use crate::mailbox::Message;

// ---------------------------------------------------------------------------
// Plant failures
// ---------------------------------------------------------------------------

/// Which part of a cycle's mandatory telemetry was missing or malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransmissionFault {
    /// No unique LEVEL message.
    LevelMissing,
    /// No unique STEAM message.
    SteamMissing,
    /// PUMP_STATE count differs from the pump count.
    PumpStateCount { expected: usize, got: usize },
    /// PUMP_CONTROL_STATE count differs from the pump count.
    PumpControlStateCount { expected: usize, got: usize },
}

impl fmt::Display for TransmissionFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LevelMissing => write!(f, "level reading missing"),
            Self::SteamMissing => write!(f, "steam reading missing"),
            Self::PumpStateCount { expected, got } => {
                write!(f, "expected {expected} pump states, got {got}")
            }
            Self::PumpControlStateCount { expected, got } => {
                write!(f, "expected {expected} pump control states, got {got}")
            }
        }
    }
}

/// A detected failure of a physical unit or of the telemetry link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Mandatory telemetry missing or malformed.
    Transmission(TransmissionFault),
    /// Water level reading out of its physically valid range.
    LevelSensor,
    /// Steam reading out of range, or zero while pumps are filling.
    SteamSensor,
    /// Pump did not open when commanded.
    Pump(usize),
    /// Pump's controller state disagrees with its sensed state.
    PumpControl(usize),
    /// Estimated next-cycle level crosses a limit threshold.
    PredictiveBreach,
}

impl Failure {
    /// The notification sent to the physical units for this failure,
    /// if the protocol defines one.
    pub fn notification(self) -> Option<Message> {
        match self {
            Self::Transmission(_) | Self::PredictiveBreach => None,
            Self::LevelSensor => Some(Message::LevelFailureDetection),
            Self::SteamSensor => Some(Message::SteamFailureDetection),
            Self::Pump(pump) => Some(Message::PumpFailureDetection(pump)),
            Self::PumpControl(pump) => Some(Message::PumpControlFailureDetection(pump)),
        }
    }

    /// Mode this failure forces when detected during normal operation.
    ///
    /// The initialisation checks escalate level failures to an emergency
    /// stop instead; they pick the mode explicitly.
    pub fn forced_mode(self) -> Mode {
        match self {
            Self::Transmission(_) | Self::PredictiveBreach => Mode::EmergencyStop,
            Self::LevelSensor => Mode::Rescue,
            Self::SteamSensor | Self::Pump(_) | Self::PumpControl(_) => Mode::Degraded,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transmission(e) => write!(f, "transmission failure: {e}"),
            Self::LevelSensor => write!(f, "water level sensor failure"),
            Self::SteamSensor => write!(f, "steam sensor failure"),
            Self::Pump(pump) => write!(f, "pump {pump} failure"),
            Self::PumpControl(pump) => write!(f, "pump controller {pump} failure"),
            Self::PredictiveBreach => write!(f, "predicted level crosses a limit"),
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// The record could not be deserialised.
    Malformed(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
            Self::Malformed(msg) => write!(f, "malformed configuration: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation outside the cycle funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
    /// A recorded message trace could not be parsed.
    Trace(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Trace(msg) => write!(f, "trace: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Trace(_) => None,
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
