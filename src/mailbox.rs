//! Typed signal mailbox exchanged with the physical units each cycle.
//!
//! The transport delivers one incoming [`Mailbox`] per cycle and collects
//! one outgoing [`Mailbox`].  The controller only ever asks two questions
//! of the incoming side, and only ever appends to the outgoing side:
//!
//! ```text
//!  incoming ──▶ extract_unique(kind)   exactly one match, else None
//!           ──▶ extract_all(kind)      every match, arrival order
//!  outgoing ◀── send(message)          append-only, no dedup
//! ```

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Mode broadcast payload
// ---------------------------------------------------------------------------

/// Operating mode as announced to the physical units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BroadcastMode {
    Initialisation,
    Normal,
    Degraded,
    Rescue,
    EmergencyStop,
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// A single typed signal.
///
/// Serialised adjacently tagged, e.g. `{"kind":"LEVEL","args":150.0}` or
/// `{"kind":"PUMP_STATE","args":{"pump":0,"open":true}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "args", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    // ── Physical units → controller ───────────────────────────
    /// Water level reading; negative means the sensor reports failure.
    Level(f64),
    /// Steam output reading; negative means the sensor reports failure.
    Steam(f64),
    /// Sensed physical state of a pump.
    PumpState { pump: usize, open: bool },
    /// State reported by a pump's own controller.
    PumpControlState { pump: usize, open: bool },
    /// Physical units are waiting for the controller to initialise.
    SteamBoilerWaiting,
    /// Physical units are ready to start normal operation.
    PhysicalUnitsReady,
    LevelFailureAcknowledgement,
    PumpFailureAcknowledgement(usize),
    PumpControlFailureAcknowledgement(usize),
    SteamOutcomeFailureAcknowledgement,

    // ── Controller → physical units ───────────────────────────
    /// Current operating mode.
    Mode(BroadcastMode),
    /// Initialisation finished, level within the normal band.
    ProgramReady,
    /// Open the evacuation valve.
    Valve,
    OpenPump(usize),
    ClosePump(usize),
    LevelFailureDetection,
    SteamFailureDetection,
    PumpFailureDetection(usize),
    PumpControlFailureDetection(usize),
    LevelRepaired,
    SteamRepaired,
    PumpRepaired(usize),
    PumpControlRepaired(usize),
}

/// Parameter-free discriminant of a [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Level,
    Steam,
    PumpState,
    PumpControlState,
    SteamBoilerWaiting,
    PhysicalUnitsReady,
    LevelFailureAcknowledgement,
    PumpFailureAcknowledgement,
    PumpControlFailureAcknowledgement,
    SteamOutcomeFailureAcknowledgement,
    Mode,
    ProgramReady,
    Valve,
    OpenPump,
    ClosePump,
    LevelFailureDetection,
    SteamFailureDetection,
    PumpFailureDetection,
    PumpControlFailureDetection,
    LevelRepaired,
    SteamRepaired,
    PumpRepaired,
    PumpControlRepaired,
}

impl MessageKind {
    /// True for the failure notifications the controller emits.
    pub fn is_failure_detection(self) -> bool {
        matches!(
            self,
            Self::LevelFailureDetection
                | Self::SteamFailureDetection
                | Self::PumpFailureDetection
                | Self::PumpControlFailureDetection
        )
    }

    /// True for the repair notifications the controller emits.
    pub fn is_repair(self) -> bool {
        matches!(
            self,
            Self::LevelRepaired | Self::SteamRepaired | Self::PumpRepaired | Self::PumpControlRepaired
        )
    }
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Level(_) => MessageKind::Level,
            Self::Steam(_) => MessageKind::Steam,
            Self::PumpState { .. } => MessageKind::PumpState,
            Self::PumpControlState { .. } => MessageKind::PumpControlState,
            Self::SteamBoilerWaiting => MessageKind::SteamBoilerWaiting,
            Self::PhysicalUnitsReady => MessageKind::PhysicalUnitsReady,
            Self::LevelFailureAcknowledgement => MessageKind::LevelFailureAcknowledgement,
            Self::PumpFailureAcknowledgement(_) => MessageKind::PumpFailureAcknowledgement,
            Self::PumpControlFailureAcknowledgement(_) => {
                MessageKind::PumpControlFailureAcknowledgement
            }
            Self::SteamOutcomeFailureAcknowledgement => {
                MessageKind::SteamOutcomeFailureAcknowledgement
            }
            Self::Mode(_) => MessageKind::Mode,
            Self::ProgramReady => MessageKind::ProgramReady,
            Self::Valve => MessageKind::Valve,
            Self::OpenPump(_) => MessageKind::OpenPump,
            Self::ClosePump(_) => MessageKind::ClosePump,
            Self::LevelFailureDetection => MessageKind::LevelFailureDetection,
            Self::SteamFailureDetection => MessageKind::SteamFailureDetection,
            Self::PumpFailureDetection(_) => MessageKind::PumpFailureDetection,
            Self::PumpControlFailureDetection(_) => MessageKind::PumpControlFailureDetection,
            Self::LevelRepaired => MessageKind::LevelRepaired,
            Self::SteamRepaired => MessageKind::SteamRepaired,
            Self::PumpRepaired(_) => MessageKind::PumpRepaired,
            Self::PumpControlRepaired(_) => MessageKind::PumpControlRepaired,
        }
    }

    /// Scalar payload of LEVEL / STEAM messages.
    pub fn scalar(&self) -> Option<f64> {
        match self {
            Self::Level(v) | Self::Steam(v) => Some(*v),
            _ => None,
        }
    }

    /// Boolean payload of PUMP_STATE / PUMP_CONTROL_STATE messages.
    pub fn flag(&self) -> Option<bool> {
        match self {
            Self::PumpState { open, .. } | Self::PumpControlState { open, .. } => Some(*open),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Mailbox
// ---------------------------------------------------------------------------

/// Ordered collection of messages for one cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mailbox {
    messages: Vec<Message>,
}

impl Mailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// The unique message of `kind`.
    ///
    /// Returns `None` when there are zero matches **or more than one**:
    /// an ambiguous reading is as useless as a missing one.
    pub fn extract_unique(&self, kind: MessageKind) -> Option<&Message> {
        let mut matches = self.messages.iter().filter(|m| m.kind() == kind);
        let first = matches.next()?;
        match matches.next() {
            Some(_) => None,
            None => Some(first),
        }
    }

    /// Every message of `kind`, in arrival order.
    pub fn extract_all(&self, kind: MessageKind) -> Vec<&Message> {
        self.messages.iter().filter(|m| m.kind() == kind).collect()
    }

    /// True if exactly one message of `kind` is present.
    pub fn has_unique(&self, kind: MessageKind) -> bool {
        self.extract_unique(kind).is_some()
    }

    /// Append a message.
    pub fn send(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Payload of the last mode broadcast, if any was sent.
    pub fn last_broadcast(&self) -> Option<BroadcastMode> {
        self.messages.iter().rev().find_map(|m| match m {
            Message::Mode(mode) => Some(*mode),
            _ => None,
        })
    }

    /// Remove every message, keeping the allocation.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl From<Vec<Message>> for Mailbox {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

impl FromIterator<Message> for Mailbox {
    fn from_iter<I: IntoIterator<Item = Message>>(iter: I) -> Self {
        Self {
            messages: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Mailbox {
    type Item = &'a Message;
    type IntoIter = core::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
