//! Sensor subsystem: turns an incoming [`Mailbox`] into the per-cycle
//! [`SensorSnapshot`] that state handlers read.
//!
//! All sentinel decoding happens here; handlers only ever see
//! [`Reading`] values and plain pump flags.

pub mod reading;

pub use reading::Reading;

use crate::fsm::context::SensorSnapshot;
use crate::mailbox::{Mailbox, Message, MessageKind};

/// Extract every reading and discrete signal the controller consumes.
///
/// Scalar readings and acknowledgements use unique extraction (duplicates
/// count as absent); pump flags keep arrival order.
pub fn read_snapshot(incoming: &Mailbox) -> SensorSnapshot {
    SensorSnapshot {
        level: unique_reading(incoming, MessageKind::Level),
        steam: unique_reading(incoming, MessageKind::Steam),
        pump_states: pump_flags(incoming, MessageKind::PumpState),
        pump_control_states: pump_flags(incoming, MessageKind::PumpControlState),
        units_waiting: incoming.has_unique(MessageKind::SteamBoilerWaiting),
        units_ready: incoming.has_unique(MessageKind::PhysicalUnitsReady),
        level_failure_ack: incoming.has_unique(MessageKind::LevelFailureAcknowledgement),
        pump_failure_ack: indexed_ack(incoming, MessageKind::PumpFailureAcknowledgement),
        pump_control_failure_ack: indexed_ack(
            incoming,
            MessageKind::PumpControlFailureAcknowledgement,
        ),
        steam_failure_ack: incoming.has_unique(MessageKind::SteamOutcomeFailureAcknowledgement),
    }
}

fn unique_reading(incoming: &Mailbox, kind: MessageKind) -> Option<Reading> {
    incoming
        .extract_unique(kind)
        .and_then(Message::scalar)
        .map(Reading::from_raw)
}

fn pump_flags(incoming: &Mailbox, kind: MessageKind) -> Vec<bool> {
    incoming
        .extract_all(kind)
        .into_iter()
        .filter_map(Message::flag)
        .collect()
}

fn indexed_ack(incoming: &Mailbox, kind: MessageKind) -> Option<usize> {
    match incoming.extract_unique(kind)? {
        Message::PumpFailureAcknowledgement(pump)
        | Message::PumpControlFailureAcknowledgement(pump) => Some(*pump),
        _ => None,
    }
}
