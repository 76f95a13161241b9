//! Fuzz target: `Controller::cycle`
//!
//! Decodes arbitrary bytes into a sequence of incoming mailboxes and
//! drives a two-pump controller through them.  Asserts that every cycle
//! sends exactly one mode broadcast naming the post-cycle mode, that pump
//! commands stay in range, and that EMERGENCY_STOP is never left.
//!
//! cargo fuzz run fuzz_cycle

#![no_main]

use boilerctl::config::PlantConfiguration;
use boilerctl::fsm::{Controller, Mode};
use boilerctl::mailbox::{Mailbox, Message, MessageKind};
use libfuzzer_sys::fuzz_target;

const PUMPS: usize = 2;

/// One message from a 3-byte window: tag, then two payload bytes.
fn decode(chunk: &[u8]) -> Option<Message> {
    let [tag, a, b] = *chunk else {
        return None;
    };
    let scalar = f64::from(i16::from_le_bytes([a, b])) / 16.0;
    let pump = usize::from(a % 4);
    Some(match tag % 12 {
        0 => Message::Level(scalar),
        1 => Message::Steam(scalar),
        2 => Message::PumpState { pump, open: b & 1 == 1 },
        3 => Message::PumpControlState { pump, open: b & 1 == 1 },
        4 => Message::SteamBoilerWaiting,
        5 => Message::PhysicalUnitsReady,
        6 => Message::LevelFailureAcknowledgement,
        7 => Message::PumpFailureAcknowledgement(pump),
        8 => Message::PumpControlFailureAcknowledgement(pump),
        9 => Message::SteamOutcomeFailureAcknowledgement,
        // Cycle separator.
        _ => return None,
    })
}

fuzz_target!(|data: &[u8]| {
    let config = PlantConfiguration {
        pump_capacities: vec![10.0; PUMPS],
        ..PlantConfiguration::default()
    };
    let mut controller = Controller::new(Some(config));

    let mut incoming = Mailbox::new();
    let mut chunks = data.chunks(3).peekable();
    while chunks.peek().is_some() {
        incoming.clear();
        for chunk in chunks.by_ref() {
            match decode(chunk) {
                Some(message) => incoming.send(message),
                None => break,
            }
        }

        let was_stopped = controller.mode() == Mode::EmergencyStop;
        let mut outgoing = Mailbox::new();
        controller.cycle(&incoming, &mut outgoing);

        assert_eq!(outgoing.extract_all(MessageKind::Mode).len(), 1);
        assert_eq!(outgoing.last_broadcast(), Some(controller.mode().broadcast()));
        assert_ne!(controller.mode(), Mode::Ready);
        if was_stopped {
            assert_eq!(controller.mode(), Mode::EmergencyStop);
            assert_eq!(outgoing.len(), 1);
        }
        for message in &outgoing {
            if let Message::OpenPump(i) | Message::ClosePump(i) = message {
                assert!(*i < PUMPS, "pump command out of range");
            }
        }
    }
});
