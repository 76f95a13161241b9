//! Mock adapters for integration tests.
//!
//! A scripted transport that hands out pre-built mailboxes and records
//! every delivery, an event recorder, and a builder for the telemetry the
//! physical units send each cycle.

use std::collections::VecDeque;

use boilerctl::app::events::AppEvent;
use boilerctl::app::ports::{EventSink, TransportPort};
use boilerctl::config::PlantConfiguration;
use boilerctl::mailbox::{Mailbox, Message};

// ── Plant fixtures ────────────────────────────────────────────

/// Capacity 1000, limits 100/900, normal band 200/800, one pump of 30,
/// steam up to 100.
pub fn reference_plant() -> PlantConfiguration {
    PlantConfiguration {
        capacity: 1000.0,
        minimal_limit_level: 100.0,
        maximal_limit_level: 900.0,
        minimal_normal_level: 200.0,
        maximal_normal_level: 800.0,
        pump_capacities: vec![30.0],
        maximal_steam_rate: 100.0,
        cycle_period_secs: 5.0,
    }
}

/// The reference plant with a tighter steam envelope, so a single cycle's
/// estimate stays clear of the limits near the bottom of the band.
pub fn low_steam_plant() -> PlantConfiguration {
    PlantConfiguration {
        maximal_steam_rate: 10.0,
        ..reference_plant()
    }
}

// ── Telemetry builder ─────────────────────────────────────────

/// One cycle of telemetry.  Pumps start closed and obeying their
/// controllers.
#[derive(Debug, Clone)]
pub struct Telemetry {
    level: f64,
    steam: f64,
    sensed: Vec<bool>,
    control: Vec<bool>,
    extra: Vec<Message>,
}

#[allow(dead_code)]
impl Telemetry {
    pub fn new(level: f64, steam: f64, pumps: usize) -> Self {
        Self {
            level,
            steam,
            sensed: vec![false; pumps],
            control: vec![false; pumps],
            extra: Vec::new(),
        }
    }

    /// Pump `index` is open and its controller agrees.
    pub fn pump_open(mut self, index: usize) -> Self {
        self.sensed[index] = true;
        self.control[index] = true;
        self
    }

    /// Pump `index` is sensed `sensed` while its controller reports `control`.
    pub fn pump_mismatch(mut self, index: usize, sensed: bool, control: bool) -> Self {
        self.sensed[index] = sensed;
        self.control[index] = control;
        self
    }

    pub fn with(mut self, message: Message) -> Self {
        self.extra.push(message);
        self
    }

    pub fn build(self) -> Mailbox {
        let mut mb = Mailbox::new();
        mb.send(Message::Level(self.level));
        mb.send(Message::Steam(self.steam));
        for (pump, open) in self.sensed.into_iter().enumerate() {
            mb.send(Message::PumpState { pump, open });
        }
        for (pump, open) in self.control.into_iter().enumerate() {
            mb.send(Message::PumpControlState { pump, open });
        }
        for message in self.extra {
            mb.send(message);
        }
        mb
    }
}

// ── ScriptedTransport ─────────────────────────────────────────

#[derive(Default)]
pub struct ScriptedTransport {
    inbox: VecDeque<Mailbox>,
    pub delivered: Vec<Mailbox>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new(cycles: impl IntoIterator<Item = Mailbox>) -> Self {
        Self {
            inbox: cycles.into_iter().collect(),
            delivered: Vec::new(),
        }
    }

    pub fn push(&mut self, cycle: Mailbox) {
        self.inbox.push_back(cycle);
    }

    pub fn last_delivered(&self) -> Option<&Mailbox> {
        self.delivered.last()
    }
}

impl TransportPort for ScriptedTransport {
    fn receive(&mut self) -> Option<Mailbox> {
        self.inbox.pop_front()
    }

    fn deliver(&mut self, outgoing: Mailbox) {
        self.delivered.push(outgoing);
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn mode_changes(&self) -> Vec<(boilerctl::Mode, boilerctl::Mode)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::ModeChanged { from, to } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
