//! Application service: the hexagonal core.
//!
//! [`BoilerService`] owns the [`Controller`] and runs it one cycle per
//! incoming mailbox.  All I/O flows through port traits injected at call
//! sites, making the entire service testable with mock adapters.
//!
//! ```text
//!  TransportPort ──▶ ┌─────────────────────────┐ ──▶ EventSink
//!                    │      BoilerService      │
//!  TransportPort ◀── │  Controller · cycle     │
//!                    └─────────────────────────┘
//! ```

use log::{debug, info};

use crate::config::PlantConfiguration;
use crate::error::Result;
use crate::fsm::{Controller, Mode};
use crate::mailbox::Mailbox;

use super::events::{AppEvent, CycleSummary};
use super::ports::{EventSink, TransportPort};

// ───────────────────────────────────────────────────────────────
// BoilerService
// ───────────────────────────────────────────────────────────────

/// Drives a [`Controller`] from a transport.
pub struct BoilerService {
    controller: Controller,
    cycles_driven: u64,
}

impl BoilerService {
    /// Wrap an existing controller (configured or not).
    pub fn new(controller: Controller) -> Self {
        Self {
            controller,
            cycles_driven: 0,
        }
    }

    /// Validate `config` and build a service around a fresh controller.
    pub fn with_configuration(config: PlantConfiguration) -> Result<Self> {
        Ok(Self::new(Controller::try_new(config)?))
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Announce the initial mode.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        let mode = self.controller.mode();
        if self.controller.configuration().is_none() {
            info!("BoilerService started without configuration; cycles are no-ops");
        } else {
            info!("BoilerService started in {mode}");
        }
        sink.emit(&AppEvent::Started(mode));
    }

    /// Run cycles until the transport is exhausted.  Returns the number
    /// of cycles executed.
    pub fn run(
        &mut self,
        transport: &mut impl TransportPort,
        sink: &mut impl EventSink,
    ) -> u64 {
        let mut executed = 0;
        while self.step(transport, sink).is_some() {
            executed += 1;
        }
        info!("transport exhausted after {executed} cycles");
        executed
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one cycle: receive → controller → deliver.
    ///
    /// Returns `None` without touching the controller when the transport
    /// has no more mailboxes.
    pub fn step(
        &mut self,
        transport: &mut impl TransportPort,
        sink: &mut impl EventSink,
    ) -> Option<CycleSummary> {
        let incoming = transport.receive()?;
        self.cycles_driven += 1;
        let from = self.controller.mode();

        let mut outgoing = Mailbox::new();
        self.controller.cycle(&incoming, &mut outgoing);
        let to = self.controller.mode();
        debug!(
            "cycle {}: {} in, {} out",
            self.cycles_driven,
            incoming.len(),
            outgoing.len()
        );

        // 1. Notifications
        for message in &outgoing {
            let kind = message.kind();
            if kind.is_failure_detection() {
                sink.emit(&AppEvent::FailureDetected(kind));
            } else if kind.is_repair() {
                sink.emit(&AppEvent::Repaired(kind));
            }
        }

        // 2. Mode change
        if from != to {
            sink.emit(&AppEvent::ModeChanged { from, to });
        }

        // 3. Summary, then hand the mailbox over
        let summary = CycleSummary {
            cycle: self.cycles_driven,
            mode: to,
            outgoing: outgoing.clone(),
        };
        sink.emit(&AppEvent::CycleCompleted(summary.clone()));
        transport.deliver(outgoing);

        Some(summary)
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current controller mode.
    pub fn mode(&self) -> Mode {
        self.controller.mode()
    }

    /// Mailboxes pulled from the transport, configured or not.
    pub fn cycles_driven(&self) -> u64 {
        self.cycles_driven
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }
}
