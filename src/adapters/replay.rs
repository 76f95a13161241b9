//! Trace replay transport.
//!
//! Plays back a recorded JSON trace, one mailbox per cycle, and keeps
//! every outgoing mailbox the service delivers.  Trace format:
//!
//! ```json
//! {
//!   "configuration": { "capacity": 1000.0, "pump_capacities": [10.0], ... },
//!   "cycles": [
//!     [{"kind":"LEVEL","args":500.0}, {"kind":"STEAM","args":0.0}, ...],
//!     ...
//!   ]
//! }
//! ```
//!
//! `configuration` may be omitted; the controller then runs unconfigured.

use std::collections::VecDeque;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::app::ports::TransportPort;
use crate::config::PlantConfiguration;
use crate::error::{Error, Result};
use crate::mailbox::Mailbox;

/// A recorded session with the physical units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    #[serde(default)]
    pub configuration: Option<PlantConfiguration>,
    pub cycles: Vec<Mailbox>,
}

impl Trace {
    /// Parse a trace from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Trace(e.to_string()))
    }

    /// Read and parse a trace file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Trace(format!("{}: {e}", path.display())))?;
        let trace = Self::from_json(&text)?;
        info!(
            "loaded trace {} ({} cycles, {})",
            path.display(),
            trace.cycles.len(),
            if trace.configuration.is_some() {
                "configured"
            } else {
                "unconfigured"
            }
        );
        Ok(trace)
    }
}

/// [`TransportPort`] backed by a recorded trace.
#[derive(Debug, Default)]
pub struct ReplayTransport {
    pending: VecDeque<Mailbox>,
    delivered: Vec<Mailbox>,
}

impl ReplayTransport {
    pub fn new(cycles: Vec<Mailbox>) -> Self {
        Self {
            pending: cycles.into(),
            delivered: Vec::new(),
        }
    }

    /// Mailboxes not yet handed to the controller.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// Outgoing mailboxes collected so far, in cycle order.
    pub fn delivered(&self) -> &[Mailbox] {
        &self.delivered
    }

    pub fn into_delivered(self) -> Vec<Mailbox> {
        self.delivered
    }
}

impl From<Trace> for ReplayTransport {
    fn from(trace: Trace) -> Self {
        Self::new(trace.cycles)
    }
}

impl TransportPort for ReplayTransport {
    fn receive(&mut self) -> Option<Mailbox> {
        self.pending.pop_front()
    }

    fn deliver(&mut self, outgoing: Mailbox) {
        self.delivered.push(outgoing);
    }
}
