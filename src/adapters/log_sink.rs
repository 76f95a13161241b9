//! Log-based event sink adapter.
//!
//! [`LogEventSink`] implements [`EventSink`] by writing structured
//! application events through the `log` facade.  The binary installs
//! `env_logger` as the backend.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(mode) => {
                info!("START | initial_mode={mode}");
            }
            AppEvent::ModeChanged { from, to } => {
                info!("MODE | {from} -> {to}");
            }
            AppEvent::FailureDetected(kind) => {
                warn!("FAILURE | {kind:?}");
            }
            AppEvent::Repaired(kind) => {
                info!("REPAIR | {kind:?}");
            }
            AppEvent::CycleCompleted(summary) => {
                debug!(
                    "CYCLE | #{} mode={} out={}",
                    summary.cycle,
                    summary.mode,
                    summary.outgoing.len()
                );
            }
        }
    }
}
