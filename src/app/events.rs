//! Outbound application events.
//!
//! The [`BoilerService`](super::service::BoilerService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use crate::fsm::Mode;
use crate::mailbox::{Mailbox, MessageKind};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started (carries the initial mode).
    Started(Mode),

    /// The controller changed mode during a cycle.
    ModeChanged { from: Mode, to: Mode },

    /// The controller notified the physical units of a failure.
    FailureDetected(MessageKind),

    /// The controller confirmed a repair to the physical units.
    Repaired(MessageKind),

    /// A cycle finished.
    CycleCompleted(CycleSummary),
}

/// What one cycle produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleSummary {
    /// 1-based cycle number as counted by the service.
    pub cycle: u64,
    /// Mode after the cycle.
    pub mode: Mode,
    /// Messages sent to the physical units.
    pub outgoing: Mailbox,
}
