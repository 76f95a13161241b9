//! Port traits: the hexagonal boundary between the controller and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ BoilerService (domain)
//! ```
//!
//! Driven adapters (message transports, event sinks) implement these
//! traits.  The [`BoilerService`](super::service::BoilerService) consumes
//! them via generics, so the controller core never performs I/O itself.

use crate::mailbox::Mailbox;

use super::events::AppEvent;

// ───────────────────────────────────────────────────────────────
// Transport port (driven adapter: physical units ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Carries one mailbox in and one mailbox out per cycle.
pub trait TransportPort {
    /// Incoming messages for the next cycle, or `None` once the physical
    /// units have nothing more to say.
    fn receive(&mut self) -> Option<Mailbox>;

    /// Hand a cycle's outgoing messages to the physical units.
    fn deliver(&mut self, outgoing: Mailbox);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.
/// Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}
