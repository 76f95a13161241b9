//! Application core: drives the controller, zero I/O.
//!
//! This module wraps the [`Controller`](crate::fsm::Controller) in a
//! cycle loop.  All interaction with the physical units happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! with scripted transports.

pub mod events;
pub mod ports;
pub mod service;
