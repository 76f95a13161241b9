//! Steam boiler water-level controller.
//!
//! A cyclic controller: each tick consumes one mailbox of telemetry from
//! the physical units and produces one mailbox of actuator commands,
//! failure notifications and a mode broadcast.  The core
//! ([`fsm::Controller`]) performs no I/O; [`app`] drives it through port
//! traits and [`adapters`] supply concrete transports.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod fsm;
pub mod mailbox;
pub mod safety;
pub mod sensors;

pub use config::PlantConfiguration;
pub use fsm::{Controller, Mode};
pub use mailbox::{Mailbox, Message, MessageKind};
