//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements    | Connects to                 |
//! |------------|---------------|-----------------------------|
//! | `log_sink` | EventSink     | `log` facade                |
//! | `replay`   | TransportPort | Recorded JSON message trace |

pub mod log_sink;
pub mod replay;
