//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  No physical units required.

mod controller_tests;
mod mock_transport;
mod service_tests;
