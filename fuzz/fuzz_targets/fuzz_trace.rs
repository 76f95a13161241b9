//! Fuzz target: `Trace::from_json`
//!
//! Feeds arbitrary text to the trace parser.  It must never panic; any
//! trace it accepts must replay to completion with one delivery per
//! recorded cycle.
//!
//! cargo fuzz run fuzz_trace

#![no_main]

use boilerctl::adapters::log_sink::LogEventSink;
use boilerctl::adapters::replay::{ReplayTransport, Trace};
use boilerctl::app::service::BoilerService;
use boilerctl::fsm::Controller;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    let Ok(trace) = Trace::from_json(text) else {
        return;
    };

    let cycles = trace.cycles.len();
    let mut service = match trace.configuration.clone() {
        Some(config) => match BoilerService::with_configuration(config) {
            Ok(service) => service,
            Err(_) => return,
        },
        None => BoilerService::new(Controller::new(None)),
    };
    let mut transport = ReplayTransport::from(trace);
    let mut sink = LogEventSink::new();
    service.run(&mut transport, &mut sink);
    assert_eq!(transport.delivered().len(), cycles);
});
