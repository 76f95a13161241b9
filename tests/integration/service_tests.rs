//! Integration tests for the BoilerService → Controller → transport
//! pipeline.

use boilerctl::adapters::log_sink::LogEventSink;
use boilerctl::app::events::AppEvent;
use boilerctl::app::service::BoilerService;
use boilerctl::config::PlantConfiguration;
use boilerctl::fsm::{Controller, Mode};
use boilerctl::mailbox::{BroadcastMode, Message, MessageKind};

use super::mock_transport::{
    RecordingSink, ScriptedTransport, Telemetry, low_steam_plant, reference_plant,
};

fn make_service(config: PlantConfiguration) -> (BoilerService, RecordingSink) {
    let mut svc = BoilerService::with_configuration(config).unwrap();
    let mut sink = RecordingSink::default();
    svc.start(&mut sink);
    (svc, sink)
}

#[test]
fn invalid_configuration_is_rejected() {
    let bad = PlantConfiguration {
        minimal_normal_level: 50.0,
        ..reference_plant()
    };
    assert!(BoilerService::with_configuration(bad).is_err());
}

#[test]
fn session_events_follow_the_controller() {
    let (mut svc, mut sink) = make_service(reference_plant());
    let mut transport = ScriptedTransport::new([
        Telemetry::new(700.0, 0.0, 1)
            .with(Message::PhysicalUnitsReady)
            .build(),
        Telemetry::new(700.0, 150.0, 1).build(),
        Telemetry::new(700.0, 50.0, 1)
            .pump_open(0)
            .with(Message::SteamOutcomeFailureAcknowledgement)
            .build(),
    ]);

    assert_eq!(svc.run(&mut transport, &mut sink), 3);
    assert_eq!(svc.mode(), Mode::Normal);

    assert_eq!(sink.events.first(), Some(&AppEvent::Started(Mode::Waiting)));
    assert_eq!(
        sink.mode_changes(),
        vec![
            (Mode::Waiting, Mode::Normal),
            (Mode::Normal, Mode::Degraded),
            (Mode::Degraded, Mode::Normal),
        ]
    );
    assert!(sink
        .events
        .contains(&AppEvent::FailureDetected(MessageKind::SteamFailureDetection)));
    assert!(sink
        .events
        .contains(&AppEvent::Repaired(MessageKind::SteamRepaired)));

    let completed = sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::CycleCompleted(_)))
        .count();
    assert_eq!(completed, 3);
}

#[test]
fn every_delivery_ends_with_one_broadcast() {
    let (mut svc, mut sink) = make_service(low_steam_plant());
    let mut transport = ScriptedTransport::new([
        Telemetry::new(500.0, 0.0, 1)
            .with(Message::SteamBoilerWaiting)
            .build(),
        Telemetry::new(500.0, 0.0, 1)
            .with(Message::PhysicalUnitsReady)
            .build(),
        Telemetry::new(-1.0, 0.0, 1).build(),
    ]);
    svc.run(&mut transport, &mut sink);

    let broadcasts: Vec<_> = transport
        .delivered
        .iter()
        .map(|mb| {
            assert_eq!(mb.extract_all(MessageKind::Mode).len(), 1);
            mb.last_broadcast()
        })
        .collect();
    assert_eq!(
        broadcasts,
        vec![
            Some(BroadcastMode::Initialisation),
            Some(BroadcastMode::Normal),
            Some(BroadcastMode::Rescue),
        ]
    );
}

#[test]
fn unconfigured_service_delivers_nothing() {
    let mut svc = BoilerService::new(Controller::new(None));
    let mut sink = RecordingSink::default();
    let mut transport = ScriptedTransport::new([Telemetry::new(500.0, 0.0, 1).build()]);
    svc.run(&mut transport, &mut sink);
    assert_eq!(transport.delivered.len(), 1);
    assert!(transport.delivered[0].is_empty());
    assert!(sink.mode_changes().is_empty());
}

#[test]
fn log_sink_accepts_every_event() {
    let mut svc = BoilerService::with_configuration(low_steam_plant()).unwrap();
    let mut sink = LogEventSink::new();
    svc.start(&mut sink);
    let mut transport = ScriptedTransport::new([
        Telemetry::new(500.0, 0.0, 1)
            .with(Message::PhysicalUnitsReady)
            .build(),
        Telemetry::new(-1.0, 0.0, 1).build(),
    ]);
    assert_eq!(svc.run(&mut transport, &mut sink), 2);
    assert_eq!(svc.mode(), Mode::Rescue);
    assert!(transport.last_delivered().is_some());
}
