//! End-to-end scenarios through `Controller::cycle`.
//!
//! Each test starts from WAITING and drives the controller with the
//! telemetry a real plant would send, asserting on mode and the outgoing
//! messages.

use boilerctl::config::PlantConfiguration;
use boilerctl::control::estimator::LevelBounds;
use boilerctl::fsm::{Controller, Mode};
use boilerctl::mailbox::{BroadcastMode, Mailbox, Message, MessageKind};

use super::mock_transport::{Telemetry, low_steam_plant, reference_plant};

fn cycle(c: &mut Controller, incoming: Mailbox) -> Mailbox {
    let mut out = Mailbox::new();
    c.cycle(&incoming, &mut out);
    out
}

/// Initialise at `level` and move to NORMAL.
fn started(config: PlantConfiguration, level: f64) -> Controller {
    let pumps = config.pump_count();
    let mut c = Controller::new(Some(config));
    let out = cycle(
        &mut c,
        Telemetry::new(level, 0.0, pumps)
            .with(Message::PhysicalUnitsReady)
            .build(),
    );
    assert_eq!(c.mode(), Mode::Normal);
    assert_eq!(out.last_broadcast(), Some(BroadcastMode::Normal));
    c
}

// ── Initialisation ────────────────────────────────────────────

#[test]
fn initialisation_fills_then_reports_ready() {
    let config = PlantConfiguration {
        pump_capacities: vec![30.0, 30.0],
        ..reference_plant()
    };
    let mut c = Controller::new(Some(config));

    let out = cycle(
        &mut c,
        Telemetry::new(150.0, 0.0, 2)
            .with(Message::SteamBoilerWaiting)
            .build(),
    );
    assert_eq!(
        out.messages(),
        &[
            Message::OpenPump(0),
            Message::OpenPump(1),
            Message::Mode(BroadcastMode::Initialisation),
        ]
    );

    let out = cycle(
        &mut c,
        Telemetry::new(500.0, 0.0, 2)
            .pump_open(0)
            .pump_open(1)
            .with(Message::SteamBoilerWaiting)
            .build(),
    );
    assert!(out.has_unique(MessageKind::ProgramReady));
    assert_eq!(c.mode(), Mode::Waiting);

    let out = cycle(
        &mut c,
        Telemetry::new(500.0, 0.0, 2)
            .pump_open(0)
            .pump_open(1)
            .with(Message::PhysicalUnitsReady)
            .build(),
    );
    assert_eq!(c.mode(), Mode::Normal);
    assert_eq!(c.status_message(), "NORMAL");
    assert_eq!(out.last_broadcast(), Some(BroadcastMode::Normal));
}

#[test]
fn initialisation_rejects_flowing_steam() {
    let mut c = Controller::new(Some(reference_plant()));
    let out = cycle(
        &mut c,
        Telemetry::new(500.0, 12.0, 1)
            .with(Message::SteamBoilerWaiting)
            .build(),
    );
    assert_eq!(c.mode(), Mode::EmergencyStop);
    assert_eq!(out.last_broadcast(), Some(BroadcastMode::EmergencyStop));
}

#[test]
fn initialisation_level_sensor_stuck_at_saturation() {
    let mut c = Controller::new(Some(reference_plant()));
    let out = cycle(&mut c, Telemetry::new(100.0, 0.0, 1).build());
    assert_eq!(c.mode(), Mode::EmergencyStop);
    assert!(out.has_unique(MessageKind::LevelFailureDetection));
}

// ── NORMAL ────────────────────────────────────────────────────

#[test]
fn low_level_opens_pump_and_stays_normal() {
    let mut c = started(low_steam_plant(), 170.0);
    let out = cycle(&mut c, Telemetry::new(170.0, 0.0, 1).build());
    assert_eq!(c.mode(), Mode::Normal);
    assert!(c.state().is_pump_open(0));
    assert!(out.iter().any(|m| *m == Message::OpenPump(0)));
    assert_eq!(out.last_broadcast(), Some(BroadcastMode::Normal));
}

#[test]
fn predicted_low_limit_breach_stops() {
    // 150 - 5·100 = -350: the worst-case steam draw empties the boiler
    // below M1 within one cycle.
    let mut c = started(reference_plant(), 500.0);
    let out = cycle(&mut c, Telemetry::new(150.0, 0.0, 1).build());
    assert_eq!(c.mode(), Mode::EmergencyStop);
    assert_eq!(out.last_broadcast(), Some(BroadcastMode::EmergencyStop));
}

#[test]
fn failed_level_sensor_enters_rescue() {
    let mut c = started(low_steam_plant(), 500.0);
    let out = cycle(&mut c, Telemetry::new(-1.0, 0.0, 1).build());
    assert_eq!(c.mode(), Mode::Rescue);
    assert_eq!(
        out.messages(),
        &[
            Message::LevelFailureDetection,
            Message::Mode(BroadcastMode::Rescue),
        ]
    );
}

#[test]
fn runtime_checks_still_report_after_predicted_breach() {
    let mut c = started(reference_plant(), 500.0);
    let out = cycle(
        &mut c,
        Telemetry::new(150.0, 0.0, 1)
            .pump_mismatch(0, true, false)
            .build(),
    );
    assert_eq!(c.mode(), Mode::EmergencyStop);
    assert!(out.iter().any(|m| *m == Message::PumpControlFailureDetection(0)));
    assert_eq!(out.extract_all(MessageKind::Mode).len(), 1);
    assert_eq!(out.messages().last(), Some(&Message::Mode(BroadcastMode::EmergencyStop)));
}

// ── DEGRADED round trips ──────────────────────────────────────

#[test]
fn pump_control_failure_round_trip() {
    let mut c = started(reference_plant(), 500.0);

    let out = cycle(
        &mut c,
        Telemetry::new(700.0, 50.0, 1)
            .pump_mismatch(0, true, false)
            .build(),
    );
    assert_eq!(c.mode(), Mode::Degraded);
    assert!(out.iter().any(|m| *m == Message::PumpControlFailureDetection(0)));

    let out = cycle(
        &mut c,
        Telemetry::new(700.0, 50.0, 1)
            .pump_open(0)
            .with(Message::PumpControlFailureAcknowledgement(0))
            .build(),
    );
    assert_eq!(c.mode(), Mode::Normal);
    assert!(out.iter().any(|m| *m == Message::PumpControlRepaired(0)));
    assert_eq!(out.last_broadcast(), Some(BroadcastMode::Normal));
}

#[test]
fn pump_failure_round_trip() {
    let mut c = started(low_steam_plant(), 500.0);

    // min = 230 - 5·10 = 180, below N1: pump 0 on.
    let out = cycle(&mut c, Telemetry::new(230.0, 0.0, 1).build());
    assert_eq!(c.mode(), Mode::Normal);
    assert!(out.iter().any(|m| *m == Message::OpenPump(0)));

    // Pump 0 never started.
    let out = cycle(&mut c, Telemetry::new(230.0, 5.0, 1).build());
    assert_eq!(c.mode(), Mode::Degraded);
    assert!(out.iter().any(|m| *m == Message::PumpFailureDetection(0)));

    // Acknowledged, but still stuck.
    let out = cycle(
        &mut c,
        Telemetry::new(230.0, 5.0, 1)
            .with(Message::PumpFailureAcknowledgement(0))
            .build(),
    );
    assert_eq!(c.mode(), Mode::Degraded);
    assert!(!out.iter().any(|m| m.kind() == MessageKind::PumpRepaired));

    let out = cycle(
        &mut c,
        Telemetry::new(300.0, 5.0, 1)
            .pump_open(0)
            .with(Message::PumpFailureAcknowledgement(0))
            .build(),
    );
    assert_eq!(c.mode(), Mode::Normal);
    assert!(out.iter().any(|m| *m == Message::PumpRepaired(0)));
    assert_eq!(out.last_broadcast(), Some(BroadcastMode::Normal));
}

#[test]
fn steam_failure_round_trip() {
    let mut c = started(reference_plant(), 700.0);

    let out = cycle(&mut c, Telemetry::new(700.0, 150.0, 1).build());
    assert_eq!(c.mode(), Mode::Degraded);
    assert!(c.state().degraded_steam);
    assert!(c.state().steam_error);
    assert!(out.has_unique(MessageKind::SteamFailureDetection));

    let out = cycle(
        &mut c,
        Telemetry::new(700.0, 50.0, 1)
            .pump_open(0)
            .with(Message::SteamOutcomeFailureAcknowledgement)
            .build(),
    );
    assert_eq!(c.mode(), Mode::Normal);
    assert!(!c.state().degraded_steam);
    assert!(out.has_unique(MessageKind::SteamRepaired));
}

#[test]
fn every_mismatched_pump_is_reported() {
    let config = PlantConfiguration {
        pump_capacities: vec![10.0; 3],
        ..reference_plant()
    };
    let mut c = started(config, 700.0);
    let out = cycle(
        &mut c,
        Telemetry::new(700.0, 50.0, 3)
            .pump_mismatch(0, false, true)
            .pump_mismatch(2, true, false)
            .build(),
    );
    assert_eq!(c.mode(), Mode::Degraded);
    let reported: Vec<&Message> = out.extract_all(MessageKind::PumpControlFailureDetection);
    assert_eq!(
        reported,
        vec![
            &Message::PumpControlFailureDetection(0),
            &Message::PumpControlFailureDetection(2),
        ]
    );
}

// ── RESCUE ────────────────────────────────────────────────────

#[test]
fn rescue_tracks_level_until_sensor_repaired() {
    let mut c = started(low_steam_plant(), 500.0);

    cycle(&mut c, Telemetry::new(-1.0, 5.0, 1).build());
    assert_eq!(c.mode(), Mode::Rescue);

    let out = cycle(&mut c, Telemetry::new(-1.0, 5.0, 1).build());
    assert_eq!(c.mode(), Mode::Rescue);
    assert!(out.iter().any(|m| *m == Message::OpenPump(0)));

    let out = cycle(
        &mut c,
        Telemetry::new(520.0, 5.0, 1)
            .pump_open(0)
            .with(Message::LevelFailureAcknowledgement)
            .build(),
    );
    assert_eq!(c.mode(), Mode::Normal);
    assert!(out.has_unique(MessageKind::LevelRepaired));
    assert_eq!(c.state().rescue_bounds, None);
}

#[test]
fn rescue_bounds_follow_the_physical_level() {
    let mut c = started(low_steam_plant(), 600.0);

    // 600 with full steam and pumps closed: 550 next cycle.
    cycle(&mut c, Telemetry::new(600.0, 10.0, 1).build());
    assert_eq!(c.mode(), Mode::Normal);

    cycle(&mut c, Telemetry::new(-1.0, 10.0, 1).build());
    assert_eq!(c.mode(), Mode::Rescue);
    assert_eq!(c.state().rescue_bounds, Some(LevelBounds::exact(550.0)));

    // The level is now 500 and heading for 450: pump 0 comes on.
    let out = cycle(&mut c, Telemetry::new(-1.0, 10.0, 1).build());
    assert_eq!(c.state().rescue_bounds, Some(LevelBounds::exact(500.0)));
    assert!(out.iter().any(|m| *m == Message::OpenPump(0)));

    // 500 + 5·30 - 5·10
    cycle(&mut c, Telemetry::new(-1.0, 10.0, 1).pump_open(0).build());
    assert_eq!(c.mode(), Mode::Rescue);
    assert_eq!(c.state().rescue_bounds, Some(LevelBounds::exact(600.0)));
}

#[test]
fn rescue_stops_when_steam_is_lost_too() {
    let mut c = started(low_steam_plant(), 500.0);
    cycle(&mut c, Telemetry::new(-1.0, 0.0, 1).build());
    assert_eq!(c.mode(), Mode::Rescue);
    cycle(&mut c, Telemetry::new(-1.0, -1.0, 1).build());
    assert_eq!(c.mode(), Mode::EmergencyStop);
}

// ── Transmission / EMERGENCY_STOP ─────────────────────────────

#[test]
fn wrong_pump_count_is_a_transmission_failure() {
    let mut c = started(reference_plant(), 500.0);
    let out = cycle(&mut c, Telemetry::new(500.0, 0.0, 2).build());
    assert_eq!(c.mode(), Mode::EmergencyStop);
    assert_eq!(out.messages(), &[Message::Mode(BroadcastMode::EmergencyStop)]);
}

#[test]
fn emergency_stop_is_absorbing() {
    let mut c = started(reference_plant(), 500.0);
    cycle(&mut c, Mailbox::new());
    assert_eq!(c.mode(), Mode::EmergencyStop);

    for incoming in [
        Telemetry::new(500.0, 0.0, 1)
            .with(Message::PhysicalUnitsReady)
            .build(),
        Telemetry::new(500.0, 0.0, 1)
            .with(Message::LevelFailureAcknowledgement)
            .with(Message::SteamOutcomeFailureAcknowledgement)
            .build(),
    ] {
        let out = cycle(&mut c, incoming);
        assert_eq!(c.mode(), Mode::EmergencyStop);
        assert_eq!(out.messages(), &[Message::Mode(BroadcastMode::EmergencyStop)]);
    }
}
