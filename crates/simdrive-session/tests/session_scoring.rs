//! Infractions and controls flowing through a running session.

use std::time::{Duration, Instant};

use simdrive_input::{ControllerSnapshot, DeviceSnapshot, InputSource, KeyboardState};
use simdrive_scoring::{
    InfractionEvent, LaneMarkingType, Outcome, SoundCue, VehiclePose, ViolationKind,
};
use simdrive_session::{Session, SessionConfig, SessionPorts, VehiclePhysics};
use simdrive_test_helpers::prelude::*;

struct Drive {
    backend: ScriptedBackend,
    display: FakeDisplay,
    audio: FakeAudio,
    input: FakeInput,
    session: Session<ScriptedBackend>,
    start: Instant,
}

impl Drive {
    fn with_input(input: FakeInput) -> Self {
        let backend = ScriptedBackend::new();
        let display = FakeDisplay::new();
        let audio = FakeAudio::new();
        let config = SessionConfig {
            realtime: false,
            ..SessionConfig::default()
        };
        let ports = SessionPorts::new(display.clone(), audio.clone(), input.clone());
        let session = must(Session::start(config, backend.clone(), ports));
        Self {
            backend,
            display,
            audio,
            input,
            session,
            start: Instant::now(),
        }
    }

    fn new() -> Self {
        Self::with_input(FakeInput::fanatec_rig())
    }

    fn tick_after_ms(&mut self, millis: u64) -> simdrive_session::TickReport {
        must(self.session.tick_at(self.start + Duration::from_millis(millis)))
    }
}

fn penalized(kind: ViolationKind, points: u32) -> Outcome {
    Outcome::Penalized { kind, points }
}

#[test]
fn collisions_respect_wall_clock_cooldown() {
    let mut drive = Drive::new();

    drive.backend.emit_collision(1200.0, "static.prop.streetbarrier");
    let report = drive.tick_after_ms(0);
    assert_eq!(
        report.assessments.first().map(|a| a.outcome),
        Some(penalized(ViolationKind::Collision, 15))
    );

    drive.backend.emit_collision(300.0, "static.prop.streetbarrier");
    let report = drive.tick_after_ms(500);
    assert_eq!(
        report.assessments.first().map(|a| a.outcome),
        Some(Outcome::CoolingDown {
            kind: ViolationKind::Collision
        })
    );

    drive.backend.emit_collision(300.0, "vehicle.audi.tt");
    drive.tick_after_ms(2100);

    let state = drive.session.engine().state();
    assert_eq!(state.current_score, 970);
    assert_eq!(state.total_lost_to_collisions, 30);
    assert_eq!(state.counters.collisions, 3);
    assert_eq!(drive.audio.count(SoundCue::Collision), 2);
    assert_eq!(
        drive
            .display
            .shown_texts()
            .iter()
            .filter(|t| *t == "COLLISION! -15 PTS")
            .count(),
        2
    );
}

#[test]
fn solid_line_uses_vehicle_heading_from_backend() {
    let mut drive = Drive::new();
    let frame = drive.backend.frame();
    drive.backend.emit_lane_invasion(InfractionEvent::lane_crossing(
        frame,
        [LaneMarkingType::Solid],
    ));

    let report = drive.tick_after_ms(0);
    assert_eq!(
        report.assessments.first().map(|a| a.outcome),
        Some(penalized(
            ViolationKind::Lane(simdrive_scoring::LaneViolation::SolidLine),
            7
        ))
    );
    assert_eq!(drive.session.engine().score(), 993);
    assert_eq!(drive.audio.played(), vec![SoundCue::SolidLine]);
}

#[test]
fn driving_against_the_lane_is_oncoming() {
    let mut drive = Drive::new();
    drive.backend.set_pose(VehiclePose::from_yaw_degrees(180.0));
    let frame = drive.backend.frame();
    drive.backend.emit_lane_invasion(InfractionEvent::lane_crossing(
        frame,
        [LaneMarkingType::Broken],
    ));

    drive.tick_after_ms(0);
    assert_eq!(drive.session.engine().score(), 985);
    let critical = drive.session.board().active_critical();
    assert_eq!(
        critical.map(|n| n.request.text.as_str()),
        Some("ONCOMING LANE! -15 PTS")
    );
    assert_eq!(drive.audio.count(SoundCue::Oncoming), 1);
}

#[test]
fn missing_waypoint_scores_unknown_violation() {
    let mut drive = Drive::new();
    drive.backend.set_lane(None);
    let frame = drive.backend.frame();
    drive.backend.emit_lane_invasion(InfractionEvent::lane_crossing(
        frame,
        [LaneMarkingType::Broken],
    ));

    drive.tick_after_ms(0);
    assert_eq!(drive.session.engine().score(), 995);
    assert!(
        drive
            .display
            .shown_texts()
            .contains(&"LANE VIOLATION! -5 PTS".to_string())
    );
}

#[test]
fn speeding_alerts_without_penalty() {
    let mut drive = Drive::new();
    drive.backend.set_speed_kmh(135.0);

    let report = drive.tick_after_ms(0);
    assert_approx_eq!(report.speed_kmh, 135.0_f32, 0.01);
    assert_eq!(
        report.assessments.last().map(|a| a.outcome),
        Some(Outcome::Alerted {
            kind: ViolationKind::Speeding
        })
    );
    for step in 1..10 {
        drive.tick_after_ms(step * 16);
    }

    assert_eq!(drive.session.engine().score(), 1000);
    assert_eq!(drive.session.engine().state().counters.speeding_alerts, 1);
    assert_eq!(drive.audio.count(SoundCue::Speeding), 1);
    assert_eq!(
        drive.display.last_stack().last().map(String::as_str),
        Some("EXCESSIVE SPEED!")
    );
}

#[test]
fn unknown_speed_does_not_rearm_speeding_alert() {
    let mut drive = Drive::new();
    drive.backend.set_speed_kmh(135.0);

    drive.tick_after_ms(0);
    drive.backend.fail_vehicle_state(1);
    let blind = drive.tick_after_ms(16);
    assert!(blind.assessments.is_empty());
    // The dashboard keeps the last known speed.
    assert_approx_eq!(blind.speed_kmh, 135.0_f32, 0.01);
    drive.tick_after_ms(32);

    assert_eq!(drive.session.engine().state().counters.speeding_alerts, 1);
    assert_eq!(drive.audio.count(SoundCue::Speeding), 1);
}

#[test]
fn autopilot_takes_over_until_toggled_off() {
    let mut drive = Drive::with_input(FakeInput::keyboard_only());
    let actor = must_some(drive.session.vehicle().map(|v| v.id), "vehicle");
    let pressed = KeyboardState {
        accelerate: true,
        autopilot: true,
        ..KeyboardState::default()
    };

    drive.input.set_keyboard(pressed);
    let report = drive.tick_after_ms(0);
    assert!(report.autopilot);
    assert!(drive.backend.autopilot(actor));
    assert!(drive.backend.applied_controls().is_empty());
    assert!(
        drive
            .display
            .shown_texts()
            .contains(&"Autopilot On".to_string())
    );

    // Held key keeps the backend driving.
    drive.tick_after_ms(16);
    assert!(drive.backend.applied_controls().is_empty());

    drive.input.set_keyboard(KeyboardState::default());
    drive.tick_after_ms(32);
    drive.input.set_keyboard(pressed);
    let report = drive.tick_after_ms(48);
    assert!(!report.autopilot);
    assert!(!drive.backend.autopilot(actor));
    let applied = must_some(drive.backend.last_control(), "control applied");
    assert_approx_eq!(applied.throttle, 1.0_f32, 1e-6);
    assert!(
        drive
            .display
            .shown_texts()
            .contains(&"Autopilot Off".to_string())
    );
}

#[test]
fn dashboard_reflects_the_last_tick() {
    let mut drive = Drive::new();
    drive.backend.set_speed_kmh(36.0);
    drive
        .backend
        .set_physics(Some(VehiclePhysics { max_rpm: 6000.0 }));
    drive.backend.emit_gnss(48.137, 11.575);
    // Full throttle on the inverted pedal.
    assert!(drive.input.set_axis(1, 2, -1.0));

    drive.tick_after_ms(0);
    let dash = must_some(drive.display.last_dashboard(), "dashboard rendered");
    assert_eq!(dash.score, 1000);
    assert_approx_eq!(dash.speed_kmh, 36.0_f32, 0.01);
    assert_in_range!(dash.rpm, 800..=6000);
    assert_eq!(dash.gear, "1");
    assert_eq!(dash.input_source, Some(InputSource::Hardware));
    let fix = must_some(dash.gnss, "gnss fix");
    assert_approx_eq!(fix.latitude, 48.137_f64, 1e-9);
    assert_eq!(&dash, drive.session.dashboard());

    let applied = must_some(drive.backend.last_control(), "control applied");
    assert_approx_eq!(applied.throttle, 1.0_f32, 1e-6);
}

#[test]
fn keyboard_drives_when_no_controller() {
    let mut drive = Drive::with_input(FakeInput::keyboard_only());
    drive.input.set_keyboard(KeyboardState {
        accelerate: true,
        ..KeyboardState::default()
    });

    let report = drive.tick_after_ms(0);
    assert_eq!(report.source, InputSource::Keyboard);
    assert_approx_eq!(report.command.throttle, 1.0_f32, 1e-6);
    assert_approx_eq!(report.command.brake, 0.0_f32, 1e-6);
}

#[test]
fn handbrake_toggle_is_announced() {
    let mut drive = Drive::new();
    assert!(drive.input.set_button(1, 0, true));
    let report = drive.tick_after_ms(0);
    assert!(report.command.handbrake);
    assert!(
        drive
            .display
            .shown_texts()
            .contains(&"Handbrake On".to_string())
    );
}

#[test]
fn missing_brake_axis_applies_brake() {
    let rig = ControllerSnapshot::new(vec![
        DeviceSnapshot::new("Generic Device", 2, 4),
        DeviceSnapshot::new("Fanatec Wheel", 3, 12),
    ]);
    let mut drive = Drive::with_input(FakeInput::with_controller(rig));
    assert!(!drive.session.mapping_issues().is_empty());

    let report = drive.tick_after_ms(0);
    assert_approx_eq!(report.command.brake, 1.0_f32, 1e-6);
    let applied = must_some(drive.backend.last_control(), "control applied");
    assert_approx_eq!(applied.brake, 1.0_f32, 1e-6);
}

#[test]
fn unplugged_controller_falls_back_to_keyboard() {
    let mut drive = Drive::new();
    assert_eq!(drive.tick_after_ms(0).source, InputSource::Hardware);
    drive.input.disconnect();
    assert_eq!(drive.tick_after_ms(16).source, InputSource::Keyboard);
}

#[test]
fn respawn_discards_stale_sensor_readings() {
    let mut drive = Drive::new();
    drive.backend.emit_collision(500.0, "vehicle.audi.tt");
    must(drive.session.respawn());

    let report = drive.tick_after_ms(0);
    assert!(report.assessments.iter().all(|a| !a.is_penalty()));
    assert_eq!(drive.session.engine().score(), 1000);
}
