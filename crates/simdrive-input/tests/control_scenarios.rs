//! End-to-end scenarios for the input normalizer: gear toggles, keyboard
//! fallback and hardware faults.

use simdrive_errors::DeviceError;
use simdrive_input::{
    AxisControl, ControlInput, ControlNotice, ControllerSnapshot, DeviceInventory,
    DeviceSnapshot, InputMap, InputNormalizer, InputSource, KeyboardState,
};
use simdrive_test_helpers::{must, must_some};

const TICK_MS: f32 = 1000.0 / 60.0;

fn normalizer() -> InputNormalizer {
    must(InputNormalizer::new(InputMap::fanatec_default()))
}

fn press(
    n: &mut InputNormalizer,
    rig: &mut ControllerSnapshot,
    button: usize,
    speed: f32,
) -> simdrive_input::ControlReading {
    rig.set_button(1, button, true);
    let reading = n.read_controls(&ControlInput::hardware(rig, speed, TICK_MS));
    rig.set_button(1, button, false);
    n.read_controls(&ControlInput::hardware(rig, speed, TICK_MS));
    reading
}

#[test]
fn reverse_toggle_from_drive_and_back_while_stopped() {
    let mut n = normalizer();
    let mut rig = ControllerSnapshot::fanatec_rig();

    let into = press(&mut n, &mut rig, 1, 0.0);
    assert_eq!(into.command.gear, -1);
    assert!(into.command.reverse);

    let out = press(&mut n, &mut rig, 1, 0.0);
    assert_eq!(out.command.gear, 0);
    assert!(!out.command.reverse);
    assert_eq!(out.notices, vec![ControlNotice::GearChanged(0)]);
}

#[test]
fn reverse_exit_while_rolling_selects_first() {
    let mut n = normalizer();
    let mut rig = ControllerSnapshot::fanatec_rig();
    press(&mut n, &mut rig, 1, 0.0);
    let out = press(&mut n, &mut rig, 1, 2.5);
    assert_eq!(out.command.gear, 1);
}

#[test]
fn manual_shifting_sequence() {
    let mut n = normalizer();
    let mut rig = ControllerSnapshot::fanatec_rig();

    let auto_up = press(&mut n, &mut rig, 4, 0.0);
    assert_eq!(auto_up.command.gear, 1);
    assert!(auto_up.notices.is_empty());

    let manual = press(&mut n, &mut rig, 2, 0.0);
    assert!(manual.command.manual);
    assert_eq!(manual.command.gear, 0);

    for _ in 0..3 {
        press(&mut n, &mut rig, 4, 0.0);
    }
    assert_eq!(n.transmission().gear(), 3);

    for _ in 0..6 {
        press(&mut n, &mut rig, 5, 0.0);
    }
    assert_eq!(n.transmission().gear(), -1);

    let auto = press(&mut n, &mut rig, 2, 0.0);
    assert!(!auto.command.manual);
    assert_eq!(auto.command.gear, 1);
    assert!(!auto.command.reverse);
}

#[test]
fn full_throttle_and_brake_on_default_rig() {
    let mut n = normalizer();
    let mut rig = ControllerSnapshot::fanatec_rig();
    rig.set_axis(1, 2, -1.0);
    rig.set_axis(1, 3, 0.0);
    rig.set_axis(1, 0, -1.0);
    let reading = n.read_controls(&ControlInput::hardware(&rig, 0.0, TICK_MS));
    assert!((reading.command.throttle - 1.0).abs() < 1e-6);
    assert!((reading.command.brake - 0.5).abs() < 1e-6);
    assert!((reading.command.steer + 1.0).abs() < 1e-6);
}

#[test]
fn disconnected_wheel_fails_safe_and_recovers() {
    let mut n = normalizer();
    let keyboard_only = ControllerSnapshot::new(vec![DeviceSnapshot::new("Keyboard", 2, 4)]);
    let reading = n.read_controls(&ControlInput::hardware(&keyboard_only, 0.0, TICK_MS));
    assert_eq!(reading.source, InputSource::Hardware);
    assert_eq!(reading.faults.len(), 3);
    assert!(
        reading
            .faults
            .iter()
            .all(|f| f.error == DeviceError::not_found(1))
    );
    assert!((reading.command.brake - 1.0).abs() < f32::EPSILON);
    assert!(reading.command.steer.abs() < f32::EPSILON);

    let rig = ControllerSnapshot::fanatec_rig();
    let recovered = n.read_controls(&ControlInput::hardware(&rig, 0.0, TICK_MS));
    assert!(recovered.faults.is_empty());
    assert!(recovered.command.brake.abs() < f32::EPSILON);
}

#[test]
fn nan_reading_is_reported_per_axis() {
    let mut n = normalizer();
    let mut rig = ControllerSnapshot::fanatec_rig();
    rig.set_axis(1, 0, f32::NAN);
    let reading = n.read_controls(&ControlInput::hardware(&rig, 0.0, TICK_MS));
    assert_eq!(reading.faults.len(), 1);
    assert_eq!(
        reading.faults.first().map(|f| f.control),
        Some(AxisControl::Steer)
    );
}

#[test]
fn keyboard_fallback_drives() {
    let mut n = normalizer();
    let keys = KeyboardState {
        accelerate: true,
        right: true,
        ..KeyboardState::default()
    };
    let mut last = None;
    for _ in 0..120 {
        last = Some(n.read_controls(&ControlInput::keyboard(keys, 0.0, TICK_MS)));
    }
    let reading = must_some(last, "at least one reading");
    assert_eq!(reading.source, InputSource::Keyboard);
    assert!((reading.command.throttle - 1.0).abs() < f32::EPSILON);
    assert!(reading.command.brake.abs() < f32::EPSILON);
    assert!((reading.command.steer - 0.7).abs() < 1e-6);

    let released = n.read_controls(&ControlInput::keyboard(KeyboardState::default(), 0.0, TICK_MS));
    assert!(released.command.steer.abs() < f32::EPSILON);
    assert!(released.command.throttle.abs() < f32::EPSILON);
}

#[test]
fn keyboard_reverse_is_edge_triggered() {
    let mut n = normalizer();
    let held = KeyboardState {
        reverse: true,
        ..KeyboardState::default()
    };
    for _ in 0..10 {
        n.read_controls(&ControlInput::keyboard(held, 0.0, TICK_MS));
    }
    assert_eq!(n.transmission().gear(), -1);
}

#[test]
fn restart_button_is_reported_once() {
    let mut n = normalizer();
    let mut rig = ControllerSnapshot::fanatec_rig();
    rig.set_button(1, 8, true);
    let first = n.read_controls(&ControlInput::hardware(&rig, 0.0, TICK_MS));
    let second = n.read_controls(&ControlInput::hardware(&rig, 0.0, TICK_MS));
    assert!(first.restart_requested());
    assert!(!second.restart_requested());
}

#[test]
fn startup_check_reports_short_device() {
    let n = normalizer();
    let rig = ControllerSnapshot::new(vec![
        DeviceSnapshot::new("Keyboard", 2, 4),
        DeviceSnapshot::new("Wheel", 4, 6),
    ]);
    let issues = n.check_hardware(&DeviceInventory::from_snapshot(&rig));
    let controls: Vec<_> = issues.iter().map(|i| i.control).collect();
    assert_eq!(controls, vec!["restart"]);
}
