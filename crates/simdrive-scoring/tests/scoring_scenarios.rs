//! End-to-end scoring runs: engine decisions fed through the notification
//! board and the sound cue system the way a session drives them.

use simdrive_scoring::prelude::*;
use simdrive_test_helpers::must;
use std::time::{Duration, Instant};

struct Run {
    engine: ViolationEngine,
    board: NotificationBoard,
    sounds: SoundCueSystem,
    played: Vec<SoundCue>,
}

impl Run {
    fn new() -> Self {
        Self {
            engine: must(ViolationEngine::new(ScoringConfig::default())),
            board: NotificationBoard::new(),
            sounds: SoundCueSystem::default(),
            played: Vec::new(),
        }
    }

    fn apply(&mut self, assessment: Assessment, now: Instant) -> Assessment {
        if let Some(note) = assessment.notification.clone() {
            self.board.post(note, now);
        }
        if let Some(sound) = assessment.sound {
            if self.sounds.submit(sound, now) {
                self.played.push(sound.cue);
            }
        }
        assessment
    }
}

#[test]
fn city_drive_with_mixed_infractions() {
    let start = Instant::now();
    let at = |ms: u64| start + Duration::from_millis(ms);
    let mut run = Run::new();

    let hit = InfractionEvent::collision(10, 900.0).with_other_actor("vehicle.audi.tt");
    let a = run.engine.on_collision(&hit, at(0));
    run.apply(a, at(0));

    let drift =
        InfractionEvent::lane_crossing(60, [LaneMarkingType::Broken]).with_direction_dot(0.97);
    let a = run.engine.on_lane_invasion(&drift, None, None);
    run.apply(a, at(800));

    // Second drift after the lane window but inside the drift sound cooldown.
    let drift =
        InfractionEvent::lane_crossing(95, [LaneMarkingType::Broken]).with_direction_dot(0.97);
    let a = run.engine.on_lane_invasion(&drift, None, None);
    let a = run.apply(a, at(1400));
    assert_eq!(a.points(), 5);

    let pose = VehiclePose::from_yaw_degrees(181.0);
    let lane = LaneWaypoint::from_yaw_degrees(0.0);
    let oncoming = InfractionEvent::lane_crossing(130, [LaneMarkingType::SolidSolid]);
    let a = run.engine.on_lane_invasion(&oncoming, Some(&pose), Some(&lane));
    let a = run.apply(a, at(2000));
    assert_eq!(a.points(), 15);

    assert_eq!(run.engine.score(), 1000 - 15 - 5 - 5 - 15);
    assert_eq!(
        run.played,
        vec![SoundCue::Collision, SoundCue::LaneDrift, SoundCue::Oncoming]
    );
    assert_eq!(
        run.board.active_critical().map(|n| n.request.text.as_str()),
        Some("ONCOMING LANE! -15 PTS")
    );
    // The repeated drift text refreshed in place.
    assert_eq!(run.board.len(), 3);
}

#[test]
fn collision_burst_scores_once_per_window() {
    let start = Instant::now();
    let mut run = Run::new();
    let mut scored = 0;
    for i in 0..30u64 {
        let now = start + Duration::from_millis(i * 200);
        let a = run.engine.on_collision(&InfractionEvent::collision(i, 50.0), now);
        if run.apply(a, now).is_penalty() {
            scored += 1;
        }
    }
    // 0.0s, 2.0s, 4.0s
    assert_eq!(scored, 3);
    assert_eq!(run.engine.state().counters.collisions, 30);
    assert_eq!(run.engine.score(), 955);
    assert_eq!(run.played.len(), 3);
}

#[test]
fn speeding_feedback_throttled_by_both_gates() {
    let start = Instant::now();
    let mut run = Run::new();
    let mut alerts = 0;
    // 20 Hz for 12 seconds at 140 km/h.
    for frame in 0..240u64 {
        let now = start + Duration::from_millis(frame * 50);
        let a = run.engine.on_tick(140.0, frame);
        if matches!(run.apply(a, now).outcome, Outcome::Alerted { .. }) {
            alerts += 1;
        }
    }
    // Frames 0 and 180.
    assert_eq!(alerts, 2);
    assert_eq!(run.played, vec![SoundCue::Speeding, SoundCue::Speeding]);
    assert_eq!(run.engine.score(), 1000);
}

#[test]
fn respawn_starts_a_fresh_run() {
    let start = Instant::now();
    let mut run = Run::new();
    for i in 0..4u64 {
        let now = start + Duration::from_secs(i * 3);
        let a = run.engine.on_collision(&InfractionEvent::collision(i * 100, 10.0), now);
        run.apply(a, now);
    }
    assert_eq!(run.engine.score(), 940);

    run.engine.reset();
    run.board.clear_non_critical();
    run.sounds.reset();

    assert_eq!(run.engine.score(), 1000);
    assert!(run.board.is_empty());
    let now = start + Duration::from_secs(10);
    let a = run.engine.on_collision(&InfractionEvent::collision(0, 10.0), now);
    assert!(a.is_penalty());
}

#[test]
fn config_from_json_overrides_defaults() {
    let config: ScoringConfig = must(serde_json::from_str(
        r#"{ "collision_penalty": 25, "speed_limit_kmh": 90.0 }"#,
    ));
    let mut engine = must(ViolationEngine::new(config));
    assert_eq!(
        engine.on_collision(&InfractionEvent::collision(1, 1.0), Instant::now()).points(),
        25
    );
    assert!(matches!(engine.on_tick(95.0, 1).outcome, Outcome::Alerted { .. }));
}

#[test]
fn invalid_config_is_rejected() {
    let config = ScoringConfig {
        collision_cooldown_secs: f32::NAN,
        ..ScoringConfig::default()
    };
    assert!(matches!(
        ViolationEngine::new(config),
        Err(ScoringError::InvalidConfig(_))
    ));
}
