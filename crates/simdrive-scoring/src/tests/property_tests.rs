//! Property-based tests for the scoring engine.

use crate::*;
use proptest::prelude::*;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
enum Step {
    Collision { gap_ms: u64 },
    Lane { frames: u64, dot: Option<f32>, solid: bool },
    Tick { frames: u64, speed: f32 },
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0u64..5000).prop_map(|gap_ms| Step::Collision { gap_ms }),
        (0u64..120, proptest::option::of(-1.0f32..=1.0), any::<bool>())
            .prop_map(|(frames, dot, solid)| Step::Lane { frames, dot, solid }),
        (0u64..400, 0.0f32..250.0).prop_map(|(frames, speed)| Step::Tick { frames, speed }),
    ]
}

fn build(config: ScoringConfig) -> Result<ViolationEngine, TestCaseError> {
    ViolationEngine::new(config).map_err(|e| TestCaseError::fail(e.to_string()))
}

fn small_start() -> ScoringConfig {
    ScoringConfig {
        initial_score: 40,
        ..ScoringConfig::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn score_never_negative_and_totals_add_up(steps in proptest::collection::vec(step(), 1..200)) {
        let config = small_start();
        let mut engine = build(config.clone())?;
        let mut now = Instant::now();
        let mut frame = 0u64;
        let mut deducted = 0u64;

        for step in steps {
            let assessment = match step {
                Step::Collision { gap_ms } => {
                    now += Duration::from_millis(gap_ms);
                    engine.on_collision(&InfractionEvent::collision(frame, 1.0), now)
                }
                Step::Lane { frames, dot, solid } => {
                    frame += frames;
                    let marking = if solid {
                        LaneMarkingType::Solid
                    } else {
                        LaneMarkingType::Broken
                    };
                    let mut event = InfractionEvent::lane_crossing(frame, [marking]);
                    event.direction_dot = dot;
                    engine.on_lane_invasion(&event, None, None)
                }
                Step::Tick { frames, speed } => {
                    frame += frames;
                    engine.on_tick(speed, frame)
                }
            };
            deducted += u64::from(assessment.points());
        }

        let state = engine.state();
        let expected = u64::from(config.initial_score).saturating_sub(deducted);
        prop_assert_eq!(u64::from(state.current_score), expected);
        prop_assert_eq!(
            u64::from(state.total_lost_to_collisions)
                + u64::from(state.total_lost_to_lane_violations),
            deducted
        );
    }

    #[test]
    fn speeding_never_changes_score(speeds in proptest::collection::vec(0.0f32..300.0, 1..300)) {
        let mut engine = build(ScoringConfig::default())?;
        for (frame, speed) in (0u64..).zip(speeds) {
            let assessment = engine.on_tick(speed, frame);
            prop_assert_eq!(assessment.points(), 0);
        }
        prop_assert_eq!(engine.score(), 1000);
    }

    #[test]
    fn lane_penalties_at_most_once_per_window(gaps in proptest::collection::vec(0u64..60, 1..100)) {
        let mut engine = build(ScoringConfig::default())?;
        let mut frame = 0u64;
        let mut last_penalty: Option<u64> = None;
        for gap in gaps {
            frame += gap;
            let event = InfractionEvent::lane_crossing(frame, [LaneMarkingType::Broken])
                .with_direction_dot(1.0);
            let a = engine.on_lane_invasion(&event, None, None);
            if a.is_penalty() {
                if let Some(last) = last_penalty {
                    prop_assert!(frame - last >= 30, "penalties {} frames apart", frame - last);
                }
                last_penalty = Some(frame);
            }
        }
    }

    #[test]
    fn classification_is_total(dot in proptest::option::of(-1.5f32..1.5), solid in any::<bool>()) {
        let crossed = if solid {
            vec![LaneMarkingType::SolidSolid]
        } else {
            vec![LaneMarkingType::Broken]
        };
        let violation = classify_lane_violation(dot, &crossed, -0.7);
        match dot {
            None => prop_assert_eq!(violation, LaneViolation::Unknown),
            Some(d) if d < -0.7 => prop_assert_eq!(violation, LaneViolation::Oncoming),
            Some(_) if solid => prop_assert_eq!(violation, LaneViolation::SolidLine),
            Some(_) => prop_assert_eq!(violation, LaneViolation::Drift),
        }
    }
}
