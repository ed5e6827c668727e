//! Violation & scoring engine.
//!
//! Every infraction is counted. It is scored only when the cooldown for its
//! kind has elapsed: collisions use a wall-clock window, lane violations
//! share one frame window across all sub-kinds, and speeding alerts use a
//! frame window that re-arms as soon as the vehicle drops back under the
//! limit. The score never goes below zero.

use std::collections::VecDeque;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::classify::{
    LaneViolation, LaneWaypoint, VehiclePose, classify_lane_violation, heading_dot,
};
use crate::config::ScoringConfig;
use crate::cooldown::{FrameCooldown, WallCooldown};
use crate::event::{InfractionEvent, InfractionKind};
use crate::notify::{NotificationRequest, Rgb};
use crate::sound::{SoundCue, SoundRequest};
use crate::ScoringResult;

/// Everything the engine can penalize or alert on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Collision,
    Lane(LaneViolation),
    Speeding,
}

impl ViolationKind {
    pub fn name(self) -> &'static str {
        match self {
            ViolationKind::Collision => "collision",
            ViolationKind::Lane(LaneViolation::Oncoming) => "oncoming",
            ViolationKind::Lane(LaneViolation::SolidLine) => "solid_line",
            ViolationKind::Lane(LaneViolation::Drift) => "lane_drift",
            ViolationKind::Lane(LaneViolation::Unknown) => "lane_unknown",
            ViolationKind::Speeding => "speeding",
        }
    }
}

/// What an engine call decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Points were deducted.
    Penalized { kind: ViolationKind, points: u32 },
    /// Counted, but the kind is still cooling down.
    CoolingDown { kind: ViolationKind },
    /// Visual/audio alert without a penalty.
    Alerted { kind: ViolationKind },
    /// Nothing to report.
    Clear,
}

/// Result of one engine call: the decision plus the feedback to emit.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub outcome: Outcome,
    pub notification: Option<NotificationRequest>,
    pub sound: Option<SoundRequest>,
}

impl Assessment {
    fn quiet(outcome: Outcome) -> Self {
        Self {
            outcome,
            notification: None,
            sound: None,
        }
    }

    pub fn clear() -> Self {
        Self::quiet(Outcome::Clear)
    }

    pub fn points(&self) -> u32 {
        match self.outcome {
            Outcome::Penalized { points, .. } => points,
            _ => 0,
        }
    }

    pub fn is_penalty(&self) -> bool {
        matches!(self.outcome, Outcome::Penalized { .. })
    }
}

/// One recorded collision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionRecord {
    pub frame: u64,
    pub intensity: f32,
}

/// Occurrence tallies, counted regardless of cooldowns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfractionCounters {
    pub collisions: u64,
    pub lane_invasions: u64,
    pub oncoming: u64,
    pub solid_line: u64,
    pub lane_drift: u64,
    pub lane_unknown: u64,
    pub speeding_alerts: u64,
}

impl InfractionCounters {
    fn count_lane(&mut self, violation: LaneViolation) {
        let slot = match violation {
            LaneViolation::Oncoming => &mut self.oncoming,
            LaneViolation::SolidLine => &mut self.solid_line,
            LaneViolation::Drift => &mut self.lane_drift,
            LaneViolation::Unknown => &mut self.lane_unknown,
        };
        *slot = slot.saturating_add(1);
    }
}

/// Cooldown stamps per kind. Cleared with the rest of the run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenaltyCooldowns {
    pub collision: WallCooldown,
    pub lane: FrameCooldown,
    pub speeding: FrameCooldown,
}

/// Score and bookkeeping for one run (one spawned vehicle).
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreState {
    pub current_score: u32,
    pub total_lost_to_collisions: u32,
    pub total_lost_to_lane_violations: u32,
    pub counters: InfractionCounters,
    pub cooldowns: PenaltyCooldowns,
    pub collision_history: VecDeque<CollisionRecord>,
}

impl ScoreState {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            current_score: config.initial_score,
            total_lost_to_collisions: 0,
            total_lost_to_lane_violations: 0,
            counters: InfractionCounters::default(),
            cooldowns: PenaltyCooldowns {
                collision: WallCooldown::new(config.collision_cooldown()),
                lane: FrameCooldown::new(config.lane_cooldown_frames),
                speeding: FrameCooldown::new(config.speeding_cooldown_frames),
            },
            collision_history: VecDeque::new(),
        }
    }

    fn deduct(&mut self, points: u32) {
        self.current_score = self.current_score.saturating_sub(points);
    }
}

/// Turns infraction events and vehicle speed into score changes and feedback.
#[derive(Debug, Clone)]
pub struct ViolationEngine {
    config: ScoringConfig,
    state: ScoreState,
}

impl ViolationEngine {
    /// Create an engine with validated tunables.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringError::InvalidConfig`](crate::ScoringError::InvalidConfig)
    /// when the configuration does not validate.
    pub fn new(config: ScoringConfig) -> ScoringResult<Self> {
        config.validate()?;
        Ok(Self {
            state: ScoreState::new(&config),
            config,
        })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn state(&self) -> &ScoreState {
        &self.state
    }

    pub fn score(&self) -> u32 {
        self.state.current_score
    }

    /// Score a collision reported at wall-clock time `now`.
    pub fn on_collision(&mut self, event: &InfractionEvent, now: Instant) -> Assessment {
        if event.kind != InfractionKind::Collision {
            debug!(frame = event.frame, kind = ?event.kind, "Ignoring non-collision event");
            return Assessment::clear();
        }
        let state = &mut self.state;
        state.counters.collisions = state.counters.collisions.saturating_add(1);

        if state.collision_history.len() >= self.config.collision_history_capacity {
            state.collision_history.pop_front();
        }
        state.collision_history.push_back(CollisionRecord {
            frame: event.frame,
            intensity: event.intensity(),
        });

        let kind = ViolationKind::Collision;
        if !state.cooldowns.collision.try_fire(now) {
            debug!(frame = event.frame, "Collision within cooldown, not scored");
            return Assessment::quiet(Outcome::CoolingDown { kind });
        }

        let points = self.config.collision_penalty;
        state.deduct(points);
        state.total_lost_to_collisions = state.total_lost_to_collisions.saturating_add(points);
        info!(
            frame = event.frame,
            points,
            intensity = event.intensity(),
            other = event.other_actor.as_deref().unwrap_or("unknown"),
            score = state.current_score,
            "Collision penalty"
        );

        Assessment {
            outcome: Outcome::Penalized { kind, points },
            notification: Some(NotificationRequest::penalty(
                format!("COLLISION! -{points} PTS"),
                Rgb::PENALTY_RED,
            )),
            sound: Some(SoundRequest::new(SoundCue::Collision)),
        }
    }

    /// Score a lane invasion.
    ///
    /// The direction is taken from the event when the backend supplied a
    /// finite value, otherwise computed from `pose` and `waypoint`. Without either the
    /// crossing is classified as [`LaneViolation::Unknown`].
    pub fn on_lane_invasion(
        &mut self,
        event: &InfractionEvent,
        pose: Option<&VehiclePose>,
        waypoint: Option<&LaneWaypoint>,
    ) -> Assessment {
        if event.kind != InfractionKind::LaneCrossing {
            debug!(frame = event.frame, kind = ?event.kind, "Ignoring non-lane event");
            return Assessment::clear();
        }
        let reported = event.direction_dot.filter(|dot| dot.is_finite());
        let direction_dot = reported.or(match (pose, waypoint) {
            (Some(pose), Some(waypoint)) => Some(heading_dot(pose, waypoint)),
            _ => None,
        });
        let violation = classify_lane_violation(
            direction_dot,
            &event.crossed_markings,
            self.config.oncoming_dot_threshold,
        );

        let state = &mut self.state;
        state.counters.lane_invasions = state.counters.lane_invasions.saturating_add(1);
        state.counters.count_lane(violation);

        let kind = ViolationKind::Lane(violation);
        if !state.cooldowns.lane.try_fire(event.frame) {
            debug!(
                frame = event.frame,
                kind = kind.name(),
                "Lane violation within cooldown, not scored"
            );
            return Assessment::quiet(Outcome::CoolingDown { kind });
        }

        let points = self.lane_penalty(violation);
        let state = &mut self.state;
        state.deduct(points);
        state.total_lost_to_lane_violations =
            state.total_lost_to_lane_violations.saturating_add(points);
        info!(
            frame = event.frame,
            kind = kind.name(),
            points,
            dot = direction_dot,
            score = state.current_score,
            "Lane violation penalty"
        );

        let (notification, sound) = match violation {
            LaneViolation::Oncoming => (
                NotificationRequest::critical(
                    format!("ONCOMING LANE! -{points} PTS"),
                    Rgb::ONCOMING_RED,
                ),
                SoundRequest::forced(SoundCue::Oncoming),
            ),
            LaneViolation::SolidLine => (
                NotificationRequest::penalty(
                    format!("SOLID LINE! -{points} PTS"),
                    Rgb::SOLID_ORANGE,
                ),
                SoundRequest::new(SoundCue::SolidLine),
            ),
            LaneViolation::Drift => (
                NotificationRequest::penalty(
                    format!("LANE DRIFT! -{points} PTS"),
                    Rgb::DRIFT_AMBER,
                ),
                SoundRequest::new(SoundCue::LaneDrift),
            ),
            LaneViolation::Unknown => (
                NotificationRequest::penalty(
                    format!("LANE VIOLATION! -{points} PTS"),
                    Rgb::PENALTY_RED,
                ),
                SoundRequest::new(SoundCue::LaneDrift),
            ),
        };

        Assessment {
            outcome: Outcome::Penalized { kind, points },
            notification: Some(notification),
            sound: Some(sound),
        }
    }

    /// Per-tick speed check. Speeding is alert-only and never costs points.
    pub fn on_tick(&mut self, speed_kmh: f32, frame: u64) -> Assessment {
        let kind = ViolationKind::Speeding;
        let speeding = &mut self.state.cooldowns.speeding;

        let over_limit = speed_kmh > self.config.speed_limit_kmh;
        if !over_limit {
            speeding.reset();
            return Assessment::clear();
        }
        if !speeding.try_fire(frame) {
            return Assessment::quiet(Outcome::CoolingDown { kind });
        }

        let counters = &mut self.state.counters;
        counters.speeding_alerts = counters.speeding_alerts.saturating_add(1);
        info!(frame, speed_kmh, limit = self.config.speed_limit_kmh, "Speeding alert");

        Assessment {
            outcome: Outcome::Alerted { kind },
            notification: Some(NotificationRequest::critical(
                "EXCESSIVE SPEED!",
                Rgb::ONCOMING_RED,
            )),
            sound: Some(SoundRequest::new(SoundCue::Speeding)),
        }
    }

    /// Start a new run: initial score, zero totals, all cooldowns cleared.
    pub fn reset(&mut self) {
        self.state = ScoreState::new(&self.config);
        info!(score = self.state.current_score, "Score reset");
    }

    /// Integer-floored lane penalty for a sub-kind.
    #[expect(
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation,
        reason = "value is finite, positive and clamped to the u32 range"
    )]
    pub fn lane_penalty(&self, violation: LaneViolation) -> u32 {
        let multiplier = violation.multiplier(
            self.config.oncoming_multiplier,
            self.config.solid_line_multiplier,
        );
        let scaled = f64::from(self.config.lane_base_penalty) * f64::from(multiplier);
        if scaled.is_finite() && scaled > 0.0 {
            scaled.floor().min(f64::from(u32::MAX)) as u32
        } else {
            0
        }
    }
}
