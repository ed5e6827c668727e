//! Driving infraction scoring for simdrive.
//!
//! The [`ViolationEngine`] consumes collision and lane-invasion events from
//! the simulation backend plus the vehicle speed each tick, and produces
//! score changes and driver feedback. Feedback is returned as data: a
//! [`NotificationRequest`] for the display layer and a [`SoundRequest`] that
//! the caller gates through a [`SoundCueSystem`].
//!
//! # Penalties
//!
//! | Infraction | Points | Cooldown |
//! |---|---|---|
//! | Collision | 15 | 2.0 s wall clock |
//! | Oncoming lane | 5 x 3 | 30 frames, shared by all lane kinds |
//! | Solid line | 5 x 1.5 (floored) | shared |
//! | Lane drift / unknown lane | 5 | shared |
//! | Speeding (> 120 km/h) | alert only | 180 frames, re-armed below the limit |
//!
//! # Example
//!
//! ```rust
//! use simdrive_scoring::{InfractionEvent, ScoringConfig, ViolationEngine};
//! use std::time::Instant;
//!
//! # fn main() -> Result<(), simdrive_scoring::ScoringError> {
//! let mut engine = ViolationEngine::new(ScoringConfig::default())?;
//! let assessment = engine.on_collision(&InfractionEvent::collision(12, 480.0), Instant::now());
//! assert_eq!(assessment.points(), 15);
//! assert_eq!(engine.score(), 985);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_debug_implementations, rust_2018_idioms)]

mod classify;
mod config;
mod cooldown;
mod engine;
mod error;
mod event;
mod notify;
mod sound;

pub mod prelude;

pub use classify::{
    LaneMarkingType, LaneViolation, LaneWaypoint, Vector2, VehiclePose, classify_lane_violation,
    heading_dot,
};
pub use config::ScoringConfig;
pub use cooldown::{FrameCooldown, WallCooldown};
pub use engine::{
    Assessment, CollisionRecord, InfractionCounters, Outcome, PenaltyCooldowns, ScoreState,
    ViolationEngine, ViolationKind,
};
pub use error::{ScoringError, ScoringResult};
pub use event::{InfractionEvent, InfractionKind};
pub use notify::{
    ActiveNotification, CRITICAL_DURATION_SECS, DEDUP_MIN_REMAINING_SECS, ERROR_DURATION_SECS,
    INFO_DURATION_SECS, NotificationBoard, NotificationRequest, NotificationSeverity,
    PENALTY_DURATION_SECS, PostOutcome, Rgb,
};
pub use sound::{SoundCooldowns, SoundCue, SoundCueSystem, SoundRequest};

#[cfg(test)]
mod tests;
