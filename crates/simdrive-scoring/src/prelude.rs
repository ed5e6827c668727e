//! Prelude for convenient imports.
//!
//! ```rust
//! use simdrive_scoring::prelude::*;
//! ```

pub use crate::{
    Assessment, InfractionEvent, InfractionKind, LaneMarkingType, LaneViolation, LaneWaypoint,
    NotificationBoard, NotificationRequest, NotificationSeverity, Outcome, ScoreState,
    ScoringConfig, ScoringError, ScoringResult, SoundCooldowns, SoundCue, SoundCueSystem,
    SoundRequest, VehiclePose, ViolationEngine, ViolationKind,
};
