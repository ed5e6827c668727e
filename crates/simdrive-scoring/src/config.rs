//! Scoring tunables.

use core::time::Duration;

use serde::{Deserialize, Serialize};
use simdrive_errors::{ValidationError, validate_range};

/// Penalties, multipliers and cooldown windows for the violation engine.
///
/// The defaults reproduce the demo scoring rules: 1000 starting points,
/// 15 points per collision at most every two seconds, and a 5 point lane
/// penalty scaled by how severe the crossing was.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    /// Score at the start of every run.
    pub initial_score: u32,
    /// Points deducted per scored collision.
    pub collision_penalty: u32,
    /// Wall-clock seconds between scored collisions.
    pub collision_cooldown_secs: f32,
    /// Base points for any lane violation.
    pub lane_base_penalty: u32,
    /// Multiplier for driving against the lane direction.
    pub oncoming_multiplier: f32,
    /// Multiplier for crossing a solid marking.
    pub solid_line_multiplier: f32,
    /// Simulation frames between scored lane violations of any sub-kind.
    pub lane_cooldown_frames: u64,
    /// Dot product below which a crossing counts as oncoming.
    pub oncoming_dot_threshold: f32,
    /// Speed above which the speeding alert fires.
    pub speed_limit_kmh: f32,
    /// Simulation frames between speeding alerts while above the limit.
    pub speeding_cooldown_frames: u64,
    /// Number of collision records kept for the run.
    pub collision_history_capacity: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            initial_score: 1000,
            collision_penalty: 15,
            collision_cooldown_secs: 2.0,
            lane_base_penalty: 5,
            oncoming_multiplier: 3.0,
            solid_line_multiplier: 1.5,
            lane_cooldown_frames: 30,
            oncoming_dot_threshold: -0.7,
            speed_limit_kmh: 120.0,
            speeding_cooldown_frames: 180,
            collision_history_capacity: 4000,
        }
    }
}

impl ScoringConfig {
    pub fn collision_cooldown(&self) -> Duration {
        Duration::from_secs_f32(self.collision_cooldown_secs.max(0.0))
    }

    /// Validate all tunables.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.initial_score == 0 {
            return Err(ValidationError::not_positive("initial_score", self.initial_score));
        }
        if self.lane_base_penalty == 0 {
            return Err(ValidationError::not_positive(
                "lane_base_penalty",
                self.lane_base_penalty,
            ));
        }
        for (field, value) in [
            ("collision_cooldown_secs", self.collision_cooldown_secs),
            ("oncoming_multiplier", self.oncoming_multiplier),
            ("solid_line_multiplier", self.solid_line_multiplier),
            ("oncoming_dot_threshold", self.oncoming_dot_threshold),
            ("speed_limit_kmh", self.speed_limit_kmh),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::not_finite(field));
            }
        }
        validate_range!("collision_cooldown_secs", self.collision_cooldown_secs, 0.0, 60.0);
        validate_range!("oncoming_multiplier", self.oncoming_multiplier, 1.0, 10.0);
        validate_range!("solid_line_multiplier", self.solid_line_multiplier, 1.0, 10.0);
        validate_range!("oncoming_dot_threshold", self.oncoming_dot_threshold, -1.0, 0.0);
        if self.speed_limit_kmh <= 0.0 {
            return Err(ValidationError::not_positive(
                "speed_limit_kmh",
                self.speed_limit_kmh,
            ));
        }
        if self.collision_history_capacity == 0 {
            return Err(ValidationError::not_positive(
                "collision_history_capacity",
                self.collision_history_capacity,
            ));
        }
        Ok(())
    }

    /// Preset for a quick demo: shorter cooldowns so repeated mistakes show up.
    pub fn strict() -> Self {
        Self {
            collision_cooldown_secs: 1.0,
            lane_cooldown_frames: 15,
            speed_limit_kmh: 90.0,
            ..Self::default()
        }
    }
}
