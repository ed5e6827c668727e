//! Audio cues for infractions.
//!
//! Each cue has its own cooldown so one repeating condition cannot drown out
//! the others. Forced cues bypass the cooldown.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use simdrive_errors::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    Collision,
    LaneDrift,
    SolidLine,
    Oncoming,
    Speeding,
    Error,
    Default,
}

impl SoundCue {
    pub const ALL: [SoundCue; 7] = [
        SoundCue::Collision,
        SoundCue::LaneDrift,
        SoundCue::SolidLine,
        SoundCue::Oncoming,
        SoundCue::Speeding,
        SoundCue::Error,
        SoundCue::Default,
    ];

    /// Asset name used by audio backends.
    pub fn asset_name(self) -> &'static str {
        match self {
            SoundCue::Collision => "collision",
            SoundCue::LaneDrift => "lane_drift",
            SoundCue::SolidLine => "solid_line",
            SoundCue::Oncoming => "oncoming",
            SoundCue::Speeding => "speeding",
            SoundCue::Error => "error",
            SoundCue::Default => "default",
        }
    }
}

/// A cue the engine wants played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundRequest {
    pub cue: SoundCue,
    /// Play even while the cue is cooling down.
    pub force: bool,
}

impl SoundRequest {
    pub fn new(cue: SoundCue) -> Self {
        Self { cue, force: false }
    }

    pub fn forced(cue: SoundCue) -> Self {
        Self { cue, force: true }
    }
}

/// Minimum seconds between two plays of the same cue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SoundCooldowns {
    pub collision: f32,
    pub lane_drift: f32,
    pub solid_line: f32,
    pub oncoming: f32,
    pub speeding: f32,
    pub error: f32,
    pub default: f32,
}

impl Default for SoundCooldowns {
    fn default() -> Self {
        Self {
            collision: 0.0,
            lane_drift: 3.0,
            solid_line: 2.0,
            oncoming: 1.0,
            speeding: 5.0,
            error: 0.0,
            default: 1.0,
        }
    }
}

impl SoundCooldowns {
    pub fn seconds(&self, cue: SoundCue) -> f32 {
        match cue {
            SoundCue::Collision => self.collision,
            SoundCue::LaneDrift => self.lane_drift,
            SoundCue::SolidLine => self.solid_line,
            SoundCue::Oncoming => self.oncoming,
            SoundCue::Speeding => self.speeding,
            SoundCue::Error => self.error,
            SoundCue::Default => self.default,
        }
    }

    pub fn window(&self, cue: SoundCue) -> Duration {
        let secs = self.seconds(cue);
        if secs.is_finite() && secs > 0.0 {
            Duration::from_secs_f32(secs)
        } else {
            Duration::ZERO
        }
    }

    /// # Errors
    ///
    /// Returns an error for a negative or non-finite cooldown.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for cue in SoundCue::ALL {
            let secs = self.seconds(cue);
            let field = format!("sound_cooldowns.{}", cue.asset_name());
            if !secs.is_finite() {
                return Err(ValidationError::not_finite(field));
            }
            if !(0.0..=60.0).contains(&secs) {
                return Err(ValidationError::out_of_range(field, secs, 0.0, 60.0));
            }
        }
        Ok(())
    }
}

/// Cooldown bookkeeping for sound cues.
#[derive(Debug, Clone)]
pub struct SoundCueSystem {
    enabled: bool,
    cooldowns: SoundCooldowns,
    last_played: HashMap<SoundCue, Instant>,
    suppressed: u64,
}

impl Default for SoundCueSystem {
    fn default() -> Self {
        Self::new(SoundCooldowns::default())
    }
}

impl SoundCueSystem {
    pub fn new(cooldowns: SoundCooldowns) -> Self {
        Self {
            enabled: true,
            cooldowns,
            last_played: HashMap::new(),
            suppressed: 0,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Decide whether `cue` plays at `now`, recording it if so.
    pub fn request(&mut self, cue: SoundCue, now: Instant, force: bool) -> bool {
        if !self.enabled {
            return false;
        }

        let ready = force
            || match self.last_played.get(&cue) {
                None => true,
                Some(last) => now.saturating_duration_since(*last) >= self.cooldowns.window(cue),
            };

        if ready {
            self.last_played.insert(cue, now);
        } else {
            self.suppressed = self.suppressed.saturating_add(1);
        }
        ready
    }

    pub fn submit(&mut self, request: SoundRequest, now: Instant) -> bool {
        self.request(request.cue, now, request.force)
    }

    /// Cues rejected while cooling down.
    pub fn suppressed(&self) -> u64 {
        self.suppressed
    }

    pub fn reset(&mut self) {
        self.last_played.clear();
        self.suppressed = 0;
    }
}
