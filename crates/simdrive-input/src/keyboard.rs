//! Keyboard fallback used when no controller hardware is present

use serde::{Deserialize, Serialize};

/// Maximum steering magnitude reachable from the keyboard.
pub const KEYBOARD_STEER_LIMIT: f32 = 0.7;

/// Steering change per elapsed millisecond while a turn key is held.
pub const KEYBOARD_STEER_RATE_PER_MS: f32 = 5e-4;

/// Key levels for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardState {
    pub accelerate: bool,
    pub brake: bool,
    pub left: bool,
    pub right: bool,
    pub handbrake: bool,
    pub reverse: bool,
    pub manual_toggle: bool,
    pub gear_up: bool,
    pub gear_down: bool,
    pub restart: bool,
    pub autopilot: bool,
}

/// Ramped digital steering.
///
/// Holding a turn key moves the cached angle toward the limit at a rate
/// proportional to the tick duration. The opposite key ramps back the same
/// way; releasing both keys re-centers immediately.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyboardSteer {
    cache: f32,
}

impl KeyboardSteer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the ramp and return the steer value for the command,
    /// rounded to one decimal.
    pub fn update(&mut self, left: bool, right: bool, elapsed_ms: f32) -> f32 {
        let elapsed_ms = if elapsed_ms.is_finite() {
            elapsed_ms.max(0.0)
        } else {
            0.0
        };
        let increment = KEYBOARD_STEER_RATE_PER_MS * elapsed_ms;

        self.cache = match (left, right) {
            (true, _) => self.cache - increment,
            (false, true) => self.cache + increment,
            (false, false) => 0.0,
        };
        self.cache = self.cache.clamp(-KEYBOARD_STEER_LIMIT, KEYBOARD_STEER_LIMIT);

        (self.cache * 10.0).round() / 10.0
    }

    /// Unrounded steering angle.
    pub fn raw(&self) -> f32 {
        self.cache
    }

    pub fn reset(&mut self) {
        self.cache = 0.0;
    }
}
