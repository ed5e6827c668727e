//! Gear selection state machine

use serde::{Deserialize, Serialize};

use crate::REVERSE_EXIT_SPEED;
use crate::types::{DEFAULT_MAX_FORWARD_GEAR, DRIVE_GEAR, NEUTRAL_GEAR, REVERSE_GEAR};

/// Persistent gear and transmission mode.
///
/// Starts in automatic mode with the drive gear selected. Gear changes made
/// by [`shift_up`](Self::shift_up) and [`shift_down`](Self::shift_down) only
/// apply in manual mode; the gear never drops below reverse or rises above
/// the configured maximum forward gear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transmission {
    gear: i32,
    manual: bool,
    max_forward_gear: i32,
}

impl Default for Transmission {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FORWARD_GEAR)
    }
}

impl Transmission {
    pub fn new(max_forward_gear: i32) -> Self {
        Self {
            gear: DRIVE_GEAR,
            manual: false,
            max_forward_gear: max_forward_gear.max(DRIVE_GEAR),
        }
    }

    pub fn gear(&self) -> i32 {
        self.gear
    }

    pub fn is_manual(&self) -> bool {
        self.manual
    }

    pub fn is_reverse(&self) -> bool {
        self.gear < NEUTRAL_GEAR
    }

    pub fn max_forward_gear(&self) -> i32 {
        self.max_forward_gear
    }

    /// Enter or leave reverse.
    ///
    /// Leaving reverse selects first gear while the vehicle still moves
    /// (speed above [`REVERSE_EXIT_SPEED`]) and neutral otherwise.
    pub fn toggle_reverse(&mut self, speed: f32) -> i32 {
        self.gear = if self.is_reverse() {
            if speed > REVERSE_EXIT_SPEED {
                DRIVE_GEAR
            } else {
                NEUTRAL_GEAR
            }
        } else {
            REVERSE_GEAR
        };
        self.gear
    }

    /// Switch between manual and automatic. Returns the new mode.
    ///
    /// Manual starts in neutral; automatic forces the drive gear.
    pub fn toggle_manual(&mut self) -> bool {
        self.manual = !self.manual;
        self.gear = if self.manual {
            NEUTRAL_GEAR
        } else {
            DRIVE_GEAR
        };
        self.manual
    }

    /// Shift up one gear in manual mode. Returns `true` if the gear changed.
    pub fn shift_up(&mut self) -> bool {
        self.shift(1)
    }

    /// Shift down one gear in manual mode. Returns `true` if the gear changed.
    pub fn shift_down(&mut self) -> bool {
        self.shift(-1)
    }

    fn shift(&mut self, delta: i32) -> bool {
        if !self.manual {
            return false;
        }
        let next = (self.gear + delta).clamp(REVERSE_GEAR, self.max_forward_gear);
        let changed = next != self.gear;
        self.gear = next;
        changed
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.max_forward_gear);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_automatic_in_drive() {
        let t = Transmission::default();
        assert_eq!(t.gear(), DRIVE_GEAR);
        assert!(!t.is_manual());
        assert!(!t.is_reverse());
    }

    #[test]
    fn test_reverse_exit_stationary_goes_neutral() {
        let mut t = Transmission::default();
        assert_eq!(t.toggle_reverse(0.0), REVERSE_GEAR);
        assert!(t.is_reverse());
        assert_eq!(t.toggle_reverse(0.0), NEUTRAL_GEAR);
        assert!(!t.is_reverse());
    }

    #[test]
    fn test_reverse_exit_moving_goes_first() {
        let mut t = Transmission::default();
        t.toggle_reverse(0.0);
        assert_eq!(t.toggle_reverse(0.5), DRIVE_GEAR);
    }

    #[test]
    fn test_reverse_exit_threshold_is_exclusive() {
        let mut t = Transmission::default();
        t.toggle_reverse(0.0);
        assert_eq!(t.toggle_reverse(REVERSE_EXIT_SPEED), NEUTRAL_GEAR);
    }

    #[test]
    fn test_shift_ignored_in_automatic() {
        let mut t = Transmission::default();
        assert!(!t.shift_up());
        assert!(!t.shift_down());
        assert_eq!(t.gear(), DRIVE_GEAR);
    }

    #[test]
    fn test_manual_toggle_resets_gears() {
        let mut t = Transmission::default();
        t.toggle_reverse(0.0);
        assert!(t.toggle_manual());
        assert_eq!(t.gear(), NEUTRAL_GEAR);
        t.shift_up();
        t.shift_up();
        assert_eq!(t.gear(), 2);
        assert!(!t.toggle_manual());
        assert_eq!(t.gear(), DRIVE_GEAR);
        assert!(!t.is_reverse());
    }

    #[test]
    fn test_manual_clamps_both_ends() {
        let mut t = Transmission::new(3);
        t.toggle_manual();
        for _ in 0..10 {
            t.shift_down();
        }
        assert_eq!(t.gear(), REVERSE_GEAR);
        assert!(!t.shift_down());
        for _ in 0..10 {
            t.shift_up();
        }
        assert_eq!(t.gear(), 3);
        assert!(!t.shift_up());
    }

    #[test]
    fn test_reset_keeps_max_gear() {
        let mut t = Transmission::new(4);
        t.toggle_manual();
        t.reset();
        assert_eq!(t.gear(), DRIVE_GEAR);
        assert!(!t.is_manual());
        assert_eq!(t.max_forward_gear(), 4);
    }
}
