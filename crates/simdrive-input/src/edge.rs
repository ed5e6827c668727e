//! Rising-edge detection for toggle buttons

use crate::types::ButtonControl;

/// Remembers the previous level of each button control.
///
/// [`rising`](EdgeDetector::rising) reports `true` only on the tick a button
/// goes from released to pressed, so holding a button toggles state once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeDetector {
    levels: [bool; ButtonControl::ALL.len()],
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the current level and return whether this is a rising edge.
    pub fn rising(&mut self, control: ButtonControl, pressed: bool) -> bool {
        let Some(slot) = self.levels.get_mut(slot_index(control)) else {
            return false;
        };
        let edge = pressed && !*slot;
        *slot = pressed;
        edge
    }

    /// Last level seen for a control.
    pub fn level(&self, control: ButtonControl) -> bool {
        self.levels.get(slot_index(control)).copied().unwrap_or(false)
    }

    /// Forget all levels, e.g. when switching input source.
    pub fn reset(&mut self) {
        self.levels = [false; ButtonControl::ALL.len()];
    }
}

const fn slot_index(control: ButtonControl) -> usize {
    match control {
        ButtonControl::Handbrake => 0,
        ButtonControl::Reverse => 1,
        ButtonControl::GearUp => 2,
        ButtonControl::GearDown => 3,
        ButtonControl::ManualToggle => 4,
        ButtonControl::Restart => 5,
        ButtonControl::Autopilot => 6,
    }
}
