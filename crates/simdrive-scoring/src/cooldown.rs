//! Cooldown gates for penalty rate limiting.
//!
//! Both gates let the first occurrence through and then require the full
//! window to elapse (`elapsed >= window`) before firing again.

use std::time::{Duration, Instant};

/// Wall-clock gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallCooldown {
    window: Duration,
    last_fired: Option<Instant>,
    suppressed: u64,
}

impl WallCooldown {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_fired: None,
            suppressed: 0,
        }
    }

    /// Returns true if the gate is open at `now` without firing it.
    pub fn is_ready(&self, now: Instant) -> bool {
        match self.last_fired {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.window,
        }
    }

    /// Fire the gate if it is open. Returns whether it fired.
    pub fn try_fire(&mut self, now: Instant) -> bool {
        if self.is_ready(now) {
            self.last_fired = Some(now);
            true
        } else {
            self.suppressed = self.suppressed.saturating_add(1);
            false
        }
    }

    pub fn last_fired(&self) -> Option<Instant> {
        self.last_fired
    }

    /// Occurrences rejected while cooling down.
    pub fn suppressed(&self) -> u64 {
        self.suppressed
    }

    pub fn reset(&mut self) {
        self.last_fired = None;
        self.suppressed = 0;
    }
}

/// Simulation-frame gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCooldown {
    window: u64,
    last_fired: Option<u64>,
    suppressed: u64,
}

impl FrameCooldown {
    pub fn new(window_frames: u64) -> Self {
        Self {
            window: window_frames,
            last_fired: None,
            suppressed: 0,
        }
    }

    pub fn is_ready(&self, frame: u64) -> bool {
        match self.last_fired {
            None => true,
            // A frame counter that went backwards means a new simulation
            // episode; treat it as elapsed.
            Some(last) if frame < last => true,
            Some(last) => frame - last >= self.window,
        }
    }

    pub fn try_fire(&mut self, frame: u64) -> bool {
        if self.is_ready(frame) {
            self.last_fired = Some(frame);
            true
        } else {
            self.suppressed = self.suppressed.saturating_add(1);
            false
        }
    }

    pub fn last_fired(&self) -> Option<u64> {
        self.last_fired
    }

    pub fn suppressed(&self) -> u64 {
        self.suppressed
    }

    pub fn reset(&mut self) {
        self.last_fired = None;
        self.suppressed = 0;
    }
}
