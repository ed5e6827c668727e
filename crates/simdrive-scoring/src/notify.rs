//! Driver notifications and the on-screen stacking policy.
//!
//! Non-critical notifications stack and fade independently; posting the same
//! text again while the previous copy is still clearly visible refreshes it
//! instead of adding a duplicate. Critical alerts are never merged and always
//! render above the stack.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// How long a notification stays visible, by class.
pub const CRITICAL_DURATION_SECS: f32 = 3.0;
pub const PENALTY_DURATION_SECS: f32 = 2.5;
pub const INFO_DURATION_SECS: f32 = 2.0;
pub const ERROR_DURATION_SECS: f32 = 5.0;

/// Remaining time above which a repeated notification is refreshed in place.
pub const DEDUP_MIN_REMAINING_SECS: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl NotificationSeverity {
    pub fn is_critical(self) -> bool {
        self == NotificationSeverity::Critical
    }
}

/// RGB color hint for the display layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const PENALTY_RED: Rgb = Rgb(255, 50, 50);
    pub const ONCOMING_RED: Rgb = Rgb(255, 0, 0);
    pub const SOLID_ORANGE: Rgb = Rgb(255, 100, 0);
    pub const DRIFT_AMBER: Rgb = Rgb(255, 150, 50);
}

/// A message for the display layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub text: String,
    pub severity: NotificationSeverity,
    pub color_hint: Rgb,
    pub duration_secs: f32,
    /// Key used to merge repeats. `None` never merges.
    pub dedup_key: Option<String>,
}

impl NotificationRequest {
    fn stacked(text: String, severity: NotificationSeverity, color: Rgb, secs: f32) -> Self {
        Self {
            dedup_key: Some(text.clone()),
            text,
            severity,
            color_hint: color,
            duration_secs: secs,
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::stacked(
            text.into(),
            NotificationSeverity::Info,
            Rgb::WHITE,
            INFO_DURATION_SECS,
        )
    }

    pub fn penalty(text: impl Into<String>, color: Rgb) -> Self {
        Self::stacked(
            text.into(),
            NotificationSeverity::Warning,
            color,
            PENALTY_DURATION_SECS,
        )
    }

    /// Error message, shown upper-cased with an `ERROR:` prefix.
    pub fn error(text: impl AsRef<str>) -> Self {
        Self::stacked(
            format!("ERROR: {}", text.as_ref().to_uppercase()),
            NotificationSeverity::Error,
            Rgb::PENALTY_RED,
            ERROR_DURATION_SECS,
        )
    }

    pub fn critical(text: impl Into<String>, color: Rgb) -> Self {
        Self {
            text: text.into(),
            severity: NotificationSeverity::Critical,
            color_hint: color,
            duration_secs: CRITICAL_DURATION_SECS,
            dedup_key: None,
        }
    }

    pub fn duration(&self) -> Duration {
        if self.duration_secs.is_finite() && self.duration_secs > 0.0 {
            Duration::from_secs_f32(self.duration_secs)
        } else {
            Duration::ZERO
        }
    }
}

/// A notification currently on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveNotification {
    pub request: NotificationRequest,
    pub posted_at: Instant,
    pub expires_at: Instant,
}

impl ActiveNotification {
    pub fn remaining(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }

    pub fn is_critical(&self) -> bool {
        self.request.severity.is_critical()
    }
}

/// What [`NotificationBoard::post`] did with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOutcome {
    Added,
    Refreshed,
}

/// Active notifications in posting order.
#[derive(Debug, Clone, Default)]
pub struct NotificationBoard {
    entries: Vec<ActiveNotification>,
}

impl NotificationBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Post a notification at `now`.
    pub fn post(&mut self, request: NotificationRequest, now: Instant) -> PostOutcome {
        let duration = request.duration();
        let merge_key = request
            .dedup_key
            .as_deref()
            .filter(|_| !request.severity.is_critical());
        if let Some(key) = merge_key {
            let min_remaining = Duration::from_secs_f32(DEDUP_MIN_REMAINING_SECS);
            if let Some(existing) = self.entries.iter_mut().find(|e| {
                !e.is_critical()
                    && e.request.dedup_key.as_deref() == Some(key)
                    && e.remaining(now) > min_remaining
            }) {
                existing.expires_at = now + duration;
                return PostOutcome::Refreshed;
            }
        }

        self.entries.push(ActiveNotification {
            request,
            posted_at: now,
            expires_at: now + duration,
        });
        PostOutcome::Added
    }

    /// Drop expired entries.
    pub fn tick(&mut self, now: Instant) {
        self.entries.retain(|e| e.expires_at > now);
    }

    /// Entries bottom to top: the stack in posting order, then critical alerts.
    pub fn render_order(&self) -> Vec<&ActiveNotification> {
        let (critical, stacked): (Vec<_>, Vec<_>) =
            self.entries.iter().partition(|e| e.is_critical());
        stacked.into_iter().chain(critical).collect()
    }

    /// Topmost critical alert, if any.
    pub fn active_critical(&self) -> Option<&ActiveNotification> {
        self.entries.iter().rev().find(|e| e.is_critical())
    }

    pub fn clear_non_critical(&mut self) {
        self.entries.retain(ActiveNotification::is_critical);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(start: Instant, millis: u64) -> Instant {
        start + Duration::from_millis(millis)
    }

    #[test]
    fn test_duplicate_text_refreshes() {
        let start = Instant::now();
        let mut board = NotificationBoard::new();
        let note = NotificationRequest::penalty("LANE DRIFT! -5 PTS", Rgb::DRIFT_AMBER);
        assert_eq!(board.post(note.clone(), start), PostOutcome::Added);
        assert_eq!(board.post(note, at(start, 1000)), PostOutcome::Refreshed);
        assert_eq!(board.len(), 1);

        board.tick(at(start, 3000));
        assert_eq!(board.len(), 1, "refresh should extend the expiry");
        board.tick(at(start, 3600));
        assert!(board.is_empty());
    }

    #[test]
    fn test_nearly_expired_duplicate_is_re_added() {
        let start = Instant::now();
        let mut board = NotificationBoard::new();
        let note = NotificationRequest::info("Handbrake On");
        board.post(note.clone(), start);
        assert_eq!(board.post(note, at(start, 1600)), PostOutcome::Added);
        assert_eq!(board.len(), 2);
    }

    #[test]
    fn test_critical_never_merges() {
        let start = Instant::now();
        let mut board = NotificationBoard::new();
        let alert = NotificationRequest::critical("EXCESSIVE SPEED!", Rgb::ONCOMING_RED);
        board.post(alert.clone(), start);
        assert_eq!(board.post(alert, at(start, 100)), PostOutcome::Added);
        assert_eq!(board.len(), 2);
    }

    #[test]
    fn test_critical_renders_on_top() {
        let start = Instant::now();
        let mut board = NotificationBoard::new();
        board.post(
            NotificationRequest::critical("ONCOMING LANE! -15 PTS", Rgb::ONCOMING_RED),
            start,
        );
        board.post(NotificationRequest::info("Gear: 2"), at(start, 10));
        board.post(
            NotificationRequest::penalty("COLLISION! -15 PTS", Rgb::PENALTY_RED),
            at(start, 20),
        );

        let order: Vec<&str> = board
            .render_order()
            .into_iter()
            .map(|e| e.request.text.as_str())
            .collect();
        assert_eq!(
            order,
            vec!["Gear: 2", "COLLISION! -15 PTS", "ONCOMING LANE! -15 PTS"]
        );
        assert_eq!(
            board.active_critical().map(|e| e.request.text.as_str()),
            Some("ONCOMING LANE! -15 PTS")
        );
    }

    #[test]
    fn test_clear_non_critical_keeps_alerts() {
        let start = Instant::now();
        let mut board = NotificationBoard::new();
        board.post(NotificationRequest::info("Vehicle Ready!"), start);
        board.post(
            NotificationRequest::critical("EXCESSIVE SPEED!", Rgb::ONCOMING_RED),
            start,
        );
        board.clear_non_critical();
        assert_eq!(board.len(), 1);
        assert!(board.active_critical().is_some());
    }

    #[test]
    fn test_error_text_format() {
        let note = NotificationRequest::error("failed to attach gnss sensor");
        assert_eq!(note.text, "ERROR: FAILED TO ATTACH GNSS SENSOR");
        assert_eq!(note.severity, NotificationSeverity::Error);
        assert!((note.duration_secs - ERROR_DURATION_SECS).abs() < f32::EPSILON);
    }

    #[test]
    fn test_invalid_duration_expires_immediately() {
        let start = Instant::now();
        let mut board = NotificationBoard::new();
        let mut note = NotificationRequest::info("x");
        note.duration_secs = f32::NAN;
        board.post(note, start);
        board.tick(start);
        assert!(board.is_empty());
    }
}
