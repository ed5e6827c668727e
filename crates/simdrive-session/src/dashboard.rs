//! Dashboard readout.

use serde::Serialize;
use simdrive_input::{ControlCommand, InputSource, gear_label};
use simdrive_scoring::{InfractionCounters, ScoreState};

use crate::ports::Vector3;
use crate::sensor::GnssFix;

/// Idle engine speed shown when the vehicle is stopped.
pub const IDLE_RPM: f32 = 800.0;

/// Speed in km/h for a velocity in m/s.
pub fn speed_kmh(velocity: Vector3) -> f32 {
    3.6 * velocity.length()
}

/// Approximate engine speed from the throttle and road speed.
///
/// The simulator does not report engine speed, so the dashboard fakes a
/// plausible needle: throttle dominates, then road speed, then idle.
/// Returns 0 when `max_rpm` is unknown.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is clamped to [IDLE_RPM, max_rpm] and rounded down"
)]
pub fn estimate_rpm(throttle: f32, speed_kmh: f32, max_rpm: f32) -> u32 {
    if !max_rpm.is_finite() || max_rpm <= 0.0 {
        return 0;
    }
    let rpm = if throttle > 0.01 {
        throttle * max_rpm * 0.8 + 1000.0
    } else if speed_kmh > 1.0 {
        (speed_kmh / 100.0) * (max_rpm / 3.0) + 800.0
    } else {
        IDLE_RPM
    };
    let rpm = if rpm.is_finite() { rpm } else { IDLE_RPM };
    rpm.min(max_rpm).max(IDLE_RPM).floor() as u32
}

/// Values shown on the HUD for one tick.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DashboardSnapshot {
    pub frame: u64,
    pub score: u32,
    pub speed_kmh: f32,
    pub rpm: u32,
    pub gear: String,
    pub manual: bool,
    pub handbrake: bool,
    pub input_source: Option<InputSource>,
    pub collision_penalty_total: u32,
    pub lane_penalty_total: u32,
    pub counters: InfractionCounters,
    pub gnss: Option<GnssFix>,
}

impl DashboardSnapshot {
    pub fn capture(
        frame: u64,
        command: &ControlCommand,
        score: &ScoreState,
        speed_kmh: f32,
        max_rpm: Option<f32>,
        gnss: Option<GnssFix>,
    ) -> Self {
        Self {
            frame,
            score: score.current_score,
            speed_kmh,
            rpm: max_rpm.map_or(0, |max| estimate_rpm(command.throttle, speed_kmh, max)),
            gear: gear_label(command.gear),
            manual: command.manual,
            handbrake: command.handbrake,
            input_source: None,
            collision_penalty_total: score.total_lost_to_collisions,
            lane_penalty_total: score.total_lost_to_lane_violations,
            counters: score.counters,
            gnss,
        }
    }

    pub fn with_input_source(mut self, source: InputSource) -> Self {
        self.input_source = Some(source);
        self
    }

    /// Text lines in HUD order.
    pub fn info_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("SCORE: {}", self.score),
            format!("SPEED: {:3.0} KM/H", self.speed_kmh),
            format!("RPM: {:5}", self.rpm),
            format!("GEAR: {}", self.gear),
            format!("Collision Penalty: -{}", self.collision_penalty_total),
            format!("Lane Violation Penalty: -{}", self.lane_penalty_total),
        ];
        if let Some(fix) = self.gnss {
            lines.push(format!("GNSS: ({:2.6}, {:3.6})", fix.latitude, fix.longitude));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simdrive_scoring::ScoringConfig;

    #[test]
    fn test_rpm_idle_when_stopped() {
        assert_eq!(estimate_rpm(0.0, 0.0, 5000.0), 800);
    }

    #[test]
    fn test_rpm_from_throttle() {
        // 0.5 * 5000 * 0.8 + 1000
        assert_eq!(estimate_rpm(0.5, 40.0, 5000.0), 3000);
        assert_eq!(estimate_rpm(1.0, 0.0, 3000.0), 3000, "clamped to max");
    }

    #[test]
    fn test_rpm_from_speed_when_coasting() {
        // 60 / 100 * 6000 / 3 + 800
        assert_eq!(estimate_rpm(0.0, 60.0, 6000.0), 2000);
    }

    #[test]
    fn test_rpm_unknown_max() {
        assert_eq!(estimate_rpm(1.0, 100.0, 0.0), 0);
        assert_eq!(estimate_rpm(1.0, 100.0, f32::NAN), 0);
    }

    #[test]
    fn test_speed_kmh() {
        assert!((speed_kmh(Vector3::new(10.0, 0.0, 0.0)) - 36.0).abs() < 1e-4);
    }

    #[test]
    fn test_capture_and_lines() {
        let state = ScoreState::new(&ScoringConfig::default());
        let command = ControlCommand {
            gear: -1,
            reverse: true,
            ..ControlCommand::default()
        };
        let snapshot = DashboardSnapshot::capture(
            7,
            &command,
            &state,
            0.5,
            Some(5000.0),
            Some(GnssFix {
                latitude: 49.0,
                longitude: 8.5,
            }),
        );
        assert_eq!(snapshot.gear, "R");
        assert_eq!(snapshot.rpm, 800);
        let lines = snapshot.info_lines();
        assert_eq!(lines.first().map(String::as_str), Some("SCORE: 1000"));
        assert!(lines.iter().any(|l| l == "GEAR: R"));
        assert!(lines.iter().any(|l| l.starts_with("GNSS: (49.000000")));
    }
}
