//! Infraction events reported by the simulation backend.

use serde::{Deserialize, Serialize};

use crate::classify::LaneMarkingType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfractionKind {
    Collision,
    LaneCrossing,
}

/// One sensor report, consumed once by the violation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfractionEvent {
    pub kind: InfractionKind,
    /// Simulation frame the sensor fired on.
    pub frame: u64,
    /// Collision impulse magnitude, when known.
    pub severity_hint: Option<f32>,
    /// Heading/lane cosine precomputed by the backend, when known.
    pub direction_dot: Option<f32>,
    /// Markings crossed by a lane invasion.
    pub crossed_markings: Vec<LaneMarkingType>,
    /// Display name of the other actor in a collision.
    pub other_actor: Option<String>,
}

impl InfractionEvent {
    pub fn collision(frame: u64, intensity: f32) -> Self {
        Self {
            kind: InfractionKind::Collision,
            frame,
            severity_hint: Some(intensity),
            direction_dot: None,
            crossed_markings: Vec::new(),
            other_actor: None,
        }
    }

    pub fn lane_crossing(frame: u64, crossed: impl Into<Vec<LaneMarkingType>>) -> Self {
        Self {
            kind: InfractionKind::LaneCrossing,
            frame,
            severity_hint: None,
            direction_dot: None,
            crossed_markings: crossed.into(),
            other_actor: None,
        }
    }

    pub fn with_direction_dot(mut self, dot: f32) -> Self {
        self.direction_dot = Some(dot);
        self
    }

    pub fn with_other_actor(mut self, name: impl Into<String>) -> Self {
        self.other_actor = Some(name.into());
        self
    }

    /// Impulse magnitude, zero when unknown or invalid.
    pub fn intensity(&self) -> f32 {
        self.severity_hint
            .filter(|v| v.is_finite() && *v >= 0.0)
            .unwrap_or(0.0)
    }
}
