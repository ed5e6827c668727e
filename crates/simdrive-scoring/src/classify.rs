//! Lane violation classification.
//!
//! A lane crossing is classified from the angle between the vehicle heading
//! and the direction of the lane it occupies, then from the type of the
//! markings it crossed.

use serde::{Deserialize, Serialize};

/// Planar vector in world units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector for a yaw angle in degrees.
    pub fn from_yaw_degrees(yaw: f32) -> Self {
        let radians = yaw.to_radians();
        Self::new(radians.cos(), radians.sin())
    }

    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Unit-length copy. Zero and non-finite vectors are returned unchanged.
    pub fn normalized(self) -> Self {
        let length = self.length();
        if length > f32::EPSILON && length.is_finite() {
            Self::new(self.x / length, self.y / length)
        } else {
            self
        }
    }

    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }
}

/// Road marking type reported for a crossed lane boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneMarkingType {
    Broken,
    Solid,
    SolidSolid,
    SolidBroken,
    BrokenSolid,
    BrokenBroken,
    BottsDots,
    Grass,
    Curb,
    Other,
    None,
}

impl LaneMarkingType {
    /// Whether crossing this marking is prohibited.
    pub fn is_solid(self) -> bool {
        matches!(
            self,
            LaneMarkingType::Solid
                | LaneMarkingType::SolidSolid
                | LaneMarkingType::SolidBroken
                | LaneMarkingType::BrokenSolid
        )
    }
}

/// Vehicle heading at the time of the crossing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VehiclePose {
    pub forward: Vector2,
}

impl VehiclePose {
    pub fn from_yaw_degrees(yaw: f32) -> Self {
        Self {
            forward: Vector2::from_yaw_degrees(yaw),
        }
    }
}

/// Nearest driving-lane waypoint to the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LaneWaypoint {
    pub forward: Vector2,
    pub road_id: u32,
    pub lane_id: i32,
}

impl LaneWaypoint {
    pub fn from_yaw_degrees(yaw: f32) -> Self {
        Self {
            forward: Vector2::from_yaw_degrees(yaw),
            road_id: 0,
            lane_id: 0,
        }
    }
}

/// Sub-kind of a lane violation, in decreasing severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneViolation {
    /// Driving against the lane direction.
    Oncoming,
    /// Crossed a solid marking.
    SolidLine,
    /// Crossed a broken marking.
    Drift,
    /// No lane could be resolved for the vehicle.
    Unknown,
}

impl LaneViolation {
    /// Penalty multiplier applied to the base lane penalty.
    pub fn multiplier(self, oncoming: f32, solid: f32) -> f32 {
        match self {
            LaneViolation::Oncoming => oncoming,
            LaneViolation::SolidLine => solid,
            LaneViolation::Drift | LaneViolation::Unknown => 1.0,
        }
    }
}

/// Cosine between the vehicle heading and the lane direction.
pub fn heading_dot(pose: &VehiclePose, waypoint: &LaneWaypoint) -> f32 {
    pose.forward.normalized().dot(waypoint.forward.normalized())
}

/// Classify a crossing.
///
/// `direction_dot` is `None` when no lane waypoint could be resolved.
/// Any non-finite dot product is treated as unresolved.
pub fn classify_lane_violation(
    direction_dot: Option<f32>,
    crossed: &[LaneMarkingType],
    oncoming_threshold: f32,
) -> LaneViolation {
    let Some(dot) = direction_dot.filter(|d| d.is_finite()) else {
        return LaneViolation::Unknown;
    };
    if dot < oncoming_threshold {
        LaneViolation::Oncoming
    } else if crossed.iter().any(|m| m.is_solid()) {
        LaneViolation::SolidLine
    } else {
        LaneViolation::Drift
    }
}
