//! Port traits for the external collaborators of a driving session.
//!
//! The session only needs a small capability surface from the simulator:
//! spawn a vehicle, attach sensors that report asynchronously, apply a
//! control command, query kinematics and advance time. Display, audio and
//! controller polling are separate ports so each can be replaced or faked
//! on its own.

use serde::{Deserialize, Serialize};
use simdrive_errors::BackendError;
use simdrive_input::{ControlCommand, HardwareState, KeyboardState};
use simdrive_scoring::{
    ActiveNotification, LaneWaypoint, NotificationRequest, SoundCue, VehiclePose,
};

use crate::dashboard::DashboardSnapshot;
use crate::sensor::{SensorId, SensorKind, SensorSink};

/// Backend actor identifier.
pub type ActorId = u64;

/// World-space vector in meters (or meters per second).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// A vehicle the backend spawned for the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnedVehicle {
    pub id: ActorId,
    /// Human-readable name, e.g. `Mercedes Sprinter`.
    pub display_name: String,
}

/// Kinematic state of the player vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VehicleState {
    pub velocity: Vector3,
    pub pose: VehiclePose,
}

impl VehicleState {
    /// Velocity magnitude in m/s.
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

/// Physics parameters used by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VehiclePhysics {
    pub max_rpm: f32,
}

/// Simulation engine capability interface.
///
/// Calls returning [`BackendError::ConnectionLost`] end the session; every
/// other error is handled locally by the caller.
pub trait SimulationBackend {
    /// Spawn the player vehicle from a blueprint id.
    fn spawn_vehicle(&mut self, blueprint: &str) -> Result<SpawnedVehicle, BackendError>;

    /// Attach a sensor to `actor`. The backend reports readings through `sink`
    /// from whatever thread it likes until the sensor is detached.
    fn attach_sensor(
        &mut self,
        actor: ActorId,
        kind: SensorKind,
        sink: SensorSink,
    ) -> Result<SensorId, BackendError>;

    /// Stop and destroy a sensor. The backend must drop its sink.
    fn detach_sensor(&mut self, sensor: SensorId) -> Result<(), BackendError>;

    fn destroy_actor(&mut self, actor: ActorId) -> Result<(), BackendError>;

    fn apply_control(
        &mut self,
        actor: ActorId,
        command: &ControlCommand,
    ) -> Result<(), BackendError>;

    /// Hand driving over to the backend's own traffic manager, or take it back.
    fn set_autopilot(&mut self, actor: ActorId, enabled: bool) -> Result<(), BackendError>;

    fn vehicle_state(&self, actor: ActorId) -> Result<VehicleState, BackendError>;

    /// Nearest driving-lane waypoint, `None` when off the road network.
    fn lane_waypoint(&self, actor: ActorId) -> Option<LaneWaypoint>;

    fn physics(&self, actor: ActorId) -> Option<VehiclePhysics>;

    /// Advance one simulation step and return the new frame number.
    fn advance(&mut self) -> Result<u64, BackendError>;
}

/// Renders notifications and the dashboard. Layout is up to the implementation.
pub trait DisplayPort {
    /// Called once per notification when it is posted.
    fn show(&mut self, request: &NotificationRequest);

    /// Called once per tick with the dashboard and the active notifications,
    /// bottom to top.
    fn render_dashboard(
        &mut self,
        snapshot: &DashboardSnapshot,
        notifications: &[&ActiveNotification],
    );
}

pub trait AudioPort {
    /// Play a cue that already passed its cooldown gate.
    fn play(&mut self, cue: SoundCue);
}

/// Controller polling.
pub trait InputPort {
    /// Refresh device state. Called once at the start of every tick.
    fn poll(&mut self);

    /// Controller state, `None` when no controller is attached.
    fn hardware(&self) -> Option<&dyn HardwareState>;

    fn keyboard(&self) -> KeyboardState;
}

/// Display port that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDisplay;

impl DisplayPort for NullDisplay {
    fn show(&mut self, _request: &NotificationRequest) {}

    fn render_dashboard(
        &mut self,
        _snapshot: &DashboardSnapshot,
        _notifications: &[&ActiveNotification],
    ) {
    }
}

/// Audio port that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioPort for NullAudio {
    fn play(&mut self, _cue: SoundCue) {}
}

/// Input port with no controller and no keys held.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInput;

impl InputPort for NoInput {
    fn poll(&mut self) {}

    fn hardware(&self) -> Option<&dyn HardwareState> {
        None
    }

    fn keyboard(&self) -> KeyboardState {
        KeyboardState::default()
    }
}

/// The non-backend collaborators of a session.
pub struct SessionPorts {
    pub display: Box<dyn DisplayPort>,
    pub audio: Box<dyn AudioPort>,
    pub input: Box<dyn InputPort>,
}

impl SessionPorts {
    pub fn new(
        display: impl DisplayPort + 'static,
        audio: impl AudioPort + 'static,
        input: impl InputPort + 'static,
    ) -> Self {
        Self {
            display: Box::new(display),
            audio: Box::new(audio),
            input: Box::new(input),
        }
    }

    /// Ports that discard output and report no input.
    pub fn headless() -> Self {
        Self::new(NullDisplay, NullAudio, NoInput)
    }
}

impl std::fmt::Debug for SessionPorts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionPorts").finish_non_exhaustive()
    }
}
