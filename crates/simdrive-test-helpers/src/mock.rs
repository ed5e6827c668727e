//! In-memory collaborators for session tests.
//!
//! Each fake is a cheap handle around shared state, so a test keeps one
//! clone to script and inspect while the session owns the other.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use simdrive_errors::BackendError;
use simdrive_input::{ControlCommand, ControllerSnapshot, HardwareState, KeyboardState};
use simdrive_scoring::{
    ActiveNotification, InfractionEvent, LaneWaypoint, NotificationRequest, SoundCue, VehiclePose,
};
use simdrive_session::{
    ActorId, AudioPort, DashboardSnapshot, DisplayPort, GnssFix, InputPort, SensorEvent, SensorId,
    SensorKind, SensorSink, SimulationBackend, SpawnedVehicle, Vector3, VehiclePhysics,
    VehicleState,
};

#[derive(Debug)]
struct BackendState {
    display_name: String,
    next_actor: ActorId,
    next_sensor: u64,
    frame: u64,
    live_actors: Vec<ActorId>,
    destroyed_actors: Vec<ActorId>,
    sensors: BTreeMap<SensorId, (ActorId, SensorSink)>,
    velocity: Vector3,
    pose: VehiclePose,
    lane: Option<LaneWaypoint>,
    physics: Option<VehiclePhysics>,
    controls: Vec<ControlCommand>,
    spawn_failures: u32,
    failing_sensors: HashSet<SensorKind>,
    lose_connection_at: Option<u64>,
    connected: bool,
    state_failures: u32,
    autopilot: BTreeMap<ActorId, bool>,
}

impl Default for BackendState {
    fn default() -> Self {
        Self {
            display_name: "Mercedes Sprinter".to_string(),
            next_actor: 100,
            next_sensor: 1,
            frame: 0,
            live_actors: Vec::new(),
            destroyed_actors: Vec::new(),
            sensors: BTreeMap::new(),
            velocity: Vector3::default(),
            pose: VehiclePose::from_yaw_degrees(0.0),
            lane: Some(LaneWaypoint::from_yaw_degrees(0.0)),
            physics: Some(VehiclePhysics { max_rpm: 5000.0 }),
            controls: Vec::new(),
            spawn_failures: 0,
            failing_sensors: HashSet::new(),
            lose_connection_at: None,
            connected: true,
            state_failures: 0,
            autopilot: BTreeMap::new(),
        }
    }
}

impl BackendState {
    fn ensure_connected(&self) -> Result<(), BackendError> {
        if self.connected {
            Ok(())
        } else {
            Err(BackendError::connection_lost("scripted disconnect"))
        }
    }

    fn ensure_live(&self, actor: ActorId) -> Result<(), BackendError> {
        self.ensure_connected()?;
        if self.live_actors.contains(&actor) {
            Ok(())
        } else {
            Err(BackendError::ActorNotFound(actor))
        }
    }
}

/// Scriptable simulation backend.
///
/// Vehicles always spawn at the origin heading along +x on a lane pointing
/// the same way. Tests move the vehicle with [`ScriptedBackend::set_velocity`]
/// and friends and fire sensor readings with the `emit_*` methods.
#[derive(Debug, Clone, Default)]
pub struct ScriptedBackend {
    state: Arc<Mutex<BackendState>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_display_name(self, name: impl Into<String>) -> Self {
        self.state.lock().display_name = name.into();
        self
    }

    pub fn set_velocity(&self, velocity: Vector3) {
        self.state.lock().velocity = velocity;
    }

    /// Drive straight along +x at `kmh`.
    pub fn set_speed_kmh(&self, kmh: f32) {
        self.set_velocity(Vector3::new(kmh / 3.6, 0.0, 0.0));
    }

    pub fn set_pose(&self, pose: VehiclePose) {
        self.state.lock().pose = pose;
    }

    pub fn set_lane(&self, lane: Option<LaneWaypoint>) {
        self.state.lock().lane = lane;
    }

    pub fn set_physics(&self, physics: Option<VehiclePhysics>) {
        self.state.lock().physics = physics;
    }

    /// Make the next `count` spawn attempts fail.
    pub fn fail_next_spawns(&self, count: u32) {
        self.state.lock().spawn_failures = count;
    }

    /// Make every attach of `kind` fail.
    pub fn fail_sensor(&self, kind: SensorKind) {
        self.state.lock().failing_sensors.insert(kind);
    }

    /// Make the next `count` vehicle state queries fail with a recoverable
    /// error.
    pub fn fail_vehicle_state(&self, count: u32) {
        self.state.lock().state_failures = count;
    }

    /// Drop the connection now.
    pub fn lose_connection(&self) {
        self.state.lock().connected = false;
    }

    /// Drop the connection when the simulation reaches `frame`.
    pub fn lose_connection_at(&self, frame: u64) {
        self.state.lock().lose_connection_at = Some(frame);
    }

    /// Deliver a reading to every attached sensor of the matching kind.
    /// Returns the number of sinks that accepted it.
    pub fn emit(&self, event: SensorEvent) -> usize {
        let sinks: Vec<SensorSink> = self
            .state
            .lock()
            .sensors
            .values()
            .filter(|(_, sink)| sink.kind() == event.kind())
            .map(|(_, sink)| sink.clone())
            .collect();
        sinks.iter().filter(|sink| sink.send(event.clone())).count()
    }

    /// Collision reported on the current frame.
    pub fn emit_collision(&self, intensity: f32, other: &str) -> usize {
        let frame = self.frame();
        self.emit(SensorEvent::Collision(
            InfractionEvent::collision(frame, intensity).with_other_actor(other),
        ))
    }

    pub fn emit_lane_invasion(&self, event: InfractionEvent) -> usize {
        self.emit(SensorEvent::LaneInvasion(event))
    }

    pub fn emit_gnss(&self, latitude: f64, longitude: f64) -> usize {
        self.emit(SensorEvent::Gnss(GnssFix {
            latitude,
            longitude,
        }))
    }

    pub fn frame(&self) -> u64 {
        self.state.lock().frame
    }

    pub fn live_actors(&self) -> Vec<ActorId> {
        self.state.lock().live_actors.clone()
    }

    pub fn destroyed_actors(&self) -> Vec<ActorId> {
        self.state.lock().destroyed_actors.clone()
    }

    pub fn live_sensors(&self) -> Vec<SensorKind> {
        self.state
            .lock()
            .sensors
            .values()
            .map(|(_, sink)| sink.kind())
            .collect()
    }

    pub fn applied_controls(&self) -> Vec<ControlCommand> {
        self.state.lock().controls.clone()
    }

    pub fn last_control(&self) -> Option<ControlCommand> {
        self.state.lock().controls.last().copied()
    }

    /// Whether `actor` is currently driven by the backend.
    pub fn autopilot(&self, actor: ActorId) -> bool {
        self.state.lock().autopilot.get(&actor).copied().unwrap_or(false)
    }
}

impl SimulationBackend for ScriptedBackend {
    fn spawn_vehicle(&mut self, blueprint: &str) -> Result<SpawnedVehicle, BackendError> {
        let mut state = self.state.lock();
        state.ensure_connected()?;
        if state.spawn_failures > 0 {
            state.spawn_failures -= 1;
            return Err(BackendError::spawn_failed(blueprint, "spawn point occupied"));
        }
        let id = state.next_actor;
        state.next_actor += 1;
        state.live_actors.push(id);
        Ok(SpawnedVehicle {
            id,
            display_name: state.display_name.clone(),
        })
    }

    fn attach_sensor(
        &mut self,
        actor: ActorId,
        kind: SensorKind,
        sink: SensorSink,
    ) -> Result<SensorId, BackendError> {
        let mut state = self.state.lock();
        state.ensure_live(actor)?;
        if state.failing_sensors.contains(&kind) {
            return Err(BackendError::sensor_attach_failed(
                kind.name(),
                "blueprint not found",
            ));
        }
        let id = SensorId(state.next_sensor);
        state.next_sensor += 1;
        state.sensors.insert(id, (actor, sink));
        Ok(id)
    }

    fn detach_sensor(&mut self, sensor: SensorId) -> Result<(), BackendError> {
        let mut state = self.state.lock();
        state.ensure_connected()?;
        match state.sensors.remove(&sensor) {
            Some(_) => Ok(()),
            None => Err(BackendError::ActorNotFound(sensor.0)),
        }
    }

    fn destroy_actor(&mut self, actor: ActorId) -> Result<(), BackendError> {
        let mut state = self.state.lock();
        state.ensure_live(actor)?;
        state.live_actors.retain(|a| *a != actor);
        state.sensors.retain(|_, (parent, _)| *parent != actor);
        state.destroyed_actors.push(actor);
        Ok(())
    }

    fn apply_control(
        &mut self,
        actor: ActorId,
        command: &ControlCommand,
    ) -> Result<(), BackendError> {
        let mut state = self.state.lock();
        state.ensure_live(actor)?;
        state.controls.push(*command);
        Ok(())
    }

    fn set_autopilot(&mut self, actor: ActorId, enabled: bool) -> Result<(), BackendError> {
        let mut state = self.state.lock();
        state.ensure_live(actor)?;
        state.autopilot.insert(actor, enabled);
        Ok(())
    }

    fn vehicle_state(&self, actor: ActorId) -> Result<VehicleState, BackendError> {
        let mut state = self.state.lock();
        state.ensure_live(actor)?;
        if state.state_failures > 0 {
            state.state_failures -= 1;
            return Err(BackendError::ActorNotFound(actor));
        }
        Ok(VehicleState {
            velocity: state.velocity,
            pose: state.pose,
        })
    }

    fn lane_waypoint(&self, actor: ActorId) -> Option<LaneWaypoint> {
        let state = self.state.lock();
        state.ensure_live(actor).ok().and(state.lane)
    }

    fn physics(&self, actor: ActorId) -> Option<VehiclePhysics> {
        let state = self.state.lock();
        state.ensure_live(actor).ok().and(state.physics)
    }

    fn advance(&mut self) -> Result<u64, BackendError> {
        let mut state = self.state.lock();
        state.ensure_connected()?;
        state.frame += 1;
        if state.lose_connection_at.is_some_and(|at| state.frame >= at) {
            state.connected = false;
        }
        Ok(state.frame)
    }
}

#[derive(Debug, Default)]
struct DisplayLog {
    shown: Vec<NotificationRequest>,
    renders: usize,
    last_dashboard: Option<DashboardSnapshot>,
    last_stack: Vec<String>,
}

/// Display that records what it was asked to show.
#[derive(Debug, Clone, Default)]
pub struct FakeDisplay {
    log: Arc<Mutex<DisplayLog>>,
}

impl FakeDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every notification posted, in order.
    pub fn shown(&self) -> Vec<NotificationRequest> {
        self.log.lock().shown.clone()
    }

    pub fn shown_texts(&self) -> Vec<String> {
        self.log.lock().shown.iter().map(|n| n.text.clone()).collect()
    }

    pub fn render_count(&self) -> usize {
        self.log.lock().renders
    }

    pub fn last_dashboard(&self) -> Option<DashboardSnapshot> {
        self.log.lock().last_dashboard.clone()
    }

    /// Notification texts of the last render, bottom to top.
    pub fn last_stack(&self) -> Vec<String> {
        self.log.lock().last_stack.clone()
    }
}

impl DisplayPort for FakeDisplay {
    fn show(&mut self, request: &NotificationRequest) {
        self.log.lock().shown.push(request.clone());
    }

    fn render_dashboard(
        &mut self,
        snapshot: &DashboardSnapshot,
        notifications: &[&ActiveNotification],
    ) {
        let mut log = self.log.lock();
        log.renders += 1;
        log.last_dashboard = Some(snapshot.clone());
        log.last_stack = notifications.iter().map(|n| n.request.text.clone()).collect();
    }
}

/// Audio sink that records played cues.
#[derive(Debug, Clone, Default)]
pub struct FakeAudio {
    played: Arc<Mutex<Vec<SoundCue>>>,
}

impl FakeAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> Vec<SoundCue> {
        self.played.lock().clone()
    }

    pub fn count(&self, cue: SoundCue) -> usize {
        self.played.lock().iter().filter(|c| **c == cue).count()
    }
}

impl AudioPort for FakeAudio {
    fn play(&mut self, cue: SoundCue) {
        self.played.lock().push(cue);
    }
}

#[derive(Debug, Default)]
struct InputScript {
    controller: Option<ControllerSnapshot>,
    keyboard: KeyboardState,
    polls: u64,
}

/// Controller whose state the test sets between ticks.
///
/// The session sees a copy taken at `poll()`, like a real device read.
#[derive(Debug, Clone, Default)]
pub struct FakeInput {
    script: Arc<Mutex<InputScript>>,
    polled: Option<ControllerSnapshot>,
    polled_keyboard: KeyboardState,
}

impl FakeInput {
    /// No controller attached.
    pub fn keyboard_only() -> Self {
        Self::default()
    }

    /// The demo rig with pedals released and the wheel centered.
    pub fn fanatec_rig() -> Self {
        Self::with_controller(ControllerSnapshot::fanatec_rig())
    }

    pub fn with_controller(controller: ControllerSnapshot) -> Self {
        let input = Self::default();
        input.script.lock().controller = Some(controller);
        input
    }

    pub fn set_axis(&self, device: usize, axis: usize, value: f32) -> bool {
        self.script
            .lock()
            .controller
            .as_mut()
            .is_some_and(|c| c.set_axis(device, axis, value))
    }

    pub fn set_button(&self, device: usize, button: usize, pressed: bool) -> bool {
        self.script
            .lock()
            .controller
            .as_mut()
            .is_some_and(|c| c.set_button(device, button, pressed))
    }

    pub fn set_keyboard(&self, keyboard: KeyboardState) {
        self.script.lock().keyboard = keyboard;
    }

    /// Unplug the controller.
    pub fn disconnect(&self) {
        self.script.lock().controller = None;
    }

    pub fn polls(&self) -> u64 {
        self.script.lock().polls
    }
}

impl InputPort for FakeInput {
    fn poll(&mut self) {
        let mut script = self.script.lock();
        script.polls += 1;
        self.polled = script.controller.clone();
        self.polled_keyboard = script.keyboard;
    }

    fn hardware(&self) -> Option<&dyn HardwareState> {
        self.polled.as_ref().map(|c| c as &dyn HardwareState)
    }

    fn keyboard(&self) -> KeyboardState {
        self.polled_keyboard
    }
}
