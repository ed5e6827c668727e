//! Session lifecycle and the tick loop.
//!
//! A [`Session`] owns everything that lives for one drive: the backend
//! handle, the spawned vehicle and its sensors, the input normalizer, the
//! scoring engine and the feedback state. Backend resources are released by
//! [`Session::teardown`], which also runs on drop, so every exit path cleans
//! up the spawned actors.

use std::fmt;
use std::time::Instant;

use simdrive_errors::BackendError;
use simdrive_input::{
    ControlCommand, ControlInput, ControlNotice, DeviceInventory, InputNormalizer, InputSource,
    MappingIssue,
};
use simdrive_scoring::{
    Assessment, NotificationBoard, NotificationRequest, SoundCue, SoundCueSystem, SoundRequest,
    ViolationEngine,
};
use tracing::{debug, error, info, warn};

use crate::config::SessionConfig;
use crate::dashboard::{DashboardSnapshot, speed_kmh};
use crate::ports::{SessionPorts, SimulationBackend, SpawnedVehicle, Vector3};
use crate::quit::QuitSignal;
use crate::sensor::{GnssFix, SensorEvent, SensorHub, SensorId, SensorKind};
use crate::{SessionError, SessionResult};

/// A sensor currently attached to the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachedSensor {
    pub kind: SensorKind,
    pub id: SensorId,
}

/// What one tick did.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// Frame the tick ran on.
    pub frame: u64,
    pub command: ControlCommand,
    pub source: InputSource,
    pub speed_kmh: f32,
    /// Engine decisions in the order they were made.
    pub assessments: Vec<Assessment>,
    /// The driver asked for a restart and the vehicle was respawned.
    pub respawned: bool,
    /// The backend drove this tick and `command` was not applied.
    pub autopilot: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Quit,
    TickLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub final_score: u32,
    pub reason: StopReason,
}

/// One driving session against a simulation backend.
pub struct Session<B: SimulationBackend> {
    config: SessionConfig,
    backend: B,
    ports: SessionPorts,
    hub: SensorHub,
    vehicle: Option<SpawnedVehicle>,
    sensors: Vec<AttachedSensor>,
    disabled_sensors: Vec<SensorKind>,
    mapping_issues: Vec<MappingIssue>,
    normalizer: InputNormalizer,
    engine: ViolationEngine,
    board: NotificationBoard,
    sounds: SoundCueSystem,
    dashboard: DashboardSnapshot,
    gnss: Option<GnssFix>,
    frame: u64,
    /// Last velocity the backend reported for the current vehicle.
    last_velocity: Vector3,
    last_tick: Option<Instant>,
    torn_down: bool,
}

impl<B: SimulationBackend> Session<B> {
    /// Validate the configuration, check the controller mapping against the
    /// detected hardware and spawn the first vehicle.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid configuration or when the first
    /// vehicle cannot be spawned.
    pub fn start(
        config: SessionConfig,
        backend: B,
        mut ports: SessionPorts,
    ) -> SessionResult<Self> {
        config.validate()?;
        let normalizer = InputNormalizer::new(config.input.clone())?;
        let engine = ViolationEngine::new(config.scoring.clone())?;
        let mut sounds = SoundCueSystem::new(config.sound_cooldowns.clone());
        sounds.set_enabled(config.sound_enabled);

        ports.input.poll();
        let inventory = ports
            .input
            .hardware()
            .map(DeviceInventory::probe)
            .unwrap_or_default();
        let mapping_issues = normalizer.check_hardware(&inventory);

        let mut session = Self {
            config,
            backend,
            ports,
            hub: SensorHub::new(),
            vehicle: None,
            sensors: Vec::new(),
            disabled_sensors: Vec::new(),
            mapping_issues,
            normalizer,
            engine,
            board: NotificationBoard::new(),
            sounds,
            dashboard: DashboardSnapshot::default(),
            gnss: None,
            frame: 0,
            last_velocity: Vector3::default(),
            last_tick: None,
            torn_down: false,
        };
        session.respawn()?;
        info!(
            blueprint = %session.config.vehicle_blueprint,
            tick_rate_hz = session.config.tick_rate_hz,
            "Session started"
        );
        Ok(session)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn engine(&self) -> &ViolationEngine {
        &self.engine
    }

    pub fn normalizer(&self) -> &InputNormalizer {
        &self.normalizer
    }

    pub fn board(&self) -> &NotificationBoard {
        &self.board
    }

    pub fn dashboard(&self) -> &DashboardSnapshot {
        &self.dashboard
    }

    pub fn vehicle(&self) -> Option<&SpawnedVehicle> {
        self.vehicle.as_ref()
    }

    pub fn attached_sensors(&self) -> &[AttachedSensor] {
        &self.sensors
    }

    /// Sensors that failed to attach for the current vehicle.
    pub fn disabled_sensors(&self) -> &[SensorKind] {
        &self.disabled_sensors
    }

    /// Startup mismatches between the input map and the detected hardware.
    pub fn mapping_issues(&self) -> &[MappingIssue] {
        &self.mapping_issues
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Sensor readings lost because the queue overflowed between ticks.
    pub fn dropped_sensor_events(&self) -> u64 {
        self.hub.dropped()
    }

    /// Replace the vehicle and start a new run.
    ///
    /// The old vehicle and its sensors are destroyed, a new vehicle is spawned
    /// and the configured sensors are attached. A sensor that fails to attach
    /// is reported and disabled for the run. Score, cooldowns, input state and
    /// non-critical notifications are reset.
    ///
    /// # Errors
    ///
    /// Returns an error when the vehicle cannot be spawned or the backend
    /// connection is lost.
    pub fn respawn(&mut self) -> SessionResult<()> {
        if self.torn_down {
            return Err(SessionError::TornDown);
        }
        self.release_vehicle();
        // Readings still queued belong to the destroyed vehicle.
        self.hub = SensorHub::new();

        let vehicle = match self.backend.spawn_vehicle(&self.config.vehicle_blueprint) {
            Ok(vehicle) => vehicle,
            Err(err) if err.is_fatal() => return Err(self.fail(err)),
            Err(err) => {
                warn!(error = %err, "Vehicle spawn failed");
                self.report_error(&err, Instant::now());
                return Err(err.into());
            }
        };
        info!(actor = vehicle.id, name = %vehicle.display_name, "Vehicle spawned");

        self.engine.reset();
        self.normalizer.reset();
        self.board.clear_non_critical();
        self.sounds.reset();
        self.gnss = None;
        self.last_velocity = Vector3::default();
        self.disabled_sensors.clear();

        let actor = vehicle.id;
        let ready = format!("{} Ready!", vehicle.display_name);
        self.vehicle = Some(vehicle);

        for kind in self.config.sensors.clone() {
            let sink = self.hub.sink(kind);
            match self.backend.attach_sensor(actor, kind, sink) {
                Ok(id) => {
                    debug!(sensor = %kind, id = id.0, "Sensor attached");
                    self.sensors.push(AttachedSensor { kind, id });
                }
                Err(err) if err.is_fatal() => return Err(self.fail(err)),
                Err(err) => {
                    warn!(sensor = %kind, error = %err, "Sensor disabled for this run");
                    self.disabled_sensors.push(kind);
                    self.report_error(&err, Instant::now());
                }
            }
        }

        self.post(NotificationRequest::info(ready), Instant::now());
        Ok(())
    }

    /// Run one tick at the current time.
    ///
    /// # Errors
    ///
    /// See [`Session::tick_at`].
    pub fn tick(&mut self) -> SessionResult<TickReport> {
        self.tick_at(Instant::now())
    }

    /// Run one tick with `now` as the wall-clock time.
    ///
    /// Polls the controller, applies the control command unless the autopilot
    /// is driving, feeds queued sensor readings and the current speed to the
    /// scoring engine, emits feedback, refreshes the dashboard and advances
    /// the simulation. A tick without a speed reading skips the speed check.
    ///
    /// # Errors
    ///
    /// Returns an error after a fatal backend failure (the session is torn
    /// down first), when a needed respawn fails, or when the session was
    /// already torn down.
    pub fn tick_at(&mut self, now: Instant) -> SessionResult<TickReport> {
        if self.torn_down {
            return Err(SessionError::TornDown);
        }
        if self.vehicle.is_none() {
            self.respawn()?;
        }
        let actor = self.vehicle.as_ref().map_or(0, |v| v.id);

        let elapsed_ms = match self.last_tick {
            Some(last) => now.saturating_duration_since(last).as_secs_f32() * 1000.0,
            None => self.config.tick_interval().as_secs_f32() * 1000.0,
        };
        self.last_tick = Some(now);

        self.ports.input.poll();
        let reading = self.normalizer.read_controls(&ControlInput {
            hardware: self.ports.input.hardware(),
            keyboard: self.ports.input.keyboard(),
            vehicle_speed: self.last_velocity.length(),
            elapsed_ms,
        });

        for notice in &reading.notices {
            match *notice {
                ControlNotice::RestartRequested => continue,
                ControlNotice::Autopilot(enabled) => {
                    let toggled = self.backend.set_autopilot(actor, enabled);
                    if self.check(toggled, "set_autopilot")?.is_none() {
                        self.normalizer.set_autopilot(!enabled);
                        continue;
                    }
                    info!(actor, enabled, "Autopilot toggled");
                }
                _ => {}
            }
            self.post(NotificationRequest::info(notice.to_string()), now);
        }
        if reading.restart_requested() {
            info!(frame = self.frame, "Restart requested by driver");
            self.respawn()?;
            return Ok(TickReport {
                frame: self.frame,
                command: ControlCommand::stopped(),
                source: reading.source,
                speed_kmh: 0.0,
                assessments: Vec::new(),
                respawned: true,
                autopilot: false,
            });
        }

        let autopilot = self.normalizer.autopilot();
        if !autopilot {
            let applied = self.backend.apply_control(actor, &reading.command);
            self.check(applied, "apply_control")?;
        }

        let mut assessments = Vec::new();
        for event in self.hub.drain() {
            match event {
                SensorEvent::Collision(event) => {
                    assessments.push(self.engine.on_collision(&event, now));
                }
                SensorEvent::LaneInvasion(event) => {
                    let state = self.backend.vehicle_state(actor);
                    let pose = self.check(state, "vehicle_state")?.map(|s| s.pose);
                    let waypoint = self.backend.lane_waypoint(actor);
                    assessments.push(self.engine.on_lane_invasion(
                        &event,
                        pose.as_ref(),
                        waypoint.as_ref(),
                    ));
                }
                SensorEvent::Gnss(fix) => self.gnss = Some(fix),
            }
        }

        let state = self.backend.vehicle_state(actor);
        let speed = match self.check(state, "vehicle_state")? {
            Some(state) => {
                self.last_velocity = state.velocity;
                let speed = speed_kmh(state.velocity);
                assessments.push(self.engine.on_tick(speed, self.frame));
                speed
            }
            // Unknown speed neither alerts nor re-arms the speeding gate.
            None => speed_kmh(self.last_velocity),
        };

        for assessment in &assessments {
            self.deliver(assessment, now);
        }
        self.board.tick(now);

        let max_rpm = self.backend.physics(actor).map(|p| p.max_rpm);
        self.dashboard = DashboardSnapshot::capture(
            self.frame,
            &reading.command,
            self.engine.state(),
            speed,
            max_rpm,
            self.gnss,
        )
        .with_input_source(reading.source);
        let notifications = self.board.render_order();
        self.ports
            .display
            .render_dashboard(&self.dashboard, &notifications);

        let tick_frame = self.frame;
        let advanced = self.backend.advance();
        if let Some(frame) = self.check(advanced, "advance")? {
            self.frame = frame;
        }

        Ok(TickReport {
            frame: tick_frame,
            command: reading.command,
            source: reading.source,
            speed_kmh: speed,
            assessments,
            respawned: false,
            autopilot,
        })
    }

    /// Tick until `quit` is raised or `max_ticks` ticks have run, then tear down.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error. Recoverable tick errors, such as a
    /// failed respawn, are logged and the loop keeps going. The session is
    /// torn down on every path.
    pub fn run(&mut self, quit: &QuitSignal, max_ticks: Option<u64>) -> SessionResult<RunSummary> {
        let interval = self.config.tick_interval();
        let mut ticks = 0u64;
        let reason = loop {
            if quit.is_raised() {
                break StopReason::Quit;
            }
            if max_ticks.is_some_and(|max| ticks >= max) {
                break StopReason::TickLimit;
            }
            let started = Instant::now();
            match self.tick_at(started) {
                Ok(_) => {}
                Err(err) if !err.is_fatal() => {
                    warn!(error = %err, ticks, "Tick skipped");
                }
                Err(err) => {
                    error!(error = %err, ticks, "Session aborted");
                    self.teardown();
                    return Err(err);
                }
            }
            ticks += 1;
            if self.config.realtime {
                if let Some(rest) = interval.checked_sub(started.elapsed()) {
                    std::thread::sleep(rest);
                }
            }
        };

        let summary = RunSummary {
            ticks,
            final_score: self.engine.score(),
            reason,
        };
        info!(ticks, score = summary.final_score, ?reason, "Session finished");
        self.teardown();
        Ok(summary)
    }

    /// Detach every sensor and destroy the vehicle. Idempotent.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.release_vehicle();
        self.hub = SensorHub::new();
        self.board.clear();
        self.torn_down = true;
        info!("Session torn down");
    }

    fn release_vehicle(&mut self) {
        for sensor in self.sensors.drain(..) {
            if let Err(err) = self.backend.detach_sensor(sensor.id) {
                warn!(sensor = %sensor.kind, error = %err, "Failed to detach sensor");
            }
        }
        if let Some(vehicle) = self.vehicle.take() {
            match self.backend.destroy_actor(vehicle.id) {
                Ok(()) => debug!(actor = vehicle.id, "Vehicle destroyed"),
                Err(err) => warn!(actor = vehicle.id, error = %err, "Failed to destroy vehicle"),
            }
        }
    }

    /// Keep going on recoverable backend errors, tear down on fatal ones.
    fn check<T>(
        &mut self,
        result: Result<T, BackendError>,
        call: &'static str,
    ) -> SessionResult<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_fatal() => Err(self.fail(err)),
            Err(err) => {
                warn!(call, frame = self.frame, error = %err, "Backend call failed");
                Ok(None)
            }
        }
    }

    fn fail(&mut self, err: BackendError) -> SessionError {
        error!(error = %err, frame = self.frame, "Fatal backend error");
        self.teardown();
        SessionError::Backend(err)
    }

    fn report_error(&mut self, err: &BackendError, now: Instant) {
        self.post(NotificationRequest::error(err.to_string()), now);
        self.play(SoundRequest::forced(SoundCue::Error), now);
    }

    fn deliver(&mut self, assessment: &Assessment, now: Instant) {
        if let Some(note) = &assessment.notification {
            self.post(note.clone(), now);
        }
        if let Some(sound) = assessment.sound {
            self.play(sound, now);
        }
    }

    fn post(&mut self, request: NotificationRequest, now: Instant) {
        self.ports.display.show(&request);
        self.board.post(request, now);
    }

    fn play(&mut self, request: SoundRequest, now: Instant) {
        if self.sounds.submit(request, now) {
            self.ports.audio.play(request.cue);
        }
    }
}

impl<B: SimulationBackend> Drop for Session<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<B: SimulationBackend> fmt::Debug for Session<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("vehicle", &self.vehicle)
            .field("sensors", &self.sensors)
            .field("frame", &self.frame)
            .field("score", &self.engine.score())
            .field("torn_down", &self.torn_down)
            .finish_non_exhaustive()
    }
}
