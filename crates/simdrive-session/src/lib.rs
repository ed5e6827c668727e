//! Driving session for simdrive.
//!
//! Ties the input normalizer and the scoring engine to a simulation backend
//! through small port traits, and runs the fixed-rate tick loop.
//!
//! ```rust,ignore
//! use simdrive_session::{QuitSignal, Session, SessionConfig, SessionPorts};
//!
//! let config = SessionConfig::from_path("session.yaml")?;
//! let mut session = Session::start(config, backend, SessionPorts::headless())?;
//! let summary = session.run(&QuitSignal::new(), None)?;
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod dashboard;
pub mod error;
pub mod observability;
pub mod ports;
pub mod quit;
pub mod sensor;
pub mod session;

pub use config::{DEFAULT_SESSION_YAML, SessionConfig};
pub use dashboard::{DashboardSnapshot, IDLE_RPM, estimate_rpm, speed_kmh};
pub use error::{SessionError, SessionResult};
pub use observability::init_tracing;
pub use ports::{
    ActorId, AudioPort, DisplayPort, InputPort, NoInput, NullAudio, NullDisplay, SessionPorts,
    SimulationBackend, SpawnedVehicle, Vector3, VehiclePhysics, VehicleState,
};
pub use quit::QuitSignal;
pub use sensor::{GnssFix, SENSOR_QUEUE_CAPACITY, SensorEvent, SensorId, SensorKind, SensorSink};
pub use session::{AttachedSensor, RunSummary, Session, StopReason, TickReport};
