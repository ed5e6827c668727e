//! Session configuration.
//!
//! A complete profile for the demo rig ships embedded in the binary; files
//! on disk override it field by field through serde defaults.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use simdrive_errors::{ValidationError, validate_range};
use simdrive_input::InputMap;
use simdrive_scoring::{ScoringConfig, SoundCooldowns};

use crate::sensor::SensorKind;
use crate::{SessionError, SessionResult};

/// Embedded default profile.
pub const DEFAULT_SESSION_YAML: &str = include_str!("default_session.yaml");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Simulation ticks per second.
    pub tick_rate_hz: u32,
    /// Sleep between ticks to hold the tick rate. Off for tests and replays.
    pub realtime: bool,
    pub vehicle_blueprint: String,
    /// Sensors attached to every spawned vehicle.
    pub sensors: Vec<SensorKind>,
    pub sound_enabled: bool,
    pub input: InputMap,
    pub scoring: ScoringConfig,
    pub sound_cooldowns: SoundCooldowns,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60,
            realtime: true,
            vehicle_blueprint: "vehicle.mercedes.sprinter".to_string(),
            sensors: SensorKind::ALL.to_vec(),
            sound_enabled: true,
            input: InputMap::default(),
            scoring: ScoringConfig::default(),
            sound_cooldowns: SoundCooldowns::default(),
        }
    }
}

impl SessionConfig {
    /// Parse the embedded profile.
    ///
    /// # Errors
    ///
    /// Fails only if the embedded YAML is broken.
    pub fn embedded_default() -> SessionResult<Self> {
        Self::from_yaml_str(DEFAULT_SESSION_YAML)
    }

    /// Parse and validate a YAML profile.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Parse`] for malformed YAML or unknown fields
    /// and [`SessionError::InvalidConfig`] for out-of-range values.
    pub fn from_yaml_str(yaml: &str) -> SessionResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML profile from disk.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Read`] when the file cannot be read, otherwise
    /// as [`SessionConfig::from_yaml_str`].
    pub fn from_path(path: impl AsRef<Path>) -> SessionResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| SessionError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn to_yaml(&self) -> SessionResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found in any section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_range!("tick_rate_hz", self.tick_rate_hz, 1, 1000);
        if self.vehicle_blueprint.trim().is_empty() {
            return Err(ValidationError::required("vehicle_blueprint"));
        }
        for (i, kind) in self.sensors.iter().enumerate() {
            if self.sensors.iter().skip(i + 1).any(|other| other == kind) {
                return Err(ValidationError::constraint(format!(
                    "sensor {kind} listed more than once"
                )));
            }
        }
        self.input.validate()?;
        self.scoring.validate()?;
        self.sound_cooldowns.validate()?;
        Ok(())
    }

    /// Wall-clock length of one tick.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(1) / self.tick_rate_hz.max(1)
    }
}
