//! Simulation backend error types.
//!
//! Resource failures (an actor or sensor that fails to spawn) disable the
//! affected subsystem for the run. Losing the backend connection is fatal.

use crate::common::ErrorSeverity;

/// Simulation backend errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// Vehicle actor could not be spawned
    #[error("Failed to spawn vehicle '{blueprint}': {reason}")]
    SpawnFailed {
        /// Blueprint identifier
        blueprint: String,
        /// Failure reason
        reason: String,
    },

    /// Sensor could not be attached to the vehicle
    #[error("Failed to attach {sensor} sensor: {reason}")]
    SensorAttachFailed {
        /// Sensor kind
        sensor: String,
        /// Failure reason
        reason: String,
    },

    /// Actor id is unknown to the backend
    #[error("Actor {0} not found")]
    ActorNotFound(u64),

    /// Control could not be applied this tick
    #[error("Failed to apply control: {0}")]
    ControlRejected(String),

    /// Connection to the backend is gone
    #[error("Backend connection lost: {0}")]
    ConnectionLost(String),
}

impl BackendError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            BackendError::SpawnFailed { .. } => ErrorSeverity::Error,
            BackendError::SensorAttachFailed { .. } => ErrorSeverity::Error,
            BackendError::ActorNotFound(_) => ErrorSeverity::Warning,
            BackendError::ControlRejected(_) => ErrorSeverity::Warning,
            BackendError::ConnectionLost(_) => ErrorSeverity::Critical,
        }
    }

    /// Check if the run must end.
    pub fn is_fatal(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }

    /// Create a spawn failure.
    pub fn spawn_failed(blueprint: impl Into<String>, reason: impl Into<String>) -> Self {
        BackendError::SpawnFailed {
            blueprint: blueprint.into(),
            reason: reason.into(),
        }
    }

    /// Create a sensor attach failure.
    pub fn sensor_attach_failed(sensor: impl Into<String>, reason: impl Into<String>) -> Self {
        BackendError::SensorAttachFailed {
            sensor: sensor.into(),
            reason: reason.into(),
        }
    }

    /// Create a connection lost error.
    pub fn connection_lost(reason: impl Into<String>) -> Self {
        BackendError::ConnectionLost(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensor_attach_display() {
        let err = BackendError::sensor_attach_failed("lane_invasion", "blueprint missing");
        assert_eq!(
            err.to_string(),
            "Failed to attach lane_invasion sensor: blueprint missing"
        );
    }

    #[test]
    fn test_only_connection_loss_is_fatal() {
        assert!(BackendError::connection_lost("eof").is_fatal());
        assert!(!BackendError::spawn_failed("vehicle.a", "occupied").is_fatal());
        assert!(!BackendError::sensor_attach_failed("gnss", "x").is_fatal());
        assert!(!BackendError::ActorNotFound(3).is_fatal());
        assert!(!BackendError::ControlRejected("stale".into()).is_fatal());
    }
}
