//! Session errors.

use std::path::PathBuf;

use simdrive_errors::{BackendError, SimDriveError, ValidationError};
use simdrive_input::InputError;
use simdrive_scoring::ScoringError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Invalid session configuration: {0}")]
    InvalidConfig(#[from] ValidationError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error("Failed to parse session configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Session has been torn down")]
    TornDown,
}

impl SessionError {
    /// Whether the session cannot continue.
    pub fn is_fatal(&self) -> bool {
        match self {
            SessionError::Backend(err) => err.is_fatal(),
            SessionError::TornDown => true,
            _ => false,
        }
    }
}

impl From<SessionError> for SimDriveError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Backend(e) => SimDriveError::Backend(e),
            SessionError::InvalidConfig(e) => SimDriveError::Validation(e),
            SessionError::Input(InputError::InvalidMapping(e)) => SimDriveError::Validation(e),
            SessionError::Input(InputError::Hardware(e)) => SimDriveError::Device(e),
            SessionError::Scoring(e) => e.into(),
            SessionError::Read { source, .. } => SimDriveError::Io(source),
            other => SimDriveError::config(other.to_string()),
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;
