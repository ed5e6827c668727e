//! Error types for scoring operations.

use simdrive_errors::ValidationError;
use thiserror::Error;

/// Scoring engine errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoringError {
    /// A tunable is outside its accepted range.
    #[error("Invalid scoring configuration: {0}")]
    InvalidConfig(#[from] ValidationError),
}

/// Result type for scoring operations.
pub type ScoringResult<T> = Result<T, ScoringError>;

impl From<ScoringError> for simdrive_errors::SimDriveError {
    fn from(err: ScoringError) -> Self {
        match err {
            ScoringError::InvalidConfig(inner) => inner.into(),
        }
    }
}
