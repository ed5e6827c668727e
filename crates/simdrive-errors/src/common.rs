//! Top-level error type and classification shared by every simdrive crate.
//!
//! [`SimDriveError`] wraps the per-concern errors so that the session layer
//! can route any failure by [`ErrorCategory`] and [`ErrorSeverity`].

use core::fmt;

use crate::{BackendError, DeviceError, ValidationError};

/// Top-level error type that can wrap all simdrive sub-errors.
#[derive(Debug, thiserror::Error)]
pub enum SimDriveError {
    /// Controller hardware errors
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    /// Simulation backend errors
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl SimDriveError {
    /// Get the error category for classification.
    pub fn category(&self) -> ErrorCategory {
        match self {
            SimDriveError::Device(_) => ErrorCategory::Device,
            SimDriveError::Backend(_) => ErrorCategory::Backend,
            SimDriveError::Validation(_) => ErrorCategory::Validation,
            SimDriveError::Io(_) => ErrorCategory::IO,
            SimDriveError::Config(_) => ErrorCategory::Config,
            SimDriveError::Other(_) => ErrorCategory::Other,
        }
    }

    /// Get the error severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SimDriveError::Device(e) => e.severity(),
            SimDriveError::Backend(e) => e.severity(),
            SimDriveError::Validation(e) => e.severity(),
            SimDriveError::Io(_) => ErrorSeverity::Error,
            SimDriveError::Config(_) => ErrorSeverity::Error,
            SimDriveError::Other(_) => ErrorSeverity::Error,
        }
    }

    /// Check if this error is recoverable without ending the run.
    pub fn is_recoverable(&self) -> bool {
        self.severity() < ErrorSeverity::Critical
    }

    /// Create a configuration error with a message.
    pub fn config(msg: impl Into<String>) -> Self {
        SimDriveError::Config(msg.into())
    }

    /// Create a generic error with a message.
    pub fn other(msg: impl Into<String>) -> Self {
        SimDriveError::Other(msg.into())
    }
}

impl From<std::io::Error> for SimDriveError {
    fn from(e: std::io::Error) -> Self {
        SimDriveError::Io(e)
    }
}

/// Error category for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// Controller hardware errors
    Device = 0,
    /// Simulation backend errors
    Backend = 1,
    /// Configuration errors
    Config = 2,
    /// I/O errors
    IO = 3,
    /// Validation errors
    Validation = 4,
    /// Other errors
    Other = 255,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Device => write!(f, "Device"),
            ErrorCategory::Backend => write!(f, "Backend"),
            ErrorCategory::Config => write!(f, "Config"),
            ErrorCategory::IO => write!(f, "IO"),
            ErrorCategory::Validation => write!(f, "Validation"),
            ErrorCategory::Other => write!(f, "Other"),
        }
    }
}

/// Error severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ErrorSeverity {
    /// Informational, no action required
    Info = 0,
    /// Warning, recovered locally
    Warning = 1,
    /// Error, a subsystem is disabled for the run
    Error = 2,
    /// Critical, the run cannot continue
    Critical = 3,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Context information attached to an error on its way up.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// The operation that was being performed
    pub operation: String,
    /// Additional context key-value pairs
    pub context: Vec<(String, String)>,
}

impl ErrorContext {
    /// Create a new error context for an operation.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            context: Vec::new(),
        }
    }

    /// Add a context key-value pair.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.push((key.into(), value.into()));
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "operation: {}", self.operation)?;
        for (key, value) in &self.context {
            write!(f, ", {key}: {value}")?;
        }
        Ok(())
    }
}

/// Extension trait for adding context to errors.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, ctx: ErrorContext) -> Result<T, SimDriveError>;

    /// Add context with an operation name.
    fn with_context(self, operation: impl Into<String>) -> Result<T, SimDriveError>;
}

impl<T, E: Into<SimDriveError>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, ctx: ErrorContext) -> Result<T, SimDriveError> {
        self.map_err(|e| {
            let err: SimDriveError = e.into();
            match err {
                // Keep the category of fatal backend failures intact.
                SimDriveError::Backend(inner) if inner.severity() == ErrorSeverity::Critical => {
                    SimDriveError::Backend(inner)
                }
                other => SimDriveError::Other(format!("{ctx}: {other}")),
            }
        })
    }

    fn with_context(self, operation: impl Into<String>) -> Result<T, SimDriveError> {
        self.context(ErrorContext::new(operation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::Device.to_string(), "Device");
        assert_eq!(ErrorCategory::Backend.to_string(), "Backend");
        assert_eq!(ErrorCategory::Validation.to_string(), "Validation");
    }

    #[test]
    fn test_error_severity_ordering() {
        assert!(ErrorSeverity::Critical > ErrorSeverity::Error);
        assert!(ErrorSeverity::Error > ErrorSeverity::Warning);
        assert!(ErrorSeverity::Warning > ErrorSeverity::Info);
    }

    #[test]
    fn test_error_context() {
        let ctx = ErrorContext::new("attach_sensor")
            .with("sensor", "lane_invasion")
            .with("actor", "17");
        assert!(ctx.to_string().contains("attach_sensor"));
        assert!(ctx.to_string().contains("lane_invasion"));
    }

    #[test]
    fn test_category_routing() {
        let err: SimDriveError = DeviceError::axis_out_of_range(1, 9, 6).into();
        assert_eq!(err.category(), ErrorCategory::Device);

        let err = SimDriveError::config("bad yaml");
        assert_eq!(err.category(), ErrorCategory::Config);
    }

    #[test]
    fn test_connection_loss_is_not_recoverable() {
        let err: SimDriveError = BackendError::connection_lost("socket closed").into();
        assert!(!err.is_recoverable());

        let err: SimDriveError =
            BackendError::sensor_attach_failed("collision", "no blueprint").into();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_context_keeps_fatal_backend_errors() {
        let result: std::result::Result<(), BackendError> =
            Err(BackendError::connection_lost("timeout"));
        let with_ctx = result.with_context("advance");
        assert!(matches!(with_ctx, Err(SimDriveError::Backend(_))));
    }

    #[test]
    fn test_context_wraps_recoverable_errors() {
        let result: std::result::Result<(), DeviceError> = Err(DeviceError::disconnected(0));
        let with_ctx = result.with_context("poll_hardware");
        assert!(
            matches!(&with_ctx, Err(SimDriveError::Other(msg)) if msg.contains("poll_hardware")),
            "expected wrapped error, got {with_ctx:?}"
        );
    }
}
