//! Error taxonomy for the simdrive stack
//!
//! Every crate in the workspace reports failures through the types defined
//! here, so the session layer can decide uniformly whether a failure is
//! recovered locally, surfaced to the driver, or fatal for the run.
//!
//! # Architecture
//!
//! - [`common`]: Top-level [`SimDriveError`], categories and severities
//! - [`device`]: Controller / hardware read failures (recovered locally)
//! - [`backend`]: Simulation backend failures (actor, sensor, connection)
//! - [`validation`]: Configuration validation failures
//!
//! # Recovery classes
//!
//! | Class | Example | Handling |
//! |---|---|---|
//! | Hardware read | axis index out of range | neutral value substituted, logged |
//! | Backend resource | sensor spawn failed | error notification, sensor disabled |
//! | Fatal | backend connection lost | teardown, process exit with cause |
//!
//! # Example
//!
//! ```
//! use simdrive_errors::prelude::*;
//!
//! fn check_deadzone(value: f32) -> Result<f32> {
//!     if !(0.0..1.0).contains(&value) {
//!         return Err(ValidationError::out_of_range("deadzone", value, 0.0, 1.0).into());
//!     }
//!     Ok(value)
//! }
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod backend;
pub mod common;
pub mod device;
pub mod prelude;
pub mod validation;

pub use backend::BackendError;
pub use common::{ErrorCategory, ErrorContext, ErrorSeverity, ResultExt, SimDriveError};
pub use device::DeviceError;
pub use validation::ValidationError;

/// A specialized `Result` type for simdrive operations.
pub type Result<T> = std::result::Result<T, SimDriveError>;
