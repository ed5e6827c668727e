//! Controller input normalization
//!
//! This crate turns raw wheel, pedal and button state into a bounded
//! [`ControlCommand`] once per simulation tick. Steering gets a deadzone and
//! a power response curve, pedals get a configurable polarity mapping and a
//! released-end deadzone, and buttons toggle persistent state on their
//! rising edge only. Without controller hardware the normalizer falls back
//! to digital keyboard control.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod axis;
pub mod edge;
pub mod hardware;
pub mod keyboard;
pub mod normalizer;
pub mod transmission;
pub mod types;

pub use axis::*;
pub use edge::*;
pub use hardware::*;
pub use keyboard::*;
pub use normalizer::*;
pub use transmission::*;
pub use types::*;

use simdrive_errors::{DeviceError, ValidationError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Invalid input mapping: {0}")]
    InvalidMapping(#[from] ValidationError),

    #[error("Hardware error: {0}")]
    Hardware(#[from] DeviceError),
}

pub type InputResult<T> = Result<T, InputError>;

/// Speed (velocity magnitude) above which leaving reverse selects first gear.
pub const REVERSE_EXIT_SPEED: f32 = 0.1;
