//! Prelude module for convenient error handling imports.
//!
//! # Example
//!
//! ```
//! use simdrive_errors::prelude::*;
//!
//! fn load(path: &str) -> Result<String> {
//!     if path.is_empty() {
//!         return Err(ValidationError::required("path").into());
//!     }
//!     Ok(path.to_string())
//! }
//! # assert!(load("").is_err());
//! ```

pub use crate::{
    Result,
    backend::BackendError,
    common::{ErrorCategory, ErrorContext, ErrorSeverity, ResultExt, SimDriveError},
    device::DeviceError,
    validation::ValidationError,
};

/// Return early with an out of range validation error.
#[macro_export]
macro_rules! validate_range {
    ($field:expr, $value:expr, $min:expr, $max:expr) => {
        if !($value >= $min && $value <= $max) {
            return Err($crate::ValidationError::out_of_range($field, $value, $min, $max).into());
        }
    };
}
