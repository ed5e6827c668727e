//! Configuration validation error types.

use core::fmt;

use crate::common::ErrorSeverity;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Value out of range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Field name
        field: String,
        /// The invalid value
        value: String,
        /// Minimum allowed value
        min: String,
        /// Maximum allowed value
        max: String,
    },

    /// Value is required but missing
    #[error("Required field '{0}' is missing")]
    Required(String),

    /// Value must be a finite number
    #[error("Field '{0}' must be a finite number")]
    NotFinite(String),

    /// Value must be strictly positive
    #[error("Field '{field}' must be greater than zero, got {value}")]
    NotPositive {
        /// Field name
        field: String,
        /// The invalid value
        value: String,
    },

    /// Constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

impl ValidationError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Error
    }

    /// Create an out of range error for a numeric value.
    pub fn out_of_range<T: fmt::Debug>(field: impl Into<String>, value: T, min: T, max: T) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            value: format!("{value:?}"),
            min: format!("{min:?}"),
            max: format!("{max:?}"),
        }
    }

    /// Create a required field error.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required(field.into())
    }

    /// Create a non-finite error.
    pub fn not_finite(field: impl Into<String>) -> Self {
        ValidationError::NotFinite(field.into())
    }

    /// Create a non-positive error.
    pub fn not_positive<T: fmt::Debug>(field: impl Into<String>, value: T) -> Self {
        ValidationError::NotPositive {
            field: field.into(),
            value: format!("{value:?}"),
        }
    }

    /// Create a constraint violation error.
    pub fn constraint(msg: impl Into<String>) -> Self {
        ValidationError::ConstraintViolation(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_out_of_range() {
        let err = ValidationError::out_of_range("steer.deadzone", 1.5_f32, 0.0_f32, 1.0_f32);
        let msg = err.to_string();
        assert!(msg.contains("steer.deadzone"));
        assert!(msg.contains("1.5"));
    }

    #[test]
    fn test_validation_error_required() {
        let err = ValidationError::required("input.steer");
        assert_eq!(err.to_string(), "Required field 'input.steer' is missing");
    }

    #[test]
    fn test_validation_error_not_positive() {
        let err = ValidationError::not_positive("response_curve_exponent", 0.0_f32);
        assert!(err.to_string().contains("response_curve_exponent"));
    }

    #[test]
    fn test_validation_error_severity() {
        assert_eq!(
            ValidationError::required("test").severity(),
            ErrorSeverity::Error
        );
    }

    #[test]
    fn test_validation_error_equality() {
        let err1 = ValidationError::not_finite("speed_limit_kmh");
        let err2 = ValidationError::not_finite("speed_limit_kmh");
        assert_eq!(err1, err2);
    }
}
