//! Controller hardware error types.
//!
//! Hardware failures never end a run: the input layer substitutes a safe
//! neutral value for the affected control and reports the condition.

use crate::common::ErrorSeverity;

/// Controller and hardware errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    /// No controller hardware was detected
    #[error("No controller hardware detected")]
    NoControllers,

    /// Device index is not present
    #[error("Device {0} not found")]
    NotFound(usize),

    /// Device disappeared during the run
    #[error("Device {0} disconnected")]
    Disconnected(usize),

    /// Axis index is not available on the device
    #[error("Axis {axis} out of range for device {device} ({available} axes)")]
    AxisOutOfRange {
        /// Device index
        device: usize,
        /// Requested axis index
        axis: usize,
        /// Number of axes the device exposes
        available: usize,
    },

    /// Button index is not available on the device
    #[error("Button {button} out of range for device {device} ({available} buttons)")]
    ButtonOutOfRange {
        /// Device index
        device: usize,
        /// Requested button index
        button: usize,
        /// Number of buttons the device exposes
        available: usize,
    },

    /// Device returned a non-finite axis value
    #[error("Device {device} axis {axis} returned a non-finite value")]
    InvalidReading {
        /// Device index
        device: usize,
        /// Axis index
        axis: usize,
    },
}

impl DeviceError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            DeviceError::NoControllers => ErrorSeverity::Info,
            DeviceError::NotFound(_) => ErrorSeverity::Warning,
            DeviceError::Disconnected(_) => ErrorSeverity::Warning,
            DeviceError::AxisOutOfRange { .. } => ErrorSeverity::Warning,
            DeviceError::ButtonOutOfRange { .. } => ErrorSeverity::Warning,
            DeviceError::InvalidReading { .. } => ErrorSeverity::Warning,
        }
    }

    /// Check if this error indicates the whole device is unavailable.
    pub fn is_device_unavailable(&self) -> bool {
        matches!(
            self,
            DeviceError::NoControllers | DeviceError::NotFound(_) | DeviceError::Disconnected(_)
        )
    }

    /// Create a not found error.
    pub fn not_found(device: usize) -> Self {
        DeviceError::NotFound(device)
    }

    /// Create a disconnected error.
    pub fn disconnected(device: usize) -> Self {
        DeviceError::Disconnected(device)
    }

    /// Create an axis out of range error.
    pub fn axis_out_of_range(device: usize, axis: usize, available: usize) -> Self {
        DeviceError::AxisOutOfRange {
            device,
            axis,
            available,
        }
    }

    /// Create a button out of range error.
    pub fn button_out_of_range(device: usize, button: usize, available: usize) -> Self {
        DeviceError::ButtonOutOfRange {
            device,
            button,
            available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_out_of_range_display() {
        let err = DeviceError::axis_out_of_range(1, 7, 6);
        let msg = err.to_string();
        assert!(msg.contains("Axis 7"));
        assert!(msg.contains("device 1"));
        assert!(msg.contains("6 axes"));
    }

    #[test]
    fn test_hardware_errors_never_fatal() {
        let errors = [
            DeviceError::NoControllers,
            DeviceError::not_found(0),
            DeviceError::disconnected(1),
            DeviceError::axis_out_of_range(0, 3, 2),
            DeviceError::button_out_of_range(0, 30, 12),
            DeviceError::InvalidReading { device: 0, axis: 0 },
        ];
        for err in errors {
            assert!(err.severity() < ErrorSeverity::Error, "{err} should be recoverable");
        }
    }

    #[test]
    fn test_device_unavailable() {
        assert!(DeviceError::disconnected(0).is_device_unavailable());
        assert!(DeviceError::NoControllers.is_device_unavailable());
        assert!(!DeviceError::axis_out_of_range(0, 1, 1).is_device_unavailable());
    }
}
