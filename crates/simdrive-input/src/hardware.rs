//! Hardware input port
//!
//! [`HardwareState`] is the seam to whatever joystick layer enumerates the
//! devices. [`ControllerSnapshot`] is a plain in-memory implementation used
//! by simulated rigs and tests.

use serde::{Deserialize, Serialize};
use simdrive_errors::DeviceError;

use crate::types::{AxisControl, ButtonControl, InputMap};

/// Polled controller state for one tick.
pub trait HardwareState {
    fn device_count(&self) -> usize;

    fn axis_count(&self, device: usize) -> Option<usize>;

    fn button_count(&self, device: usize) -> Option<usize>;

    fn axis(&self, device: usize, axis: usize) -> Result<f32, DeviceError>;

    fn button(&self, device: usize, button: usize) -> Result<bool, DeviceError>;
}

/// Current values of one enumerated device.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub name: String,
    pub axes: Vec<f32>,
    pub buttons: Vec<bool>,
}

impl DeviceSnapshot {
    pub fn new(name: impl Into<String>, axis_count: usize, button_count: usize) -> Self {
        Self {
            name: name.into(),
            axes: vec![0.0; axis_count],
            buttons: vec![false; button_count],
        }
    }
}

/// In-memory [`HardwareState`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ControllerSnapshot {
    pub devices: Vec<DeviceSnapshot>,
}

impl ControllerSnapshot {
    pub fn new(devices: Vec<DeviceSnapshot>) -> Self {
        Self { devices }
    }

    /// Rig matching [`InputMap::fanatec_default`]: a keyboard-like device 0
    /// and the wheel base on device 1 with pedals released.
    pub fn fanatec_rig() -> Self {
        let mut wheel = DeviceSnapshot::new("Fanatec Wheel", 6, 12);
        for pedal_axis in [2, 3] {
            if let Some(value) = wheel.axes.get_mut(pedal_axis) {
                *value = 1.0;
            }
        }
        Self::new(vec![DeviceSnapshot::new("Generic Device", 2, 4), wheel])
    }

    /// Set an axis value. Returns `false` when the slot does not exist.
    pub fn set_axis(&mut self, device: usize, axis: usize, value: f32) -> bool {
        match self
            .devices
            .get_mut(device)
            .and_then(|d| d.axes.get_mut(axis))
        {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Set a button level. Returns `false` when the slot does not exist.
    pub fn set_button(&mut self, device: usize, button: usize, pressed: bool) -> bool {
        match self
            .devices
            .get_mut(device)
            .and_then(|d| d.buttons.get_mut(button))
        {
            Some(slot) => {
                *slot = pressed;
                true
            }
            None => false,
        }
    }

    fn device(&self, device: usize) -> Result<&DeviceSnapshot, DeviceError> {
        self.devices
            .get(device)
            .ok_or(DeviceError::not_found(device))
    }
}

impl HardwareState for ControllerSnapshot {
    fn device_count(&self) -> usize {
        self.devices.len()
    }

    fn axis_count(&self, device: usize) -> Option<usize> {
        self.devices.get(device).map(|d| d.axes.len())
    }

    fn button_count(&self, device: usize) -> Option<usize> {
        self.devices.get(device).map(|d| d.buttons.len())
    }

    fn axis(&self, device: usize, axis: usize) -> Result<f32, DeviceError> {
        let snapshot = self.device(device)?;
        let value = snapshot
            .axes
            .get(axis)
            .copied()
            .ok_or(DeviceError::axis_out_of_range(device, axis, snapshot.axes.len()))?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(DeviceError::InvalidReading { device, axis })
        }
    }

    fn button(&self, device: usize, button: usize) -> Result<bool, DeviceError> {
        let snapshot = self.device(device)?;
        snapshot
            .buttons
            .get(button)
            .copied()
            .ok_or(DeviceError::button_out_of_range(
                device,
                button,
                snapshot.buttons.len(),
            ))
    }
}

/// Shape of one detected device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub name: String,
    pub axis_count: usize,
    pub button_count: usize,
}

/// Devices detected at startup.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceInventory {
    pub devices: Vec<DeviceInfo>,
}

impl DeviceInventory {
    pub fn from_snapshot(snapshot: &ControllerSnapshot) -> Self {
        Self {
            devices: snapshot
                .devices
                .iter()
                .map(|d| DeviceInfo {
                    name: d.name.clone(),
                    axis_count: d.axes.len(),
                    button_count: d.buttons.len(),
                })
                .collect(),
        }
    }

    /// Build an inventory from any hardware port. Devices are unnamed.
    pub fn probe(hardware: &dyn HardwareState) -> Self {
        Self {
            devices: (0..hardware.device_count())
                .map(|index| DeviceInfo {
                    name: format!("device {index}"),
                    axis_count: hardware.axis_count(index).unwrap_or(0),
                    button_count: hardware.button_count(index).unwrap_or(0),
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

/// A mapping that cannot be satisfied by the detected hardware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingIssue {
    pub control: &'static str,
    pub error: DeviceError,
}

impl std::fmt::Display for MappingIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.control, self.error)
    }
}

impl InputMap {
    /// Report every mapping that references a missing device, axis or button.
    pub fn check_against(&self, inventory: &DeviceInventory) -> Vec<MappingIssue> {
        if inventory.is_empty() {
            return vec![MappingIssue {
                control: "controller",
                error: DeviceError::NoControllers,
            }];
        }

        let mut issues = Vec::new();
        for control in AxisControl::ALL {
            let mapping = self.axis(control);
            match inventory.devices.get(mapping.device_index) {
                None => issues.push(MappingIssue {
                    control: control.name(),
                    error: DeviceError::not_found(mapping.device_index),
                }),
                Some(info) if mapping.axis_index >= info.axis_count => {
                    issues.push(MappingIssue {
                        control: control.name(),
                        error: DeviceError::axis_out_of_range(
                            mapping.device_index,
                            mapping.axis_index,
                            info.axis_count,
                        ),
                    })
                }
                Some(_) => {}
            }
        }

        for control in ButtonControl::ALL {
            let Some(mapping) = self.button(control) else {
                continue;
            };
            match inventory.devices.get(mapping.device_index) {
                None => issues.push(MappingIssue {
                    control: control.name(),
                    error: DeviceError::not_found(mapping.device_index),
                }),
                Some(info) if mapping.button_index >= info.button_count => {
                    issues.push(MappingIssue {
                        control: control.name(),
                        error: DeviceError::button_out_of_range(
                            mapping.device_index,
                            mapping.button_index,
                            info.button_count,
                        ),
                    })
                }
                Some(_) => {}
            }
        }
        issues
    }
}
