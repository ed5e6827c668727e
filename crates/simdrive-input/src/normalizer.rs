//! Per-tick control reading
//!
//! [`InputNormalizer`] owns the persistent input state (button edges,
//! transmission, handbrake, keyboard steering ramp) and turns one tick of
//! hardware or keyboard state into a fresh [`ControlCommand`].

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use simdrive_errors::DeviceError;
use tracing::{debug, info, warn};

use crate::InputResult;
use crate::axis::{normalize_pedal, normalize_steer};
use crate::edge::EdgeDetector;
use crate::hardware::{DeviceInventory, HardwareState, MappingIssue};
use crate::keyboard::{KeyboardState, KeyboardSteer};
use crate::transmission::Transmission;
use crate::types::{AxisControl, ButtonControl, ControlCommand, InputMap, gear_label};

/// Everything the normalizer needs for one tick.
#[derive(Clone, Copy)]
pub struct ControlInput<'a> {
    /// `None`, or a port with no devices, selects the keyboard fallback.
    pub hardware: Option<&'a dyn HardwareState>,
    pub keyboard: KeyboardState,
    /// Vehicle velocity magnitude.
    pub vehicle_speed: f32,
    /// Duration of the previous tick.
    pub elapsed_ms: f32,
}

impl<'a> ControlInput<'a> {
    pub fn hardware(hardware: &'a dyn HardwareState, vehicle_speed: f32, elapsed_ms: f32) -> Self {
        Self {
            hardware: Some(hardware),
            keyboard: KeyboardState::default(),
            vehicle_speed,
            elapsed_ms,
        }
    }

    pub fn keyboard(keyboard: KeyboardState, vehicle_speed: f32, elapsed_ms: f32) -> Self {
        Self {
            hardware: None,
            keyboard,
            vehicle_speed,
            elapsed_ms,
        }
    }
}

impl fmt::Debug for ControlInput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlInput")
            .field("hardware", &self.hardware.map(|h| h.device_count()))
            .field("keyboard", &self.keyboard)
            .field("vehicle_speed", &self.vehicle_speed)
            .field("elapsed_ms", &self.elapsed_ms)
            .finish()
    }
}

/// Where the last command came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSource {
    Hardware,
    #[default]
    Keyboard,
}

/// State change worth telling the driver about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlNotice {
    HandbrakeToggled(bool),
    GearChanged(i32),
    TransmissionMode { manual: bool },
    Autopilot(bool),
    RestartRequested,
}

impl fmt::Display for ControlNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlNotice::HandbrakeToggled(true) => write!(f, "Handbrake On"),
            ControlNotice::HandbrakeToggled(false) => write!(f, "Handbrake Off"),
            ControlNotice::GearChanged(gear) => write!(f, "Gear: {}", gear_label(*gear)),
            ControlNotice::TransmissionMode { manual: true } => write!(f, "Manual Transmission"),
            ControlNotice::TransmissionMode { manual: false } => {
                write!(f, "Automatic Transmission")
            }
            ControlNotice::Autopilot(true) => write!(f, "Autopilot On"),
            ControlNotice::Autopilot(false) => write!(f, "Autopilot Off"),
            ControlNotice::RestartRequested => write!(f, "Restarting"),
        }
    }
}

/// An analog control that fell back to its safe value this tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisFault {
    pub control: AxisControl,
    pub error: DeviceError,
}

/// Result of one [`InputNormalizer::read_controls`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlReading {
    pub command: ControlCommand,
    pub source: InputSource,
    pub notices: Vec<ControlNotice>,
    pub faults: Vec<AxisFault>,
}

impl ControlReading {
    pub fn restart_requested(&self) -> bool {
        self.notices.contains(&ControlNotice::RestartRequested)
    }
}

/// Converts raw controller state into vehicle control commands.
#[derive(Debug, Clone)]
pub struct InputNormalizer {
    map: InputMap,
    edges: EdgeDetector,
    transmission: Transmission,
    handbrake: bool,
    autopilot: bool,
    keyboard_steer: KeyboardSteer,
    source: Option<InputSource>,
    faulted: HashSet<AxisControl>,
}

impl InputNormalizer {
    /// Create a normalizer for a validated mapping.
    pub fn new(map: InputMap) -> InputResult<Self> {
        map.validate()?;
        Ok(Self {
            transmission: Transmission::new(map.max_forward_gear),
            map,
            edges: EdgeDetector::new(),
            handbrake: false,
            autopilot: false,
            keyboard_steer: KeyboardSteer::new(),
            source: None,
            faulted: HashSet::new(),
        })
    }

    pub fn map(&self) -> &InputMap {
        &self.map
    }

    pub fn transmission(&self) -> &Transmission {
        &self.transmission
    }

    pub fn handbrake(&self) -> bool {
        self.handbrake
    }

    /// Whether the backend is driving. Commands are still built while it is
    /// on, but the caller should not apply them.
    pub fn autopilot(&self) -> bool {
        self.autopilot
    }

    /// Force the autopilot flag, e.g. when the backend refused a toggle.
    pub fn set_autopilot(&mut self, enabled: bool) {
        self.autopilot = enabled;
    }

    /// Compare the mapping with the detected hardware and log every issue.
    ///
    /// Issues are never fatal; affected controls fall back to safe values.
    pub fn check_hardware(&self, inventory: &DeviceInventory) -> Vec<MappingIssue> {
        let issues = self.map.check_against(inventory);
        if inventory.is_empty() {
            info!("No controller hardware detected, using keyboard control");
            return issues;
        }
        for issue in &issues {
            warn!(
                control = issue.control,
                error = %issue.error,
                "Input mapping not satisfied by hardware"
            );
        }
        issues
    }

    /// Restore the power-on input state, e.g. after a respawn.
    ///
    /// Button levels are kept, so a button still held across the reset does
    /// not produce a new edge.
    pub fn reset(&mut self) {
        self.transmission.reset();
        self.handbrake = false;
        self.autopilot = false;
        self.keyboard_steer.reset();
    }

    /// Read one tick of input and build the control command.
    pub fn read_controls(&mut self, input: &ControlInput<'_>) -> ControlReading {
        let hardware = input.hardware.filter(|h| h.device_count() > 0);
        let source = if hardware.is_some() {
            InputSource::Hardware
        } else {
            InputSource::Keyboard
        };
        if self.source != Some(source) {
            info!(?source, "Input source selected");
            self.edges.reset();
            self.source = Some(source);
        }

        let mut notices = Vec::new();
        let mut faults = Vec::new();

        let (steer, throttle, brake) = match hardware {
            Some(hw) => {
                let buttons = self.poll_buttons(hw);
                self.apply_buttons(&buttons, input.vehicle_speed, true, &mut notices);
                (
                    self.read_axis(hw, AxisControl::Steer, &mut faults),
                    self.read_axis(hw, AxisControl::Throttle, &mut faults),
                    self.read_axis(hw, AxisControl::Brake, &mut faults),
                )
            }
            None => {
                let keys = input.keyboard;
                let buttons = ButtonLevels {
                    handbrake: keys.handbrake,
                    reverse: keys.reverse,
                    gear_up: keys.gear_up,
                    gear_down: keys.gear_down,
                    manual_toggle: keys.manual_toggle,
                    restart: keys.restart,
                    autopilot: keys.autopilot,
                };
                self.apply_buttons(&buttons, input.vehicle_speed, false, &mut notices);
                (
                    self.keyboard_steer
                        .update(keys.left, keys.right, input.elapsed_ms),
                    if keys.accelerate { 1.0 } else { 0.0 },
                    if keys.brake { 1.0 } else { 0.0 },
                )
            }
        };

        let gear = self.transmission.gear();
        ControlReading {
            command: ControlCommand {
                steer: steer.clamp(-1.0, 1.0),
                throttle: throttle.clamp(0.0, 1.0),
                brake: brake.clamp(0.0, 1.0),
                handbrake: self.handbrake,
                gear,
                manual: self.transmission.is_manual(),
                reverse: gear < 0,
            },
            source,
            notices,
            faults,
        }
    }

    fn read_axis(
        &mut self,
        hardware: &dyn HardwareState,
        control: AxisControl,
        faults: &mut Vec<AxisFault>,
    ) -> f32 {
        let mapping = self.map.axis(control);
        match hardware.axis(mapping.device_index, mapping.axis_index) {
            Ok(raw) => {
                if self.faulted.remove(&control) {
                    info!(control = control.name(), "Axis reading recovered");
                }
                match control {
                    AxisControl::Steer => normalize_steer(raw, mapping),
                    AxisControl::Throttle | AxisControl::Brake => normalize_pedal(raw, mapping),
                }
            }
            Err(error) => {
                if self.faulted.insert(control) {
                    warn!(
                        control = control.name(),
                        device = mapping.device_index,
                        axis = mapping.axis_index,
                        %error,
                        "Axis read failed, substituting safe value"
                    );
                }
                faults.push(AxisFault { control, error });
                control.safe_value()
            }
        }
    }

    fn poll_buttons(&self, hardware: &dyn HardwareState) -> ButtonLevels {
        let level = |control: ButtonControl| -> bool {
            let Some(mapping) = self.map.button(control) else {
                return false;
            };
            match hardware.button(mapping.device_index, mapping.button_index) {
                Ok(pressed) => pressed,
                Err(error) => {
                    debug!(control = control.name(), %error, "Button read failed");
                    false
                }
            }
        };
        ButtonLevels {
            handbrake: level(ButtonControl::Handbrake),
            reverse: level(ButtonControl::Reverse),
            gear_up: level(ButtonControl::GearUp),
            gear_down: level(ButtonControl::GearDown),
            manual_toggle: level(ButtonControl::ManualToggle),
            restart: level(ButtonControl::Restart),
            autopilot: level(ButtonControl::Autopilot),
        }
    }

    fn apply_buttons(
        &mut self,
        buttons: &ButtonLevels,
        vehicle_speed: f32,
        handbrake_toggles: bool,
        notices: &mut Vec<ControlNotice>,
    ) {
        let handbrake_edge = self.edges.rising(ButtonControl::Handbrake, buttons.handbrake);
        if handbrake_toggles {
            if handbrake_edge {
                self.handbrake = !self.handbrake;
                notices.push(ControlNotice::HandbrakeToggled(self.handbrake));
            }
        } else {
            self.handbrake = buttons.handbrake;
        }

        if self.edges.rising(ButtonControl::ManualToggle, buttons.manual_toggle) {
            let manual = self.transmission.toggle_manual();
            notices.push(ControlNotice::TransmissionMode { manual });
        }

        if self.edges.rising(ButtonControl::Reverse, buttons.reverse) {
            let gear = self.transmission.toggle_reverse(vehicle_speed);
            notices.push(ControlNotice::GearChanged(gear));
        }

        if self.edges.rising(ButtonControl::GearUp, buttons.gear_up) && self.transmission.shift_up()
        {
            notices.push(ControlNotice::GearChanged(self.transmission.gear()));
        }

        if self.edges.rising(ButtonControl::GearDown, buttons.gear_down)
            && self.transmission.shift_down()
        {
            notices.push(ControlNotice::GearChanged(self.transmission.gear()));
        }

        if self.edges.rising(ButtonControl::Autopilot, buttons.autopilot) {
            self.autopilot = !self.autopilot;
            notices.push(ControlNotice::Autopilot(self.autopilot));
        }

        if self.edges.rising(ButtonControl::Restart, buttons.restart) {
            notices.push(ControlNotice::RestartRequested);
        }

        for notice in notices.iter() {
            debug!(%notice, "Control state changed");
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ButtonLevels {
    handbrake: bool,
    reverse: bool,
    gear_up: bool,
    gear_down: bool,
    manual_toggle: bool,
    restart: bool,
    autopilot: bool,
}
