//! Input type definitions

use serde::{Deserialize, Serialize};
use simdrive_errors::{ValidationError, validate_range};

pub const NEUTRAL_GEAR: i32 = 0;
pub const REVERSE_GEAR: i32 = -1;
pub const DRIVE_GEAR: i32 = 1;
pub const DEFAULT_MAX_FORWARD_GEAR: i32 = 6;

/// Vehicle control produced once per tick.
///
/// Built fresh by [`InputNormalizer::read_controls`](crate::InputNormalizer::read_controls)
/// and never mutated afterwards. `reverse` always mirrors `gear < 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlCommand {
    pub steer: f32,
    pub throttle: f32,
    pub brake: f32,
    pub handbrake: bool,
    pub gear: i32,
    pub manual: bool,
    pub reverse: bool,
}

impl ControlCommand {
    /// Command that holds the vehicle still.
    pub fn stopped() -> Self {
        Self {
            steer: 0.0,
            throttle: 0.0,
            brake: 1.0,
            handbrake: false,
            gear: DRIVE_GEAR,
            manual: false,
            reverse: false,
        }
    }

    /// Gear label shown on the dashboard.
    pub fn gear_label(&self) -> String {
        gear_label(self.gear)
    }
}

impl Default for ControlCommand {
    fn default() -> Self {
        Self {
            steer: 0.0,
            throttle: 0.0,
            brake: 0.0,
            handbrake: false,
            gear: DRIVE_GEAR,
            manual: false,
            reverse: false,
        }
    }
}

/// Format a gear number: `-1` is `R`, `0` is `N`.
pub fn gear_label(gear: i32) -> String {
    match gear {
        g if g < NEUTRAL_GEAR => "R".to_string(),
        NEUTRAL_GEAR => "N".to_string(),
        g => g.to_string(),
    }
}

/// How a raw axis value maps onto the `[0, 1]` pedal range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PedalRange {
    /// Raw `-1..1`, released at `+1`: `(1 - raw) / 2`.
    #[default]
    SymmetricInverted,
    /// Raw `-1..1`, released at `-1`: `(raw + 1) / 2`.
    Symmetric,
    /// Raw already `0..1`.
    Unipolar,
}

impl PedalRange {
    /// Raw value at which the pedal is fully released.
    pub fn released_raw(self) -> f32 {
        match self {
            PedalRange::SymmetricInverted => 1.0,
            PedalRange::Symmetric => -1.0,
            PedalRange::Unipolar => 0.0,
        }
    }

    /// Raw value at which the pedal is fully pressed.
    pub fn pressed_raw(self) -> f32 {
        match self {
            PedalRange::SymmetricInverted => -1.0,
            PedalRange::Symmetric => 1.0,
            PedalRange::Unipolar => 1.0,
        }
    }

    pub fn is_symmetric(self) -> bool {
        !matches!(self, PedalRange::Unipolar)
    }
}

/// Binding of one logical analog control to a device axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxisMapping {
    pub device_index: usize,
    pub axis_index: usize,
    /// Center deadzone for steering, released-end deadzone for pedals.
    #[serde(default)]
    pub deadzone: f32,
    #[serde(default = "default_exponent")]
    pub response_curve_exponent: f32,
    #[serde(default)]
    pub invert: bool,
    /// Only used by pedal mappings.
    #[serde(default)]
    pub range: PedalRange,
}

fn default_exponent() -> f32 {
    1.0
}

impl AxisMapping {
    pub fn new(device_index: usize, axis_index: usize) -> Self {
        Self {
            device_index,
            axis_index,
            deadzone: 0.0,
            response_curve_exponent: 1.0,
            invert: false,
            range: PedalRange::default(),
        }
    }

    pub fn with_deadzone(mut self, deadzone: f32) -> Self {
        self.deadzone = deadzone;
        self
    }

    pub fn with_exponent(mut self, exponent: f32) -> Self {
        self.response_curve_exponent = exponent;
        self
    }

    pub fn with_invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    pub fn with_range(mut self, range: PedalRange) -> Self {
        self.range = range;
        self
    }

    /// Validate the mapping. `name` prefixes the reported field names.
    pub fn validate(&self, name: &str) -> Result<(), ValidationError> {
        if !self.deadzone.is_finite() {
            return Err(ValidationError::not_finite(format!("{name}.deadzone")));
        }
        if !(0.0..1.0).contains(&self.deadzone) {
            return Err(ValidationError::out_of_range(
                format!("{name}.deadzone"),
                self.deadzone,
                0.0,
                1.0,
            ));
        }
        if !self.response_curve_exponent.is_finite() {
            return Err(ValidationError::not_finite(format!(
                "{name}.response_curve_exponent"
            )));
        }
        if self.response_curve_exponent <= 0.0 {
            return Err(ValidationError::not_positive(
                format!("{name}.response_curve_exponent"),
                self.response_curve_exponent,
            ));
        }
        Ok(())
    }
}

/// Binding of one digital control to a device button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ButtonMapping {
    pub device_index: usize,
    pub button_index: usize,
}

impl ButtonMapping {
    pub fn new(device_index: usize, button_index: usize) -> Self {
        Self {
            device_index,
            button_index,
        }
    }
}

/// Button-driven controls. Each toggles on its rising edge only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonControl {
    Handbrake,
    Reverse,
    GearUp,
    GearDown,
    ManualToggle,
    Restart,
    Autopilot,
}

impl ButtonControl {
    pub const ALL: [ButtonControl; 7] = [
        ButtonControl::Handbrake,
        ButtonControl::Reverse,
        ButtonControl::GearUp,
        ButtonControl::GearDown,
        ButtonControl::ManualToggle,
        ButtonControl::Restart,
        ButtonControl::Autopilot,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ButtonControl::Handbrake => "handbrake",
            ButtonControl::Reverse => "reverse",
            ButtonControl::GearUp => "gear_up",
            ButtonControl::GearDown => "gear_down",
            ButtonControl::ManualToggle => "manual_toggle",
            ButtonControl::Restart => "restart",
            ButtonControl::Autopilot => "autopilot",
        }
    }
}

/// Analog controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisControl {
    Steer,
    Throttle,
    Brake,
}

impl AxisControl {
    pub const ALL: [AxisControl; 3] = [
        AxisControl::Steer,
        AxisControl::Throttle,
        AxisControl::Brake,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AxisControl::Steer => "steer",
            AxisControl::Throttle => "throttle",
            AxisControl::Brake => "brake",
        }
    }

    /// Value substituted when the axis cannot be read.
    ///
    /// Fails toward stopping: no steering, no throttle, full brake.
    pub fn safe_value(self) -> f32 {
        match self {
            AxisControl::Steer => 0.0,
            AxisControl::Throttle => 0.0,
            AxisControl::Brake => 1.0,
        }
    }
}

/// Declarative controller layout, loaded once and validated at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputMap {
    pub steer: AxisMapping,
    pub throttle: AxisMapping,
    pub brake: AxisMapping,
    #[serde(default)]
    pub handbrake: Option<ButtonMapping>,
    #[serde(default)]
    pub reverse: Option<ButtonMapping>,
    #[serde(default)]
    pub gear_up: Option<ButtonMapping>,
    #[serde(default)]
    pub gear_down: Option<ButtonMapping>,
    #[serde(default)]
    pub manual_toggle: Option<ButtonMapping>,
    #[serde(default)]
    pub restart: Option<ButtonMapping>,
    /// Unmapped on the demo rig; the keyboard toggle always works.
    #[serde(default)]
    pub autopilot: Option<ButtonMapping>,
    #[serde(default = "default_max_forward_gear")]
    pub max_forward_gear: i32,
}

fn default_max_forward_gear() -> i32 {
    DEFAULT_MAX_FORWARD_GEAR
}

impl Default for InputMap {
    fn default() -> Self {
        Self::fanatec_default()
    }
}

impl InputMap {
    /// Fanatec wheel and pedals as enumerated on the demo rig.
    pub fn fanatec_default() -> Self {
        const WHEEL: usize = 1;
        Self {
            steer: AxisMapping::new(WHEEL, 0)
                .with_deadzone(0.05)
                .with_exponent(0.32),
            throttle: AxisMapping::new(WHEEL, 2)
                .with_deadzone(0.02)
                .with_range(PedalRange::SymmetricInverted),
            brake: AxisMapping::new(WHEEL, 3)
                .with_deadzone(0.02)
                .with_range(PedalRange::SymmetricInverted),
            handbrake: Some(ButtonMapping::new(WHEEL, 0)),
            reverse: Some(ButtonMapping::new(WHEEL, 1)),
            gear_up: Some(ButtonMapping::new(WHEEL, 4)),
            gear_down: Some(ButtonMapping::new(WHEEL, 5)),
            manual_toggle: Some(ButtonMapping::new(WHEEL, 2)),
            restart: Some(ButtonMapping::new(WHEEL, 8)),
            autopilot: None,
            max_forward_gear: DEFAULT_MAX_FORWARD_GEAR,
        }
    }

    pub fn axis(&self, control: AxisControl) -> &AxisMapping {
        match control {
            AxisControl::Steer => &self.steer,
            AxisControl::Throttle => &self.throttle,
            AxisControl::Brake => &self.brake,
        }
    }

    pub fn button(&self, control: ButtonControl) -> Option<ButtonMapping> {
        match control {
            ButtonControl::Handbrake => self.handbrake,
            ButtonControl::Reverse => self.reverse,
            ButtonControl::GearUp => self.gear_up,
            ButtonControl::GearDown => self.gear_down,
            ButtonControl::ManualToggle => self.manual_toggle,
            ButtonControl::Restart => self.restart,
            ButtonControl::Autopilot => self.autopilot,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for control in AxisControl::ALL {
            self.axis(control).validate(control.name())?;
        }
        validate_range!("max_forward_gear", self.max_forward_gear, 1, 99);
        Ok(())
    }
}
