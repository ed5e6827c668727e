//! Axis normalization
//!
//! Pure functions from a raw device reading to the bounded range the vehicle
//! control expects. Non-finite readings are treated as the neutral position.

use crate::types::{AxisMapping, PedalRange};

/// Normalize a steering axis to `[-1, 1]`.
///
/// Readings inside the center deadzone produce exactly zero. Outside it the
/// remaining travel is rescaled to `[0, 1]`, shaped by the response curve
/// exponent and signed again.
///
/// # Examples
///
/// ```
/// use simdrive_input::{AxisMapping, normalize_steer};
///
/// let mapping = AxisMapping::new(0, 0).with_deadzone(0.05);
/// assert!(normalize_steer(0.03, &mapping).abs() < 1e-6);
/// assert!((normalize_steer(1.0, &mapping) - 1.0).abs() < 1e-6);
/// ```
pub fn normalize_steer(raw: f32, mapping: &AxisMapping) -> f32 {
    if !raw.is_finite() {
        return 0.0;
    }

    let mut value = raw.clamp(-1.0, 1.0);
    if mapping.invert {
        value = -value;
    }

    let deadzone = sanitize_deadzone(mapping.deadzone);
    let magnitude = value.abs();
    if magnitude < deadzone {
        return 0.0;
    }

    let scaled = ((magnitude - deadzone) / (1.0 - deadzone)).clamp(0.0, 1.0);
    let curved = apply_response_curve(scaled, mapping.response_curve_exponent);

    (curved.copysign(value)).clamp(-1.0, 1.0)
}

/// Normalize a pedal axis to `[0, 1]`.
///
/// The raw reading is mapped according to the configured [`PedalRange`]
/// (after optional inversion), then values below the deadzone at the
/// released end are forced to zero.
///
/// # Examples
///
/// ```
/// use simdrive_input::{AxisMapping, PedalRange, normalize_pedal};
///
/// let mapping = AxisMapping::new(1, 2)
///     .with_deadzone(0.02)
///     .with_range(PedalRange::SymmetricInverted);
/// assert!(normalize_pedal(1.0, &mapping).abs() < 1e-6);
/// assert!((normalize_pedal(-1.0, &mapping) - 1.0).abs() < 1e-6);
/// ```
pub fn normalize_pedal(raw: f32, mapping: &AxisMapping) -> f32 {
    if !raw.is_finite() {
        return 0.0;
    }

    let value = if mapping.range.is_symmetric() {
        let clamped = raw.clamp(-1.0, 1.0);
        if mapping.invert { -clamped } else { clamped }
    } else {
        let clamped = raw.clamp(0.0, 1.0);
        if mapping.invert { 1.0 - clamped } else { clamped }
    };

    let mapped = match mapping.range {
        PedalRange::SymmetricInverted => (1.0 - value) / 2.0,
        PedalRange::Symmetric => (value + 1.0) / 2.0,
        PedalRange::Unipolar => value,
    };

    if mapped < sanitize_deadzone(mapping.deadzone) {
        return 0.0;
    }
    mapped.clamp(0.0, 1.0)
}

/// Shape a `[0, 1]` value with `value^exponent`.
///
/// Exponents below one make the center more sensitive, above one less.
/// Invalid exponents fall back to a linear response.
pub fn apply_response_curve(value: f32, exponent: f32) -> f32 {
    let exponent = if exponent.is_finite() && exponent > 0.0 {
        exponent
    } else {
        1.0
    };
    value.clamp(0.0, 1.0).powf(exponent)
}

fn sanitize_deadzone(deadzone: f32) -> f32 {
    if deadzone.is_finite() {
        deadzone.clamp(0.0, 0.99)
    } else {
        0.0
    }
}

impl AxisMapping {
    /// Raw reading at which this pedal mapping reports fully released.
    pub fn released_raw(&self) -> f32 {
        let raw = self.range.released_raw();
        self.apply_invert(raw)
    }

    /// Raw reading at which this pedal mapping reports fully pressed.
    pub fn pressed_raw(&self) -> f32 {
        let raw = self.range.pressed_raw();
        self.apply_invert(raw)
    }

    fn apply_invert(&self, raw: f32) -> f32 {
        match (self.invert, self.range) {
            (false, _) => raw,
            (true, PedalRange::Unipolar) => 1.0 - raw,
            (true, _) => -raw,
        }
    }
}
