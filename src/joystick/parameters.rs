use crate::controls::{JoystickAxis, JoystickButton};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PRECISION_EPSILON: f64 = 0.001;
pub const DEFAULT_DEADZONE: f64 = 0.05;

/// Per-device tuning of axis processing.
///
/// Raw index mapping defaults to the gamepad layout; devices with a different
/// layout override [`axis_for_raw`](Self::axis_for_raw) and
/// [`button_for_raw`](Self::button_for_raw).
pub trait JoystickParameters: Send + Sync {
    /// Minimum change of a clamped axis value that is reported.
    fn precision_epsilon(&self) -> f64;

    /// Raw magnitudes below this are clamped to zero.
    fn deadzone(&self, axis: JoystickAxis) -> f64;

    fn axis_for_raw(&self, raw: usize) -> Option<JoystickAxis> {
        i32::try_from(raw).ok().and_then(JoystickAxis::from_raw)
    }

    fn button_for_raw(&self, raw: usize) -> Option<JoystickButton> {
        i32::try_from(raw).ok().and_then(JoystickButton::from_raw)
    }
}

/// Deadzone override for one axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisDeadzone {
    pub axis: JoystickAxis,
    pub deadzone: f64,
}

/// Configurable [`JoystickParameters`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoystickSettings {
    pub precision_epsilon: f64,
    pub default_deadzone: f64,
    pub deadzones: Vec<AxisDeadzone>,
}

impl Default for JoystickSettings {
    fn default() -> Self {
        Self {
            precision_epsilon: DEFAULT_PRECISION_EPSILON,
            default_deadzone: DEFAULT_DEADZONE,
            deadzones: Vec::new(),
        }
    }
}

impl JoystickSettings {
    pub fn with_deadzone(mut self, axis: JoystickAxis, deadzone: f64) -> Self {
        self.deadzones.retain(|entry| entry.axis != axis);
        self.deadzones.push(AxisDeadzone { axis, deadzone });
        self
    }
}

impl JoystickParameters for JoystickSettings {
    fn precision_epsilon(&self) -> f64 {
        self.precision_epsilon
    }

    fn deadzone(&self, axis: JoystickAxis) -> f64 {
        self.deadzones
            .iter()
            .find(|entry| entry.axis == axis)
            .map_or(self.default_deadzone, |entry| entry.deadzone)
    }
}
