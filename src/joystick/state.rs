//! Per-slot change detection for polled joystick input

use super::parameters::JoystickParameters;
use crate::controls::{
    Control, HatIndex, HatPosition, JoystickAxis, JoystickButton, JoystickDirection,
};
use crate::profile::{Category, InputValue};
use tracing::trace;

/// Raw button byte of a pressed button.
pub const BUTTON_PRESSED: u8 = 1;

/// One frame of raw device state, as sampled by the device layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoystickSample {
    pub axes: Vec<f32>,
    pub buttons: Vec<u8>,
    pub hats: Vec<u8>,
}

/// A change worth dispatching, derived from two consecutive samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JoystickEvent {
    Button(JoystickButton, bool),
    Axis(JoystickAxis, f64),
    Direction(JoystickAxis, JoystickDirection),
    Hat(HatIndex, HatPosition),
}

impl JoystickEvent {
    pub fn category(&self) -> Category {
        match self {
            JoystickEvent::Button(..) => Category::JoystickButton,
            JoystickEvent::Axis(..) => Category::JoystickAxis,
            JoystickEvent::Direction(..) => Category::JoystickDirection,
            JoystickEvent::Hat(..) => Category::JoystickHat,
        }
    }

    pub fn control(&self) -> Control {
        match *self {
            JoystickEvent::Button(button, _) => Control::JoystickButton(button),
            JoystickEvent::Axis(axis, _) | JoystickEvent::Direction(axis, _) => {
                Control::JoystickAxis(axis)
            }
            JoystickEvent::Hat(index, _) => Control::JoystickHat(index),
        }
    }

    pub fn value(&self) -> InputValue {
        match *self {
            JoystickEvent::Button(_, pressed) => InputValue::Pressed(pressed),
            JoystickEvent::Axis(_, amount) => InputValue::Amount(amount),
            JoystickEvent::Direction(_, direction) => InputValue::Direction(direction),
            JoystickEvent::Hat(_, position) => InputValue::Hat(position),
        }
    }
}

#[derive(Debug, Clone)]
struct Previous {
    axes: Vec<f64>,
    directions: Vec<JoystickDirection>,
    buttons: Vec<bool>,
    hats: Vec<u8>,
}

impl Previous {
    fn capture(params: &dyn JoystickParameters, sample: &JoystickSample) -> Self {
        let axes = sample
            .axes
            .iter()
            .enumerate()
            .map(|(index, &raw)| {
                let raw = if raw.is_finite() { f64::from(raw) } else { 0.0 };
                match params.axis_for_raw(index) {
                    Some(axis) => clamp(raw, params.deadzone(axis)),
                    None => raw,
                }
            })
            .collect();
        Self {
            axes,
            directions: sample
                .axes
                .iter()
                .map(|&raw| JoystickDirection::from_value(f64::from(raw)))
                .collect(),
            buttons: sample.buttons.iter().map(|&raw| raw == BUTTON_PRESSED).collect(),
            hats: sample.hats.clone(),
        }
    }
}

/// Last observed values of one device.
///
/// Sized by the first sample after (re)connection. Controls a later sample
/// reports beyond that size are ignored until the state is reset.
#[derive(Debug, Clone, Default)]
pub struct JoystickState {
    previous: Option<Previous>,
}

impl JoystickState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.previous.is_some()
    }

    /// Forgets every previous value; the next update only initializes.
    pub fn reset(&mut self) {
        self.previous = None;
    }

    /// Compares `sample` against the previous one and returns what changed.
    ///
    /// Events are ordered axes first (amount before direction per axis), then
    /// buttons, then hats. The first sample after a reset yields nothing.
    pub fn update(
        &mut self,
        params: &dyn JoystickParameters,
        sample: &JoystickSample,
    ) -> Vec<JoystickEvent> {
        let Some(previous) = self.previous.as_mut() else {
            trace!(
                "Initializing joystick state with {} axes, {} buttons, {} hats",
                sample.axes.len(),
                sample.buttons.len(),
                sample.hats.len()
            );
            self.previous = Some(Previous::capture(params, sample));
            return Vec::new();
        };

        let mut events = Vec::new();
        let epsilon = params.precision_epsilon();

        for (index, &raw) in sample.axes.iter().enumerate().take(previous.axes.len()) {
            let Some(axis) = params.axis_for_raw(index) else {
                continue;
            };
            // a glitched reading keeps the last good value
            if !raw.is_finite() {
                continue;
            }
            let raw = f64::from(raw);

            let amount = clamp(raw, params.deadzone(axis));
            if (amount - previous.axes[index]).abs() > epsilon {
                events.push(JoystickEvent::Axis(axis, amount));
            }
            previous.axes[index] = amount;

            let direction = JoystickDirection::from_value(raw);
            if direction != previous.directions[index] {
                events.push(JoystickEvent::Direction(axis, direction));
                previous.directions[index] = direction;
            }
        }

        for (index, &raw) in sample.buttons.iter().enumerate().take(previous.buttons.len()) {
            let Some(button) = params.button_for_raw(index) else {
                continue;
            };
            let pressed = raw == BUTTON_PRESSED;
            if pressed != previous.buttons[index] {
                events.push(JoystickEvent::Button(button, pressed));
                previous.buttons[index] = pressed;
            }
        }

        for (index, &code) in sample.hats.iter().enumerate().take(previous.hats.len()) {
            if code == previous.hats[index] {
                continue;
            }
            previous.hats[index] = code;
            let position = HatPosition::from_raw(i32::from(code));
            if let (Some(hat), Some(position)) = (HatIndex::new(index), position) {
                events.push(JoystickEvent::Hat(hat, position));
            }
        }

        events
    }
}

/// Clamps magnitudes below `deadzone` to exactly zero.
fn clamp(raw: f64, deadzone: f64) -> f64 {
    if raw.abs() < deadzone {
        0.0
    } else {
        raw
    }
}
