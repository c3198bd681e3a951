//! Polled joystick input
//!
//! Joysticks are not event driven. The device layer samples every connected
//! slot once per frame and the router turns the difference between frames
//! into events for the one profile bound to that slot.
//!
//! A slot moves through `Disconnected -> Connected -> Bound` and back to
//! `Disconnected`; disconnecting drops the binding together with its history.

mod parameters;
mod registry;
mod state;

pub use parameters::{
    AxisDeadzone, JoystickParameters, JoystickSettings, DEFAULT_DEADZONE, DEFAULT_PRECISION_EPSILON,
};
pub use registry::{JoystickConnectionListener, JoystickDevice, JoystickSource, SlotStatus};
pub use state::{JoystickEvent, JoystickSample, JoystickState, BUTTON_PRESSED};

pub(crate) use registry::JoystickSlots;

/// Number of device slots, matching the windowing layer's joystick ids.
pub const SLOT_COUNT: usize = 16;
