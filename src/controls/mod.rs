//! Control identities
//!
//! Closed sets of identities for every physical control the router knows about.
//! Each set maps to and from the raw numeric ids reported by the windowing and
//! device layer (GLFW numbering):
//!
//! - [`Key`] - keyboard keys
//! - [`MouseButton`], [`MouseAxis`] - pointer buttons and axes
//! - [`JoystickButton`], [`JoystickAxis`] - gamepad-layout joystick controls
//! - [`HatIndex`], [`HatPosition`] - hat switches and their positions
//! - [`JoystickDirection`] - the discrete direction derived from an axis
//!
//! Raw lookups return `None` for ids outside the mapped range. Hardware reports
//! such ids all the time, so callers drop them instead of treating them as errors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declares a closed control enum together with its raw id table.
macro_rules! control_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $raw:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every identity in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Looks up the identity for a raw device id.
            pub fn from_raw(raw: i32) -> Option<Self> {
                match raw {
                    $($raw => Some($name::$variant),)+
                    _ => None,
                }
            }

            /// The raw device id of this identity.
            pub fn raw_id(self) -> i32 {
                match self {
                    $($name::$variant => $raw),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:?}", self)
            }
        }
    };
}

pub(crate) use control_enum;

mod joystick;
mod keys;
mod mouse;

pub use joystick::{HatIndex, HatPosition, JoystickAxis, JoystickButton, JoystickDirection};
pub use keys::Key;
pub use mouse::{MouseAxis, MouseButton};

/// The seven identity categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlKind {
    Key,
    MouseButton,
    MouseAxis,
    JoystickButton,
    JoystickAxis,
    JoystickHat,
    JoystickDirection,
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlKind::Key => write!(f, "key"),
            ControlKind::MouseButton => write!(f, "mouse button"),
            ControlKind::MouseAxis => write!(f, "mouse axis"),
            ControlKind::JoystickButton => write!(f, "joystick button"),
            ControlKind::JoystickAxis => write!(f, "joystick axis"),
            ControlKind::JoystickHat => write!(f, "joystick hat"),
            ControlKind::JoystickDirection => write!(f, "joystick direction"),
        }
    }
}

/// A single identified control, tagged with its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Control {
    Key(Key),
    MouseButton(MouseButton),
    MouseAxis(MouseAxis),
    JoystickButton(JoystickButton),
    JoystickAxis(JoystickAxis),
    JoystickHat(HatIndex),
    JoystickDirection(JoystickDirection),
}

impl Control {
    /// Resolves a raw device id within one identity category.
    ///
    /// Returns `None` for unmapped ids; this is never an error.
    pub fn from_raw(kind: ControlKind, raw: i32) -> Option<Self> {
        match kind {
            ControlKind::Key => Key::from_raw(raw).map(Control::Key),
            ControlKind::MouseButton => MouseButton::from_raw(raw).map(Control::MouseButton),
            ControlKind::MouseAxis => MouseAxis::from_raw(raw).map(Control::MouseAxis),
            ControlKind::JoystickButton => {
                JoystickButton::from_raw(raw).map(Control::JoystickButton)
            }
            ControlKind::JoystickAxis => JoystickAxis::from_raw(raw).map(Control::JoystickAxis),
            ControlKind::JoystickHat => HatIndex::from_raw(raw).map(Control::JoystickHat),
            ControlKind::JoystickDirection => {
                JoystickDirection::from_raw(raw).map(Control::JoystickDirection)
            }
        }
    }

    pub fn raw_id(self) -> i32 {
        match self {
            Control::Key(key) => key.raw_id(),
            Control::MouseButton(button) => button.raw_id(),
            Control::MouseAxis(axis) => axis.raw_id(),
            Control::JoystickButton(button) => button.raw_id(),
            Control::JoystickAxis(axis) => axis.raw_id(),
            Control::JoystickHat(index) => index.raw_id(),
            Control::JoystickDirection(direction) => direction.raw_id(),
        }
    }

    pub fn kind(self) -> ControlKind {
        match self {
            Control::Key(_) => ControlKind::Key,
            Control::MouseButton(_) => ControlKind::MouseButton,
            Control::MouseAxis(_) => ControlKind::MouseAxis,
            Control::JoystickButton(_) => ControlKind::JoystickButton,
            Control::JoystickAxis(_) => ControlKind::JoystickAxis,
            Control::JoystickHat(_) => ControlKind::JoystickHat,
            Control::JoystickDirection(_) => ControlKind::JoystickDirection,
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Control::Key(key) => write!(f, "Key::{}", key),
            Control::MouseButton(button) => write!(f, "MouseButton::{}", button),
            Control::MouseAxis(axis) => write!(f, "MouseAxis::{}", axis),
            Control::JoystickButton(button) => write!(f, "JoystickButton::{}", button),
            Control::JoystickAxis(axis) => write!(f, "JoystickAxis::{}", axis),
            Control::JoystickHat(index) => write!(f, "JoystickHat[{}]", index.get()),
            Control::JoystickDirection(direction) => write!(f, "JoystickDirection::{}", direction),
        }
    }
}

impl From<Key> for Control {
    fn from(key: Key) -> Self {
        Control::Key(key)
    }
}

impl From<MouseButton> for Control {
    fn from(button: MouseButton) -> Self {
        Control::MouseButton(button)
    }
}

impl From<MouseAxis> for Control {
    fn from(axis: MouseAxis) -> Self {
        Control::MouseAxis(axis)
    }
}

impl From<JoystickButton> for Control {
    fn from(button: JoystickButton) -> Self {
        Control::JoystickButton(button)
    }
}

impl From<JoystickAxis> for Control {
    fn from(axis: JoystickAxis) -> Self {
        Control::JoystickAxis(axis)
    }
}

impl From<HatIndex> for Control {
    fn from(index: HatIndex) -> Self {
        Control::JoystickHat(index)
    }
}

impl From<JoystickDirection> for Control {
    fn from(direction: JoystickDirection) -> Self {
        Control::JoystickDirection(direction)
    }
}
