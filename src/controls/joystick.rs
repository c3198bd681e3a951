//! Joystick and gamepad identities
//!
//! Buttons and axes use the standard gamepad layout, so the same raw index
//! means the same physical control on every mapped controller.

use super::control_enum;
use serde::{Deserialize, Serialize};

control_enum! {
    /// A joystick button in gamepad layout.
    pub enum JoystickButton {
        A = 0,
        B = 1,
        X = 2,
        Y = 3,
        LeftBumper = 4,
        RightBumper = 5,
        Back = 6,
        Start = 7,
        Guide = 8,
        LeftThumb = 9,
        RightThumb = 10,
        DPadUp = 11,
        DPadRight = 12,
        DPadDown = 13,
        DPadLeft = 14,
    }
}

control_enum! {
    /// A joystick axis in gamepad layout.
    pub enum JoystickAxis {
        LeftX = 0,
        LeftY = 1,
        RightX = 2,
        RightY = 3,
        LeftTrigger = 4,
        RightTrigger = 5,
    }
}

control_enum! {
    /// Position of a hat switch. The raw id is the GLFW bit code.
    #[derive(Default)]
    pub enum HatPosition {
        #[default]
        Centered = 0,
        Up = 1,
        Right = 2,
        RightUp = 3,
        Down = 4,
        RightDown = 6,
        Left = 8,
        LeftUp = 9,
        LeftDown = 12,
    }
}

control_enum! {
    /// Discrete direction of an axis, derived from the sign of its raw value.
    #[derive(Default)]
    pub enum JoystickDirection {
        Negative = -1,
        #[default]
        Neutral = 0,
        Positive = 1,
    }
}

impl JoystickDirection {
    /// Direction of a signed raw axis sample. Zero (and NaN) is neutral.
    pub fn from_value(value: f64) -> Self {
        if value < 0.0 {
            JoystickDirection::Negative
        } else if value > 0.0 {
            JoystickDirection::Positive
        } else {
            JoystickDirection::Neutral
        }
    }
}

impl HatPosition {
    pub fn is_up(self) -> bool {
        self.raw_id() & 0x01 != 0
    }

    pub fn is_right(self) -> bool {
        self.raw_id() & 0x02 != 0
    }

    pub fn is_down(self) -> bool {
        self.raw_id() & 0x04 != 0
    }

    pub fn is_left(self) -> bool {
        self.raw_id() & 0x08 != 0
    }
}

/// Index of a hat switch on one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HatIndex(u8);

impl HatIndex {
    /// Number of hat indices the router tracks per device.
    pub const COUNT: usize = 16;

    pub fn new(index: usize) -> Option<Self> {
        if index < Self::COUNT {
            // COUNT fits in u8
            Some(HatIndex(index as u8))
        } else {
            None
        }
    }

    pub fn from_raw(raw: i32) -> Option<Self> {
        usize::try_from(raw).ok().and_then(Self::new)
    }

    pub fn raw_id(self) -> i32 {
        i32::from(self.0)
    }

    pub fn get(self) -> usize {
        usize::from(self.0)
    }
}
