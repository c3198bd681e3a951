//! Event categories and the value shapes they carry

use crate::controls::{Control, ControlKind, HatPosition, JoystickDirection};
use std::fmt;

/// A routable input event category.
///
/// Window categories are fanned out to every registered consumer; joystick
/// categories only reach the consumer bound to the device slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Key,
    KeyTyped,
    MouseButton,
    MouseAxis,
    MousePosition,
    MouseScroll,
    JoystickButton,
    JoystickAxis,
    JoystickDirection,
    JoystickHat,
}

impl Category {
    pub const COUNT: usize = 10;

    pub const ALL: [Category; Category::COUNT] = [
        Category::Key,
        Category::KeyTyped,
        Category::MouseButton,
        Category::MouseAxis,
        Category::MousePosition,
        Category::MouseScroll,
        Category::JoystickButton,
        Category::JoystickAxis,
        Category::JoystickDirection,
        Category::JoystickHat,
    ];

    /// Position in [`Category::ALL`], used to index per-category tables.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The identity kind events of this category are keyed by.
    ///
    /// `None` for typed characters, which only reach catch-all targets.
    pub fn identity_kind(self) -> Option<ControlKind> {
        match self {
            Category::Key => Some(ControlKind::Key),
            Category::KeyTyped => None,
            Category::MouseButton => Some(ControlKind::MouseButton),
            Category::MouseAxis | Category::MousePosition | Category::MouseScroll => {
                Some(ControlKind::MouseAxis)
            }
            Category::JoystickButton => Some(ControlKind::JoystickButton),
            Category::JoystickAxis | Category::JoystickDirection => Some(ControlKind::JoystickAxis),
            Category::JoystickHat => Some(ControlKind::JoystickHat),
        }
    }

    pub fn value_shape(self) -> ValueShape {
        match self {
            Category::Key | Category::MouseButton | Category::JoystickButton => ValueShape::Flag,
            Category::KeyTyped => ValueShape::Character,
            Category::MouseAxis
            | Category::MousePosition
            | Category::MouseScroll
            | Category::JoystickAxis => ValueShape::Amount,
            Category::JoystickDirection => ValueShape::Direction,
            Category::JoystickHat => ValueShape::Hat,
        }
    }

    /// The (identity, value) signature a catch-all for this category must accept.
    pub fn signature(self) -> Signature {
        Signature {
            identity: self.identity_kind(),
            shape: self.value_shape(),
        }
    }

    pub fn is_joystick(self) -> bool {
        matches!(
            self,
            Category::JoystickButton
                | Category::JoystickAxis
                | Category::JoystickDirection
                | Category::JoystickHat
        )
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Key => write!(f, "key"),
            Category::KeyTyped => write!(f, "key typed"),
            Category::MouseButton => write!(f, "mouse button"),
            Category::MouseAxis => write!(f, "mouse axis"),
            Category::MousePosition => write!(f, "mouse position"),
            Category::MouseScroll => write!(f, "mouse scroll"),
            Category::JoystickButton => write!(f, "joystick button"),
            Category::JoystickAxis => write!(f, "joystick axis"),
            Category::JoystickDirection => write!(f, "joystick direction"),
            Category::JoystickHat => write!(f, "joystick hat"),
        }
    }
}

/// The shape of the value an event delivers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueShape {
    Flag,
    Amount,
    Character,
    Direction,
    Hat,
}

impl fmt::Display for ValueShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueShape::Flag => write!(f, "bool"),
            ValueShape::Amount => write!(f, "f64"),
            ValueShape::Character => write!(f, "char"),
            ValueShape::Direction => write!(f, "JoystickDirection"),
            ValueShape::Hat => write!(f, "HatPosition"),
        }
    }
}

/// A value carried by one dispatched event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputValue {
    Pressed(bool),
    Amount(f64),
    Character(char),
    Direction(JoystickDirection),
    Hat(HatPosition),
}

impl InputValue {
    pub fn shape(&self) -> ValueShape {
        match self {
            InputValue::Pressed(_) => ValueShape::Flag,
            InputValue::Amount(_) => ValueShape::Amount,
            InputValue::Character(_) => ValueShape::Character,
            InputValue::Direction(_) => ValueShape::Direction,
            InputValue::Hat(_) => ValueShape::Hat,
        }
    }
}

/// An (identity, value) pair as accepted by a target or sent by an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    pub identity: Option<ControlKind>,
    pub shape: ValueShape,
}

impl Signature {
    pub(crate) fn of(control: Option<Control>, value: &InputValue) -> Self {
        Self {
            identity: control.map(Control::kind),
            shape: value.shape(),
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.identity {
            Some(kind) => write!(f, "({}, {})", kind, self.shape),
            None => write!(f, "({})", self.shape),
        }
    }
}

/// The kind of target a member was declared as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Field,
    Method,
    CatchAll,
    ChangeHook,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Field => write!(f, "field"),
            TargetKind::Method => write!(f, "method"),
            TargetKind::CatchAll => write!(f, "catch-all"),
            TargetKind::ChangeHook => write!(f, "change hook"),
        }
    }
}
