//! Dispatch targets: field writes, single-argument methods and catch-alls
//!
//! Every target wraps a strongly typed closure captured at declaration time and
//! records the value shape it accepts, so the builder can reject a binding
//! whose shape does not fit its category before any event is routed.

use super::category::{InputValue, Signature, ValueShape};
use crate::controls::{
    Control, ControlKind, HatIndex, HatPosition, JoystickAxis, JoystickButton, JoystickDirection,
    Key, MouseAxis, MouseButton,
};
use crate::error::HandlerError;

/// Return value of a consumer method.
///
/// Implemented for `()` and for `Result<(), E>`, so handlers can be infallible
/// or report a rejected value.
pub trait HandlerOutput {
    fn into_result(self) -> Result<(), HandlerError>;
}

impl HandlerOutput for () {
    fn into_result(self) -> Result<(), HandlerError> {
        Ok(())
    }
}

impl<E> HandlerOutput for Result<(), E>
where
    E: Into<HandlerError>,
{
    fn into_result(self) -> Result<(), HandlerError> {
        self.map_err(Into::into)
    }
}

/// Why a single target could not take a value
#[derive(Debug)]
pub(crate) enum TargetFailure {
    Mismatch,
    Rejected(HandlerError),
}

type Write<T> = Box<dyn Fn(&mut T, &InputValue) -> Result<(), TargetFailure> + Send + Sync>;
type Route<T> =
    Box<dyn Fn(&mut T, Option<Control>, &InputValue) -> Result<(), TargetFailure> + Send + Sync>;
pub(crate) type ChangeHook<T> = Box<dyn Fn(&mut T) -> Result<(), HandlerError> + Send + Sync>;

fn rejected(output: impl HandlerOutput) -> Result<(), TargetFailure> {
    output.into_result().map_err(TargetFailure::Rejected)
}

/// A field on the consumer that receives the event value by plain assignment.
pub struct Field<T> {
    shape: ValueShape,
    write: Write<T>,
}

impl<T: 'static> Field<T> {
    /// A `bool` field for button and key state.
    pub fn flag(access: fn(&mut T) -> &mut bool) -> Self {
        Self {
            shape: ValueShape::Flag,
            write: Box::new(move |target, value| match value {
                InputValue::Pressed(pressed) => {
                    *access(target) = *pressed;
                    Ok(())
                }
                _ => Err(TargetFailure::Mismatch),
            }),
        }
    }

    /// An `f64` field for axis amounts, positions and scroll deltas.
    pub fn amount(access: fn(&mut T) -> &mut f64) -> Self {
        Self {
            shape: ValueShape::Amount,
            write: Box::new(move |target, value| match value {
                InputValue::Amount(amount) => {
                    *access(target) = *amount;
                    Ok(())
                }
                _ => Err(TargetFailure::Mismatch),
            }),
        }
    }

    pub fn direction(access: fn(&mut T) -> &mut JoystickDirection) -> Self {
        Self {
            shape: ValueShape::Direction,
            write: Box::new(move |target, value| match value {
                InputValue::Direction(direction) => {
                    *access(target) = *direction;
                    Ok(())
                }
                _ => Err(TargetFailure::Mismatch),
            }),
        }
    }

    pub fn hat(access: fn(&mut T) -> &mut HatPosition) -> Self {
        Self {
            shape: ValueShape::Hat,
            write: Box::new(move |target, value| match value {
                InputValue::Hat(position) => {
                    *access(target) = *position;
                    Ok(())
                }
                _ => Err(TargetFailure::Mismatch),
            }),
        }
    }
}

impl<T> Field<T> {
    pub fn shape(&self) -> ValueShape {
        self.shape
    }

    pub(crate) fn write(&self, target: &mut T, value: &InputValue) -> Result<(), TargetFailure> {
        (self.write)(target, value)
    }
}

/// A method on the consumer that takes the event value as its only argument.
pub struct Method<T> {
    shape: ValueShape,
    call: Write<T>,
}

impl<T: 'static> Method<T> {
    pub fn flag<F, R>(method: F) -> Self
    where
        F: Fn(&mut T, bool) -> R + Send + Sync + 'static,
        R: HandlerOutput,
    {
        Self {
            shape: ValueShape::Flag,
            call: Box::new(move |target, value| match value {
                InputValue::Pressed(pressed) => rejected(method(target, *pressed)),
                _ => Err(TargetFailure::Mismatch),
            }),
        }
    }

    pub fn amount<F, R>(method: F) -> Self
    where
        F: Fn(&mut T, f64) -> R + Send + Sync + 'static,
        R: HandlerOutput,
    {
        Self {
            shape: ValueShape::Amount,
            call: Box::new(move |target, value| match value {
                InputValue::Amount(amount) => rejected(method(target, *amount)),
                _ => Err(TargetFailure::Mismatch),
            }),
        }
    }

    pub fn direction<F, R>(method: F) -> Self
    where
        F: Fn(&mut T, JoystickDirection) -> R + Send + Sync + 'static,
        R: HandlerOutput,
    {
        Self {
            shape: ValueShape::Direction,
            call: Box::new(move |target, value| match value {
                InputValue::Direction(direction) => rejected(method(target, *direction)),
                _ => Err(TargetFailure::Mismatch),
            }),
        }
    }

    pub fn hat<F, R>(method: F) -> Self
    where
        F: Fn(&mut T, HatPosition) -> R + Send + Sync + 'static,
        R: HandlerOutput,
    {
        Self {
            shape: ValueShape::Hat,
            call: Box::new(move |target, value| match value {
                InputValue::Hat(position) => rejected(method(target, *position)),
                _ => Err(TargetFailure::Mismatch),
            }),
        }
    }
}

impl<T> Method<T> {
    pub fn shape(&self) -> ValueShape {
        self.shape
    }

    pub(crate) fn call(&self, target: &mut T, value: &InputValue) -> Result<(), TargetFailure> {
        (self.call)(target, value)
    }
}

/// A method receiving every event of one category, with its identity.
pub struct CatchAll<T> {
    signature: Signature,
    call: Route<T>,
}

impl<T: 'static> CatchAll<T> {
    /// For [`Category::Key`](super::Category::Key).
    pub fn keys<F, R>(method: F) -> Self
    where
        F: Fn(&mut T, Key, bool) -> R + Send + Sync + 'static,
        R: HandlerOutput,
    {
        Self::routed(ControlKind::Key, ValueShape::Flag, move |target, control, value| {
            match (control, value) {
                (Control::Key(key), InputValue::Pressed(pressed)) => {
                    rejected(method(target, key, *pressed))
                }
                _ => Err(TargetFailure::Mismatch),
            }
        })
    }

    /// For [`Category::KeyTyped`](super::Category::KeyTyped).
    pub fn typed<F, R>(method: F) -> Self
    where
        F: Fn(&mut T, char) -> R + Send + Sync + 'static,
        R: HandlerOutput,
    {
        Self {
            signature: Signature {
                identity: None,
                shape: ValueShape::Character,
            },
            call: Box::new(move |target, control, value| match (control, value) {
                (None, InputValue::Character(character)) => rejected(method(target, *character)),
                _ => Err(TargetFailure::Mismatch),
            }),
        }
    }

    pub fn mouse_buttons<F, R>(method: F) -> Self
    where
        F: Fn(&mut T, MouseButton, bool) -> R + Send + Sync + 'static,
        R: HandlerOutput,
    {
        Self::routed(ControlKind::MouseButton, ValueShape::Flag, move |target, control, value| {
            match (control, value) {
                (Control::MouseButton(button), InputValue::Pressed(pressed)) => {
                    rejected(method(target, button, *pressed))
                }
                _ => Err(TargetFailure::Mismatch),
            }
        })
    }

    /// For mouse movement, position and scroll categories alike.
    pub fn mouse_axes<F, R>(method: F) -> Self
    where
        F: Fn(&mut T, MouseAxis, f64) -> R + Send + Sync + 'static,
        R: HandlerOutput,
    {
        Self::routed(ControlKind::MouseAxis, ValueShape::Amount, move |target, control, value| {
            match (control, value) {
                (Control::MouseAxis(axis), InputValue::Amount(amount)) => {
                    rejected(method(target, axis, *amount))
                }
                _ => Err(TargetFailure::Mismatch),
            }
        })
    }

    pub fn joystick_buttons<F, R>(method: F) -> Self
    where
        F: Fn(&mut T, JoystickButton, bool) -> R + Send + Sync + 'static,
        R: HandlerOutput,
    {
        Self::routed(
            ControlKind::JoystickButton,
            ValueShape::Flag,
            move |target, control, value| match (control, value) {
                (Control::JoystickButton(button), InputValue::Pressed(pressed)) => {
                    rejected(method(target, button, *pressed))
                }
                _ => Err(TargetFailure::Mismatch),
            },
        )
    }

    pub fn joystick_axes<F, R>(method: F) -> Self
    where
        F: Fn(&mut T, JoystickAxis, f64) -> R + Send + Sync + 'static,
        R: HandlerOutput,
    {
        Self::routed(
            ControlKind::JoystickAxis,
            ValueShape::Amount,
            move |target, control, value| match (control, value) {
                (Control::JoystickAxis(axis), InputValue::Amount(amount)) => {
                    rejected(method(target, axis, *amount))
                }
                _ => Err(TargetFailure::Mismatch),
            },
        )
    }

    pub fn joystick_directions<F, R>(method: F) -> Self
    where
        F: Fn(&mut T, JoystickAxis, JoystickDirection) -> R + Send + Sync + 'static,
        R: HandlerOutput,
    {
        Self::routed(
            ControlKind::JoystickAxis,
            ValueShape::Direction,
            move |target, control, value| match (control, value) {
                (Control::JoystickAxis(axis), InputValue::Direction(direction)) => {
                    rejected(method(target, axis, *direction))
                }
                _ => Err(TargetFailure::Mismatch),
            },
        )
    }

    pub fn joystick_hats<F, R>(method: F) -> Self
    where
        F: Fn(&mut T, HatIndex, HatPosition) -> R + Send + Sync + 'static,
        R: HandlerOutput,
    {
        Self::routed(
            ControlKind::JoystickHat,
            ValueShape::Hat,
            move |target, control, value| match (control, value) {
                (Control::JoystickHat(index), InputValue::Hat(position)) => {
                    rejected(method(target, index, *position))
                }
                _ => Err(TargetFailure::Mismatch),
            },
        )
    }

    // Catch-all keyed by a control identity; an event without one is a mismatch.
    fn routed<F>(identity: ControlKind, shape: ValueShape, route: F) -> Self
    where
        F: Fn(&mut T, Control, &InputValue) -> Result<(), TargetFailure> + Send + Sync + 'static,
    {
        Self {
            signature: Signature {
                identity: Some(identity),
                shape,
            },
            call: Box::new(move |target, control, value| match control {
                Some(control) => route(target, control, value),
                None => Err(TargetFailure::Mismatch),
            }),
        }
    }
}

impl<T> CatchAll<T> {
    pub fn signature(&self) -> Signature {
        self.signature
    }

    pub(crate) fn call(
        &self,
        target: &mut T,
        control: Option<Control>,
        value: &InputValue,
    ) -> Result<(), TargetFailure> {
        (self.call)(target, control, value)
    }
}
