//! Raw window callbacks and their translation into dispatched events

use super::{InputRouter, Outcome};
use crate::controls::{Key, MouseAxis, MouseButton};
use crate::error::DispatchFailure;
use std::sync::PoisonError;
use tracing::{debug, trace};

/// A raw callback from the windowing layer, with GLFW numbering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowEvent {
    KeyPress { key: i32, scancode: i32, mods: i32 },
    KeyRelease { key: i32, scancode: i32, mods: i32 },
    KeyRepeat { key: i32, scancode: i32, mods: i32 },
    KeyTyped(char),
    MousePosition { x: f64, y: f64 },
    MouseButtonPress { button: i32, mods: i32 },
    MouseButtonRelease { button: i32, mods: i32 },
    Scroll { x: f64, y: f64 },
    Focus,
    Blur,
    Iconify,
    Restore,
    MouseEntered,
    MouseExited,
}

/// Last pointer position, used to derive movement deltas.
///
/// Unknown after focus loss, iconify or the pointer leaving the window, so
/// the first position afterwards only re-establishes it.
#[derive(Debug, Default)]
pub(crate) struct MouseTracker {
    last: Option<(f64, f64)>,
}

impl MouseTracker {
    /// Records a position and returns the movement since the last known one.
    fn moved_to(&mut self, x: f64, y: f64) -> Option<(f64, f64)> {
        let delta = self.last.map(|(last_x, last_y)| (x - last_x, y - last_y));
        self.last = Some((x, y));
        delta
    }

    fn forget(&mut self) {
        self.last = None;
    }
}

impl InputRouter {
    /// Translates one window callback and dispatches the resulting events.
    ///
    /// Raw ids without an identity are dropped. Key repeats are not routed.
    pub fn handle_window_event(&self, event: WindowEvent) -> Result<bool, DispatchFailure> {
        let mut outcome = Outcome::default();
        match event {
            WindowEvent::KeyPress { key, .. } => self.raw_key(key, true, &mut outcome),
            WindowEvent::KeyRelease { key, .. } => self.raw_key(key, false, &mut outcome),
            WindowEvent::KeyRepeat { key, .. } => trace!("Ignoring repeat of key {}", key),
            WindowEvent::KeyTyped(character) => outcome.add(self.fire_key_typed(character)),
            WindowEvent::MousePosition { x, y } => {
                let delta = self
                    .mouse
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .moved_to(x, y);
                if let Some((dx, dy)) = delta {
                    outcome.add(self.fire_mouse_axis(MouseAxis::X, dx));
                    outcome.add(self.fire_mouse_axis(MouseAxis::Y, dy));
                }
                outcome.add(self.fire_mouse_position(MouseAxis::X, x));
                outcome.add(self.fire_mouse_position(MouseAxis::Y, y));
            }
            WindowEvent::MouseButtonPress { button, .. } => {
                self.raw_mouse_button(button, true, &mut outcome)
            }
            WindowEvent::MouseButtonRelease { button, .. } => {
                self.raw_mouse_button(button, false, &mut outcome)
            }
            WindowEvent::Scroll { x, y } => {
                outcome.add(self.fire_mouse_scroll(MouseAxis::X, x));
                outcome.add(self.fire_mouse_scroll(MouseAxis::Y, y));
            }
            WindowEvent::Blur | WindowEvent::Iconify | WindowEvent::MouseExited => {
                debug!("{:?}: forgetting pointer position", event);
                self.mouse
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .forget();
            }
            WindowEvent::Focus | WindowEvent::Restore | WindowEvent::MouseEntered => {}
        }
        outcome.finish()
    }

    fn raw_key(&self, raw: i32, pressed: bool, outcome: &mut Outcome) {
        match Key::from_raw(raw) {
            Some(key) => outcome.add(self.fire_key(key, pressed)),
            None => debug!("Dropping unmapped key {}", raw),
        }
    }

    fn raw_mouse_button(&self, raw: i32, pressed: bool, outcome: &mut Outcome) {
        match MouseButton::from_raw(raw) {
            Some(button) => outcome.add(self.fire_mouse_button(button, pressed)),
            None => debug!("Dropping unmapped mouse button {}", raw),
        }
    }
}
