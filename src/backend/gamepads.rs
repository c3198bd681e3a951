//! gilrs backend with statum state machine for the device lifecycle
//!
//! ```text
//! Initializing ──(announce present gamepads)──► Polling
//! ```
//!
//! gilrs ids are handed out by the platform and may exceed the router's slot
//! range, so every connected gamepad is assigned the lowest free slot instead.

use crate::error::DispatchFailure;
use crate::joystick::{JoystickDevice, JoystickSample, JoystickSource, BUTTON_PRESSED, SLOT_COUNT};
use crate::router::InputRouter;
use gilrs::{Axis, Button, Event, EventType, Gamepad, GamepadId, Gilrs, MappingSource};
use statum::{machine, state};
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

// Axes in gamepad layout order
const AXES: [Axis; 6] = [
    Axis::LeftStickX,
    Axis::LeftStickY,
    Axis::RightStickX,
    Axis::RightStickY,
    Axis::LeftZ,
    Axis::RightZ,
];

// Buttons in gamepad layout order
const BUTTONS: [Button; 15] = [
    Button::South,
    Button::East,
    Button::West,
    Button::North,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::Select,
    Button::Start,
    Button::Mode,
    Button::LeftThumb,
    Button::RightThumb,
    Button::DPadUp,
    Button::DPadRight,
    Button::DPadDown,
    Button::DPadLeft,
];

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Failed to initialize gilrs: {0}")]
    Initialization(String),
}

#[state]
#[derive(Debug, Clone)]
pub enum BackendState {
    Initializing, // gilrs context created, nothing announced yet
    Polling,      // announcing connections and sampling every frame
}

#[machine]
#[derive(Debug)]
pub struct GilrsBackend<S: BackendState> {
    gilrs: Gilrs,

    // Router slot of every connected gamepad
    slots: HashMap<GamepadId, usize>,
}

impl<S: BackendState> GilrsBackend<S> {
    pub fn connected(&self) -> usize {
        self.slots.len()
    }

    fn attach(&mut self, router: &InputRouter, id: GamepadId) {
        if self.slots.contains_key(&id) {
            debug!("Gamepad {} already has a slot", id);
            return;
        }
        let Some(slot) = (0..SLOT_COUNT).find(|slot| !self.slots.values().any(|used| used == slot))
        else {
            warn!("No free joystick slot for gamepad {}, ignoring it", id);
            return;
        };
        let device = describe(&self.gilrs.gamepad(id));
        match router.connect_joystick(slot, device) {
            Ok(()) => {
                self.slots.insert(id, slot);
            }
            Err(e) => error!("Failed to connect gamepad {}: {}", id, e),
        }
    }

    fn detach(&mut self, router: &InputRouter, id: GamepadId) {
        let Some(slot) = self.slots.remove(&id) else {
            debug!("Disconnect of unknown gamepad {}", id);
            return;
        };
        if let Err(e) = router.disconnect_joystick(slot) {
            error!("Failed to disconnect gamepad {}: {}", id, e);
        }
    }
}

impl GilrsBackend<Initializing> {
    pub fn create() -> Result<Self, BackendError> {
        info!("Initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => g,
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(BackendError::Initialization(e.to_string()));
            }
        };
        Ok(Self::new(gilrs, HashMap::new()))
    }

    /// Announces the gamepads present at start-up and starts polling.
    pub fn initialize(mut self, router: &InputRouter) -> GilrsBackend<Polling> {
        let present: Vec<GamepadId> = self.gilrs.gamepads().map(|(id, _)| id).collect();
        if present.is_empty() {
            info!("No gamepad connected, waiting for one");
        }
        for id in present {
            self.attach(router, id);
        }
        info!(
            "Gamepad backend initialized with {} gamepad(s), transitioning to Polling state",
            self.slots.len()
        );
        self.transition()
    }
}

impl GilrsBackend<Polling> {
    /// Drains pending gilrs events, then polls every bound slot.
    ///
    /// Connection changes are applied before sampling so a gamepad that just
    /// disappeared is never sampled.
    pub fn poll(&mut self, router: &InputRouter) -> Result<bool, DispatchFailure> {
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            match event {
                EventType::Connected => self.attach(router, id),
                EventType::Disconnected => self.detach(router, id),
                // state is sampled below
                _ => {}
            }
        }
        router.poll_joysticks(self)
    }
}

impl JoystickSource for GilrsBackend<Polling> {
    fn sample(&mut self, slot: usize) -> Option<JoystickSample> {
        let id = self
            .slots
            .iter()
            .find(|(_, used)| **used == slot)
            .map(|(id, _)| *id)?;
        let gamepad = self.gilrs.connected_gamepad(id)?;
        Some(sample(&gamepad))
    }
}

fn describe(gamepad: &Gamepad<'_>) -> JoystickDevice {
    JoystickDevice {
        name: gamepad.name().to_string(),
        guid: gamepad.uuid().iter().map(|b| format!("{:02x}", b)).collect(),
        is_gamepad: gamepad.mapping_source() != MappingSource::None,
    }
}

fn sample(gamepad: &Gamepad<'_>) -> JoystickSample {
    let axes = AXES
        .iter()
        .map(|&axis| match axis {
            // gilrs reports up as positive, the gamepad layout as negative
            Axis::LeftStickY | Axis::RightStickY => -gamepad.value(axis),
            _ => gamepad.value(axis),
        })
        .collect();
    let buttons = BUTTONS
        .iter()
        .map(|&button| u8::from(gamepad.is_pressed(button)) * BUTTON_PRESSED)
        .collect();
    let hat = hat_code(
        gamepad.is_pressed(Button::DPadUp),
        gamepad.is_pressed(Button::DPadRight),
        gamepad.is_pressed(Button::DPadDown),
        gamepad.is_pressed(Button::DPadLeft),
    );
    JoystickSample {
        axes,
        buttons,
        hats: vec![hat],
    }
}

/// Folds four d-pad buttons into a hat bit code.
pub fn hat_code(up: bool, right: bool, down: bool, left: bool) -> u8 {
    u8::from(up) | u8::from(right) << 1 | u8::from(down) << 2 | u8::from(left) << 3
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::{HatPosition, JoystickAxis, JoystickButton};

    #[test]
    fn hat_codes_match_positions() {
        let code = |up, right, down, left| {
            HatPosition::from_raw(i32::from(hat_code(up, right, down, left)))
        };
        assert_eq!(code(false, false, false, false), Some(HatPosition::Centered));
        assert_eq!(code(true, false, false, false), Some(HatPosition::Up));
        assert_eq!(code(true, true, false, false), Some(HatPosition::RightUp));
        assert_eq!(code(false, false, true, true), Some(HatPosition::LeftDown));
        // opposing directions have no position
        assert_eq!(code(true, false, true, false), None);
    }

    #[test]
    fn layout_tables_follow_raw_ids() {
        assert_eq!(AXES.len(), JoystickAxis::ALL.len());
        assert_eq!(BUTTONS.len(), JoystickButton::ALL.len());
        assert_eq!(BUTTONS[JoystickButton::Guide.raw_id() as usize], Button::Mode);
        assert_eq!(AXES[JoystickAxis::RightTrigger.raw_id() as usize], Axis::RightZ);
    }
}
