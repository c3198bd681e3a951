use super::parameters::JoystickParameters;
use super::state::{JoystickEvent, JoystickSample, JoystickState};
use super::SLOT_COUNT;
use crate::error::RouterError;
use crate::profile::Dispatch;
use crate::router::InputRouter;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, warn};

/// What the device layer reports about a newly connected device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoystickDevice {
    pub name: String,
    pub guid: String,
    /// Whether the device has a gamepad mapping.
    pub is_gamepad: bool,
}

impl fmt::Display for JoystickDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.guid)
    }
}

/// Application hook deciding what to bind when devices come and go.
///
/// Called without any router lock held, so implementations may bind, unbind
/// or register from inside the callback.
pub trait JoystickConnectionListener: Send + Sync {
    fn on_joystick_connect(&self, router: &InputRouter, slot: usize, device: &JoystickDevice);

    fn on_joystick_disconnect(&self, router: &InputRouter, slot: usize);
}

/// Samples the raw state of one device slot
pub trait JoystickSource {
    fn sample(&mut self, slot: usize) -> Option<JoystickSample>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotStatus {
    Disconnected,
    Connected(JoystickDevice),
    Bound(JoystickDevice),
}

struct Binding {
    profile: Arc<dyn Dispatch>,
    params: Arc<dyn JoystickParameters>,
    state: JoystickState,
}

#[derive(Default)]
enum Slot {
    #[default]
    Disconnected,
    Connected(JoystickDevice),
    Bound(JoystickDevice, Binding),
}

impl Slot {
    fn status(&self) -> SlotStatus {
        match self {
            Slot::Disconnected => SlotStatus::Disconnected,
            Slot::Connected(device) => SlotStatus::Connected(device.clone()),
            Slot::Bound(device, _) => SlotStatus::Bound(device.clone()),
        }
    }
}

/// Profiles and state of the device slots, plus the connection listeners.
pub(crate) struct JoystickSlots {
    slots: Mutex<Vec<Slot>>,
    listeners: Mutex<Vec<Arc<dyn JoystickConnectionListener>>>,
}

impl Default for JoystickSlots {
    fn default() -> Self {
        Self {
            slots: Mutex::new((0..SLOT_COUNT).map(|_| Slot::Disconnected).collect()),
            listeners: Mutex::new(Vec::new()),
        }
    }
}

fn check(slot: usize) -> Result<usize, RouterError> {
    if slot < SLOT_COUNT {
        Ok(slot)
    } else {
        Err(RouterError::InvalidSlot(slot))
    }
}

impl JoystickSlots {
    pub(crate) fn add_listener(&self, listener: Arc<dyn JoystickConnectionListener>) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    pub(crate) fn remove_listener(&self, listener: &Arc<dyn JoystickConnectionListener>) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|known| !Arc::ptr_eq(known, listener));
        listeners.len() != before
    }

    /// Snapshot of the listeners, to be notified after the lock is released.
    pub(crate) fn listeners(&self) -> Vec<Arc<dyn JoystickConnectionListener>> {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Marks a slot connected, dropping whatever it held before.
    ///
    /// Returns whether the slot was already connected.
    pub(crate) fn connect(&self, slot: usize, device: JoystickDevice) -> Result<bool, RouterError> {
        let slot = check(slot)?;
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = std::mem::replace(&mut slots[slot], Slot::Connected(device.clone()));
        match &previous {
            Slot::Disconnected => {}
            Slot::Connected(old) => {
                warn!("Joystick slot {} reconnected, replacing {}", slot, old);
            }
            Slot::Bound(old, binding) => {
                warn!(
                    "Joystick slot {} reconnected, replacing {} and dropping {}",
                    slot,
                    old,
                    binding.profile.consumer_name()
                );
            }
        }
        info!("Joystick slot {} connected: {}", slot, device);
        Ok(!matches!(previous, Slot::Disconnected))
    }

    /// Returns whether the slot was connected.
    pub(crate) fn disconnect(&self, slot: usize) -> Result<bool, RouterError> {
        let slot = check(slot)?;
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = std::mem::take(&mut slots[slot]);
        if let Slot::Bound(_, binding) = &previous {
            info!(
                "Joystick slot {} disconnected, unbinding {}",
                slot,
                binding.profile.consumer_name()
            );
        }
        Ok(!matches!(previous, Slot::Disconnected))
    }

    pub(crate) fn bind(
        &self,
        slot: usize,
        profile: Arc<dyn Dispatch>,
        params: Arc<dyn JoystickParameters>,
    ) -> Result<(), RouterError> {
        let slot = check(slot)?;
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let device = match std::mem::take(&mut slots[slot]) {
            Slot::Disconnected => return Err(RouterError::NotConnected(slot)),
            Slot::Connected(device) | Slot::Bound(device, _) => device,
        };
        info!(
            "Binding {} to joystick slot {} ({})",
            profile.consumer_name(),
            slot,
            device
        );
        let binding = Binding {
            profile,
            params,
            state: JoystickState::new(),
        };
        slots[slot] = Slot::Bound(device, binding);
        Ok(())
    }

    /// Returns whether a profile was bound.
    pub(crate) fn unbind(&self, slot: usize) -> Result<bool, RouterError> {
        let slot = check(slot)?;
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        match std::mem::take(&mut slots[slot]) {
            Slot::Bound(device, binding) => {
                info!(
                    "Unbinding {} from joystick slot {}",
                    binding.profile.consumer_name(),
                    slot
                );
                slots[slot] = Slot::Connected(device);
                Ok(true)
            }
            other => {
                slots[slot] = other;
                Ok(false)
            }
        }
    }

    pub(crate) fn status(&self, slot: usize) -> Result<SlotStatus, RouterError> {
        let slot = check(slot)?;
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(slots[slot].status())
    }

    pub(crate) fn bound_slots(&self) -> Vec<usize> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| matches!(slot, Slot::Bound(..)))
            .map(|(index, _)| index)
            .collect()
    }

    /// Advances the state of a bound slot.
    ///
    /// Returns the bound profile together with the events it should receive,
    /// or `None` when the slot is connected but unbound.
    pub(crate) fn poll(
        &self,
        slot: usize,
        sample: &JoystickSample,
    ) -> Result<Option<(Arc<dyn Dispatch>, Vec<JoystickEvent>)>, RouterError> {
        let slot = check(slot)?;
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        match &mut slots[slot] {
            Slot::Disconnected => Err(RouterError::NotConnected(slot)),
            Slot::Connected(_) => Ok(None),
            Slot::Bound(_, binding) => {
                let events = binding.state.update(binding.params.as_ref(), sample);
                Ok(Some((Arc::clone(&binding.profile), events)))
            }
        }
    }
}
