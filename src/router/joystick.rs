use super::{InputRouter, Outcome};
use crate::error::{DispatchFailure, RouterError};
use crate::joystick::{
    JoystickConnectionListener, JoystickDevice, JoystickParameters, JoystickSample,
    JoystickSettings, JoystickSource, SlotStatus,
};
use crate::profile::{Dispatch, InputConsumer, ProfileBuilder};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

impl InputRouter {
    pub fn add_joystick_listener(&self, listener: Arc<dyn JoystickConnectionListener>) {
        self.joysticks.add_listener(listener);
    }

    /// Returns whether the listener was known.
    pub fn remove_joystick_listener(&self, listener: &Arc<dyn JoystickConnectionListener>) -> bool {
        self.joysticks.remove_listener(listener)
    }

    /// Called by the device layer when a device appears at `slot`.
    ///
    /// The slot starts out unbound; listeners decide what to bind. A slot
    /// that was still connected is announced as disconnected first.
    pub fn connect_joystick(&self, slot: usize, device: JoystickDevice) -> Result<(), RouterError> {
        let replaced = self.joysticks.connect(slot, device.clone())?;
        let listeners = self.joysticks.listeners();
        if replaced {
            for listener in &listeners {
                listener.on_joystick_disconnect(self, slot);
            }
        }
        for listener in &listeners {
            listener.on_joystick_connect(self, slot, &device);
        }
        Ok(())
    }

    /// Called by the device layer when the device at `slot` goes away.
    ///
    /// Drops the binding and all previous values of the slot.
    pub fn disconnect_joystick(&self, slot: usize) -> Result<(), RouterError> {
        if !self.joysticks.disconnect(slot)? {
            debug!("Joystick slot {} was not connected", slot);
            return Ok(());
        }
        info!("Joystick slot {} disconnected", slot);
        for listener in self.joysticks.listeners() {
            listener.on_joystick_disconnect(self, slot);
        }
        Ok(())
    }

    /// Binds a consumer to a connected slot with the default parameters.
    pub fn bind_joystick<T: InputConsumer>(
        &self,
        slot: usize,
        consumer: &Arc<Mutex<T>>,
    ) -> Result<(), RouterError> {
        self.bind_joystick_with(slot, Arc::new(JoystickSettings::default()), consumer, T::bindings)
    }

    pub fn bind_joystick_with_parameters<T: InputConsumer>(
        &self,
        slot: usize,
        params: Arc<dyn JoystickParameters>,
        consumer: &Arc<Mutex<T>>,
    ) -> Result<(), RouterError> {
        self.bind_joystick_with(slot, params, consumer, T::bindings)
    }

    /// Binds a consumer with explicit bindings, replacing any previous one.
    ///
    /// The slot's history starts over, so the next poll only initializes.
    pub fn bind_joystick_with<T, F>(
        &self,
        slot: usize,
        params: Arc<dyn JoystickParameters>,
        consumer: &Arc<Mutex<T>>,
        bindings: F,
    ) -> Result<(), RouterError>
    where
        T: Send + 'static,
        F: FnOnce(&mut ProfileBuilder<T>),
    {
        let mut builder = ProfileBuilder::new();
        bindings(&mut builder);
        let profile: Arc<dyn Dispatch> = Arc::new(builder.build(Arc::clone(consumer))?);
        self.joysticks.bind(slot, profile, params)
    }

    /// Returns whether a consumer was bound.
    pub fn unbind_joystick(&self, slot: usize) -> Result<bool, RouterError> {
        self.joysticks.unbind(slot)
    }

    pub fn joystick_status(&self, slot: usize) -> Result<SlotStatus, RouterError> {
        self.joysticks.status(slot)
    }

    /// Feeds one sample of `slot` through its state and dispatches the changes
    /// to the bound consumer.
    ///
    /// A connected but unbound slot is ignored.
    pub fn poll_joystick(&self, slot: usize, sample: &JoystickSample) -> Result<bool, RouterError> {
        let Some((profile, events)) = self.joysticks.poll(slot, sample)? else {
            return Ok(false);
        };
        let mut outcome = Outcome::default();
        // the slot lock is released, handlers may rebind
        for event in events {
            let delivery = profile.deliver(event.category(), Some(event.control()), event.value());
            self.stats.record(delivery.handled, delivery.errors.len());
            if !delivery.errors.is_empty() {
                warn!(
                    "{} target(s) of {} failed on joystick slot {}",
                    delivery.errors.len(),
                    profile.consumer_name(),
                    slot
                );
            }
            outcome.add(DispatchFailure::check(delivery.handled, delivery.errors));
        }
        Ok(outcome.finish()?)
    }

    /// Samples and polls every bound slot.
    ///
    /// Slots the source cannot sample are skipped. Failures of all slots are
    /// merged into one.
    pub fn poll_joysticks(
        &self,
        source: &mut impl JoystickSource,
    ) -> Result<bool, DispatchFailure> {
        let mut outcome = Outcome::default();
        for slot in self.joysticks.bound_slots() {
            let Some(sample) = source.sample(slot) else {
                debug!("No sample for joystick slot {}", slot);
                continue;
            };
            match self.poll_joystick(slot, &sample) {
                Ok(handled) => outcome.add(Ok(handled)),
                Err(RouterError::Dispatch(failure)) => outcome.add(Err(failure)),
                // disconnected between listing and polling
                Err(other) => debug!("Skipping joystick slot {}: {}", slot, other),
            }
        }
        outcome.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::{JoystickAxis, JoystickButton};
    use crate::profile::{Category, Field, Method};

    #[derive(Default)]
    struct Pad {
        a: bool,
        presses: u32,
    }

    impl InputConsumer for Pad {
        fn bindings(b: &mut ProfileBuilder<Self>) {
            b.field(
                "a",
                Category::JoystickButton,
                JoystickButton::A,
                Field::flag(|p: &mut Pad| &mut p.a),
            )
            .method(
                "on_a",
                Category::JoystickButton,
                JoystickButton::A,
                Method::flag(|p: &mut Pad, pressed| {
                    if pressed {
                        p.presses += 1;
                    }
                }),
            );
        }
    }

    fn device() -> JoystickDevice {
        JoystickDevice {
            name: "Test Pad".to_string(),
            guid: "00ff".to_string(),
            is_gamepad: true,
        }
    }

    fn buttons(a: u8) -> JoystickSample {
        JoystickSample {
            axes: vec![0.0; 6],
            buttons: vec![a, 0],
            hats: vec![0],
        }
    }

    #[test]
    fn binding_requires_a_valid_connected_slot() {
        let router = InputRouter::new();
        let pad = Arc::new(Mutex::new(Pad::default()));

        assert!(matches!(router.bind_joystick(16, &pad), Err(RouterError::InvalidSlot(16))));
        assert!(matches!(router.bind_joystick(0, &pad), Err(RouterError::NotConnected(0))));
        assert!(matches!(
            router.poll_joystick(0, &buttons(0)),
            Err(RouterError::NotConnected(0))
        ));

        router.connect_joystick(0, device()).unwrap();
        assert_eq!(router.joystick_status(0).unwrap(), SlotStatus::Connected(device()));
        router.bind_joystick(0, &pad).unwrap();
        assert_eq!(router.joystick_status(0).unwrap(), SlotStatus::Bound(device()));
    }

    #[test]
    fn only_the_bound_consumer_sees_joystick_events() {
        let router = InputRouter::new();
        let bound = Arc::new(Mutex::new(Pad::default()));
        let registered = Arc::new(Mutex::new(Pad::default()));
        router.register(&registered).unwrap();

        router.connect_joystick(1, device()).unwrap();
        router.bind_joystick(1, &bound).unwrap();
        assert!(!router.poll_joystick(1, &buttons(0)).unwrap());
        assert!(router.poll_joystick(1, &buttons(1)).unwrap());

        assert!(bound.lock().unwrap().a);
        assert_eq!(bound.lock().unwrap().presses, 1);
        assert!(!registered.lock().unwrap().a);
    }

    #[test]
    fn unbound_slots_are_ignored() {
        let router = InputRouter::new();
        let pad = Arc::new(Mutex::new(Pad::default()));
        router.connect_joystick(2, device()).unwrap();
        router.bind_joystick(2, &pad).unwrap();
        assert!(router.unbind_joystick(2).unwrap());
        assert!(!router.unbind_joystick(2).unwrap());
        assert!(!router.poll_joystick(2, &buttons(1)).unwrap());
        assert!(!pad.lock().unwrap().a);
    }

    #[test]
    fn custom_parameters_apply_per_binding() {
        #[derive(Default)]
        struct Trigger {
            pulled: f64,
        }
        let router = InputRouter::new();
        let trigger = Arc::new(Mutex::new(Trigger::default()));
        let params = JoystickSettings::default().with_deadzone(JoystickAxis::LeftTrigger, 0.5);

        router.connect_joystick(3, device()).unwrap();
        router
            .bind_joystick_with(3, Arc::new(params), &trigger, |b| {
                b.field(
                    "pulled",
                    Category::JoystickAxis,
                    JoystickAxis::LeftTrigger,
                    Field::amount(|t: &mut Trigger| &mut t.pulled),
                );
            })
            .unwrap();

        let trigger_at = |value: f32| JoystickSample {
            axes: vec![0.0, 0.0, 0.0, 0.0, value, 0.0],
            ..JoystickSample::default()
        };
        router.poll_joystick(3, &trigger_at(0.0)).unwrap();
        assert!(!router.poll_joystick(3, &trigger_at(0.4)).unwrap());
        assert!(router.poll_joystick(3, &trigger_at(0.75)).unwrap());
        assert_eq!(trigger.lock().unwrap().pulled, 0.75);
    }
}
