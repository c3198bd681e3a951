//! The input router
//!
//! Holds the registered profiles and the per-category dispatch lists, and is
//! the one entry point the device layer calls into.
//!
//! # Concurrency
//!
//! Dispatch lists are copy-on-write. A fire takes a snapshot of the current
//! lists and iterates it without holding any lock, so a handler may register
//! or unregister consumers while it runs; the change is visible from the next
//! fire on. Registration and unregistration serialize on the profile map.
//!
//! ```text
//! register ──► [profiles: Mutex] ──► rebuild ──► [tables: RwLock<Arc<_>>]
//!                                                      │ snapshot
//! fire ───────────────────────────────────────────────►┴──► Profile::deliver
//! ```

mod joystick;
mod window;

pub use window::WindowEvent;

use crate::controls::{Control, Key, MouseAxis, MouseButton};
use crate::error::{DispatchFailure, SetupError};
use crate::joystick::JoystickSlots;
use crate::profile::{Category, ConsumerId, Dispatch, InputConsumer, InputValue, ProfileBuilder};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, info, warn};
use window::MouseTracker;

type DispatchList = Vec<Arc<dyn Dispatch>>;

/// One insertion-ordered dispatch list per category.
#[derive(Clone)]
struct DispatchTables {
    lists: [DispatchList; Category::COUNT],
}

impl Default for DispatchTables {
    fn default() -> Self {
        Self {
            lists: std::array::from_fn(|_| Vec::new()),
        }
    }
}

/// Counters since the router was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterStats {
    pub events: u64,
    pub handled: u64,
    pub errors: u64,
}

#[derive(Default)]
struct StatsCounters {
    events: AtomicU64,
    handled: AtomicU64,
    errors: AtomicU64,
}

impl StatsCounters {
    fn record(&self, handled: bool, errors: usize) {
        self.events.fetch_add(1, Ordering::Relaxed);
        if handled {
            self.handled.fetch_add(1, Ordering::Relaxed);
        }
        self.errors.fetch_add(errors as u64, Ordering::Relaxed);
    }
}

/// Routes window and joystick input to registered consumers.
#[derive(Default)]
pub struct InputRouter {
    profiles: Mutex<HashMap<ConsumerId, Arc<dyn Dispatch>>>,
    tables: RwLock<Arc<DispatchTables>>,
    mouse: Mutex<MouseTracker>,
    joysticks: JoystickSlots,
    stats: StatsCounters,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a consumer using the bindings its type declares.
    ///
    /// Returns `Ok(false)` if this instance is already registered.
    pub fn register<T: InputConsumer>(&self, consumer: &Arc<Mutex<T>>) -> Result<bool, SetupError> {
        self.register_with(consumer, T::bindings)
    }

    /// Registers a consumer with bindings declared by `bindings`.
    pub fn register_with<T, F>(
        &self,
        consumer: &Arc<Mutex<T>>,
        bindings: F,
    ) -> Result<bool, SetupError>
    where
        T: Send + 'static,
        F: FnOnce(&mut ProfileBuilder<T>),
    {
        let id = ConsumerId::of(consumer);
        let mut profiles = self.profiles.lock().unwrap_or_else(PoisonError::into_inner);
        if profiles.contains_key(&id) {
            debug!("{} is already registered", std::any::type_name::<T>());
            return Ok(false);
        }

        let mut builder = ProfileBuilder::new();
        bindings(&mut builder);
        let profile: Arc<dyn Dispatch> = Arc::new(builder.build(Arc::clone(consumer))?);

        let mut tables = DispatchTables::clone(&self.snapshot());
        for category in Category::ALL {
            if !category.is_joystick() && profile.handles(category) {
                tables.lists[category.index()].push(Arc::clone(&profile));
            }
        }
        info!("Registered {}", profile.consumer_name());
        profiles.insert(id, profile);
        self.publish(tables);
        Ok(true)
    }

    /// Removes a consumer from every dispatch list.
    ///
    /// Returns `false` if it was not registered. Joystick bindings are not
    /// affected; use [`InputRouter::unbind_joystick`] for those.
    pub fn unregister<T>(&self, consumer: &Arc<Mutex<T>>) -> bool {
        let id = ConsumerId::of(consumer);
        let mut profiles = self.profiles.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(profile) = profiles.remove(&id) else {
            debug!("{} is not registered", std::any::type_name::<T>());
            return false;
        };

        let mut tables = DispatchTables::clone(&self.snapshot());
        for list in tables.lists.iter_mut() {
            list.retain(|entry| entry.consumer_id() != id);
        }
        info!("Unregistered {}", profile.consumer_name());
        self.publish(tables);
        true
    }

    pub fn is_registered<T>(&self, consumer: &Arc<Mutex<T>>) -> bool {
        self.profiles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&ConsumerId::of(consumer))
    }

    /// Number of registered consumers.
    pub fn registered(&self) -> usize {
        self.profiles.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn stats(&self) -> RouterStats {
        RouterStats {
            events: self.stats.events.load(Ordering::Relaxed),
            handled: self.stats.handled.load(Ordering::Relaxed),
            errors: self.stats.errors.load(Ordering::Relaxed),
        }
    }

    /// Delivers one window event to every profile listening to `category`,
    /// in registration order.
    ///
    /// Every profile is attempted even if an earlier one fails. Returns
    /// whether any profile handled the event, or the collected failures.
    /// Joystick categories never reach the global lists; use the slot API.
    pub fn fire(
        &self,
        category: Category,
        control: Option<Control>,
        value: InputValue,
    ) -> Result<bool, DispatchFailure> {
        let tables = self.snapshot();
        let mut handled = false;
        let mut errors = Vec::new();
        for profile in &tables.lists[category.index()] {
            let delivery = profile.deliver(category, control, value);
            handled |= delivery.handled;
            if !delivery.errors.is_empty() {
                warn!(
                    "{} target(s) of {} failed on {} input",
                    delivery.errors.len(),
                    profile.consumer_name(),
                    category
                );
                errors.extend(delivery.errors);
            }
        }
        self.stats.record(handled, errors.len());
        DispatchFailure::check(handled, errors)
    }

    pub fn fire_key(&self, key: Key, pressed: bool) -> Result<bool, DispatchFailure> {
        self.fire(Category::Key, Some(key.into()), InputValue::Pressed(pressed))
    }

    pub fn fire_key_typed(&self, character: char) -> Result<bool, DispatchFailure> {
        self.fire(Category::KeyTyped, None, InputValue::Character(character))
    }

    pub fn fire_mouse_button(
        &self,
        button: MouseButton,
        pressed: bool,
    ) -> Result<bool, DispatchFailure> {
        self.fire(Category::MouseButton, Some(button.into()), InputValue::Pressed(pressed))
    }

    /// Relative pointer movement along one axis.
    pub fn fire_mouse_axis(&self, axis: MouseAxis, delta: f64) -> Result<bool, DispatchFailure> {
        self.fire(Category::MouseAxis, Some(axis.into()), InputValue::Amount(delta))
    }

    /// Absolute window-relative pointer position along one axis.
    pub fn fire_mouse_position(
        &self,
        axis: MouseAxis,
        position: f64,
    ) -> Result<bool, DispatchFailure> {
        self.fire(Category::MousePosition, Some(axis.into()), InputValue::Amount(position))
    }

    pub fn fire_mouse_scroll(&self, axis: MouseAxis, amount: f64) -> Result<bool, DispatchFailure> {
        self.fire(Category::MouseScroll, Some(axis.into()), InputValue::Amount(amount))
    }

    fn snapshot(&self) -> Arc<DispatchTables> {
        Arc::clone(&self.tables.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn publish(&self, tables: DispatchTables) {
        *self.tables.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(tables);
    }
}

/// Merges the outcome of several fires into one.
#[derive(Default)]
struct Outcome {
    handled: bool,
    failures: Vec<DispatchFailure>,
}

impl Outcome {
    fn add(&mut self, result: Result<bool, DispatchFailure>) {
        match result {
            Ok(handled) => self.handled |= handled,
            Err(failure) => {
                self.handled |= failure.handled;
                self.failures.push(failure);
            }
        }
    }

    fn finish(self) -> Result<bool, DispatchFailure> {
        let errors = self.failures.into_iter().flat_map(|failure| failure.errors).collect();
        DispatchFailure::check(self.handled, errors)
    }
}
