//! Consumer profiles
//!
//! A profile is the compiled set of bindings for one consumer: per category,
//! the field and method targets keyed by control, the optional catch-all and
//! the optional change hook. Consumers declare their bindings once through
//! [`InputConsumer::bindings`]; the declaration is validated and compiled by
//! [`ProfileBuilder`] before the router ever sees it.

mod builder;
mod category;
mod targets;

pub use builder::ProfileBuilder;
pub use category::{Category, InputValue, Signature, TargetKind, ValueShape};
pub use targets::{CatchAll, Field, HandlerOutput, Method};

use crate::controls::Control;
use crate::error::{DispatchError, DispatchFailure, SetupError};
use std::any::type_name;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use targets::{ChangeHook, TargetFailure};

/// A type that declares how input reaches it.
pub trait InputConsumer: Send + Sized + 'static {
    fn bindings(bindings: &mut ProfileBuilder<Self>);
}

/// Identity of a shared consumer instance.
///
/// Two handles are the same consumer when they point at the same allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConsumerId(usize);

impl ConsumerId {
    pub fn of<T>(consumer: &Arc<Mutex<T>>) -> Self {
        Self(Arc::as_ptr(consumer) as *const () as usize)
    }
}

pub(crate) struct Named<X> {
    pub(crate) member: String,
    pub(crate) target: X,
}

impl<X> Named<X> {
    pub(crate) fn new(member: &str, target: X) -> Self {
        Self {
            member: member.to_string(),
            target,
        }
    }
}

pub(crate) struct CategoryTable<T> {
    pub(crate) fields: HashMap<Control, Named<Field<T>>>,
    pub(crate) methods: HashMap<Control, Named<Method<T>>>,
    pub(crate) catch_all: Option<Named<CatchAll<T>>>,
}

impl<T> CategoryTable<T> {
    fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.methods.is_empty() && self.catch_all.is_none()
    }
}

impl<T> Default for CategoryTable<T> {
    fn default() -> Self {
        Self {
            fields: HashMap::new(),
            methods: HashMap::new(),
            catch_all: None,
        }
    }
}

/// Outcome of delivering one event to one profile
#[derive(Debug, Default)]
pub(crate) struct Delivery {
    pub(crate) handled: bool,
    pub(crate) errors: Vec<DispatchError>,
}

/// Type-erased profile as held by the router.
pub(crate) trait Dispatch: Send + Sync {
    fn consumer_id(&self) -> ConsumerId;
    fn consumer_name(&self) -> &'static str;
    fn handles(&self, category: Category) -> bool;
    fn deliver(&self, category: Category, control: Option<Control>, value: InputValue) -> Delivery;
}

/// The compiled bindings of one consumer instance.
pub struct Profile<T> {
    consumer: Arc<Mutex<T>>,
    tables: Vec<CategoryTable<T>>,
    change_hook: Option<Named<ChangeHook<T>>>,
    handles: [bool; Category::COUNT],
}

impl<T: InputConsumer> Profile<T> {
    /// Compiles the bindings `T` declares for `consumer`.
    pub fn build(consumer: &Arc<Mutex<T>>) -> Result<Self, SetupError> {
        let mut builder = ProfileBuilder::new();
        T::bindings(&mut builder);
        builder.build(Arc::clone(consumer))
    }
}

impl<T: Send + 'static> Profile<T> {
    pub(crate) fn from_parts(
        consumer: Arc<Mutex<T>>,
        tables: Vec<CategoryTable<T>>,
        change_hook: Option<Named<ChangeHook<T>>>,
    ) -> Self {
        let mut handles = [false; Category::COUNT];
        for (slot, table) in handles.iter_mut().zip(&tables) {
            *slot = !table.is_empty();
        }
        Self {
            consumer,
            tables,
            change_hook,
            handles,
        }
    }

    pub fn consumer(&self) -> &Arc<Mutex<T>> {
        &self.consumer
    }

    /// Whether any target of this profile listens to `category`.
    pub fn handles(&self, category: Category) -> bool {
        self.handles[category.index()]
    }

    /// Delivers one event to this profile alone.
    ///
    /// Every matching target is attempted; the error lists each one that failed.
    pub fn fire(
        &self,
        category: Category,
        control: Option<Control>,
        value: InputValue,
    ) -> Result<bool, DispatchFailure> {
        let delivery = self.deliver_to(category, control, value);
        DispatchFailure::check(delivery.handled, delivery.errors)
    }

    fn deliver_to(
        &self,
        category: Category,
        control: Option<Control>,
        value: InputValue,
    ) -> Delivery {
        let mut delivery = Delivery::default();
        if !self.handles(category) {
            return delivery;
        }
        let consumer_name = type_name::<T>();
        let mut consumer = match self.consumer.lock() {
            Ok(guard) => guard,
            Err(_) => {
                delivery.errors.push(DispatchError::Poisoned {
                    consumer: consumer_name,
                });
                return delivery;
            }
        };

        let table = &self.tables[category.index()];
        let found = Signature::of(control, &value);
        let outcome = |delivery: &mut Delivery,
                       result: Result<(), TargetFailure>,
                       member: &str,
                       kind: TargetKind,
                       expected: Signature| match result {
            Ok(()) => delivery.handled = true,
            Err(TargetFailure::Mismatch) => delivery.errors.push(DispatchError::Mismatch {
                consumer: consumer_name,
                member: member.to_string(),
                kind,
                expected,
                found,
            }),
            Err(TargetFailure::Rejected(source)) => delivery.errors.push(DispatchError::Rejected {
                consumer: consumer_name,
                member: member.to_string(),
                kind,
                category,
                source,
            }),
        };

        if let Some(control) = control {
            let expected = |shape| Signature {
                identity: Some(control.kind()),
                shape,
            };
            if let Some(field) = table.fields.get(&control) {
                let result = field.target.write(&mut *consumer, &value);
                let expected = expected(field.target.shape());
                outcome(&mut delivery, result, &field.member, TargetKind::Field, expected);
            }
            if let Some(method) = table.methods.get(&control) {
                let result = method.target.call(&mut *consumer, &value);
                let expected = expected(method.target.shape());
                outcome(&mut delivery, result, &method.member, TargetKind::Method, expected);
            }
        }
        if let Some(catch_all) = &table.catch_all {
            let result = catch_all.target.call(&mut *consumer, control, &value);
            let expected = catch_all.target.signature();
            outcome(&mut delivery, result, &catch_all.member, TargetKind::CatchAll, expected);
        }

        if delivery.handled {
            if let Some(hook) = &self.change_hook {
                if let Err(source) = (hook.target)(&mut *consumer) {
                    delivery.errors.push(DispatchError::Rejected {
                        consumer: consumer_name,
                        member: hook.member.clone(),
                        kind: TargetKind::ChangeHook,
                        category,
                        source,
                    });
                }
            }
        }
        delivery
    }
}

impl<T: Send + 'static> Dispatch for Profile<T> {
    fn consumer_id(&self) -> ConsumerId {
        ConsumerId::of(&self.consumer)
    }

    fn consumer_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn handles(&self, category: Category) -> bool {
        Profile::handles(self, category)
    }

    fn deliver(&self, category: Category, control: Option<Control>, value: InputValue) -> Delivery {
        self.deliver_to(category, control, value)
    }
}

impl<T> std::fmt::Debug for Profile<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let categories: Vec<_> = Category::ALL
            .iter()
            .filter(|category| self.handles[category.index()])
            .collect();
        f.debug_struct("Profile")
            .field("consumer", &type_name::<T>())
            .field("categories", &categories)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::{JoystickAxis, JoystickDirection, Key};

    #[derive(Default)]
    struct Ship {
        thrust: bool,
        steering: f64,
        heading: JoystickDirection,
        typed: String,
        changes: u32,
        log: Vec<&'static str>,
    }

    impl InputConsumer for Ship {
        fn bindings(bindings: &mut ProfileBuilder<Self>) {
            bindings
                .field("thrust", Category::Key, Key::W, Field::flag(|s: &mut Ship| &mut s.thrust))
                .method(
                    "on_thrust",
                    Category::Key,
                    Key::W,
                    Method::flag(|s: &mut Ship, _| s.log.push("method")),
                )
                .catch_all(
                    "on_key",
                    Category::Key,
                    CatchAll::keys(|s: &mut Ship, _, _| s.log.push("catch-all")),
                )
                .catch_all(
                    "on_typed",
                    Category::KeyTyped,
                    CatchAll::typed(|s: &mut Ship, c| s.typed.push(c)),
                )
                .field(
                    "steering",
                    Category::JoystickAxis,
                    JoystickAxis::LeftX,
                    Field::amount(|s: &mut Ship| &mut s.steering),
                )
                .method(
                    "on_heading",
                    Category::JoystickDirection,
                    JoystickAxis::LeftX,
                    Method::direction(|s: &mut Ship, d| {
                        if d == JoystickDirection::Neutral {
                            return Err("lost heading");
                        }
                        s.heading = d;
                        Ok(())
                    }),
                )
                .on_change("changed", |s: &mut Ship| s.changes += 1);
        }
    }

    fn ship() -> (Arc<Mutex<Ship>>, Profile<Ship>) {
        let consumer = Arc::new(Mutex::new(Ship::default()));
        let profile = Profile::build(&consumer).unwrap();
        (consumer, profile)
    }

    #[test]
    fn targets_fire_field_then_method_then_catch_all() {
        let (consumer, profile) = ship();
        let handled = profile
            .fire(Category::Key, Some(Key::W.into()), InputValue::Pressed(true))
            .unwrap();

        assert!(handled);
        let ship = consumer.lock().unwrap();
        assert!(ship.thrust);
        assert_eq!(ship.log, vec!["method", "catch-all"]);
        assert_eq!(ship.changes, 1);
    }

    #[test]
    fn unrelated_category_is_not_handled() {
        let (consumer, profile) = ship();
        assert!(!profile.handles(Category::MouseButton));
        let handled = profile
            .fire(Category::MouseScroll, None, InputValue::Amount(1.0))
            .unwrap();
        assert!(!handled);
        assert_eq!(consumer.lock().unwrap().changes, 0);
    }

    #[test]
    fn rejected_method_is_reported_and_others_still_run() {
        let (consumer, profile) = ship();
        let failure = profile
            .fire(
                Category::JoystickDirection,
                Some(JoystickAxis::LeftX.into()),
                InputValue::Direction(JoystickDirection::Neutral),
            )
            .unwrap_err();

        assert!(!failure.handled);
        assert!(matches!(
            failure.first(),
            Some(DispatchError::Rejected {
                member,
                kind: TargetKind::Method,
                ..
            }) if member == "on_heading"
        ));
        assert_eq!(consumer.lock().unwrap().changes, 0);
    }

    #[test]
    fn typed_characters_reach_the_catch_all() {
        let (consumer, profile) = ship();
        for c in "hi".chars() {
            profile
                .fire(Category::KeyTyped, None, InputValue::Character(c))
                .unwrap();
        }
        assert_eq!(consumer.lock().unwrap().typed, "hi");
    }

    #[test]
    fn poisoned_consumer_is_reported() {
        let (consumer, profile) = ship();
        let poisoner = Arc::clone(&consumer);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison");
        })
        .join();

        let failure = profile
            .fire(Category::Key, Some(Key::W.into()), InputValue::Pressed(true))
            .unwrap_err();
        assert!(matches!(failure.first(), Some(DispatchError::Poisoned { .. })));
    }
}
