use input_router::joystick::{JoystickEvent, JoystickState};
use input_router::{
    Control, ControlKind, HatIndex, JoystickButton, JoystickSample, JoystickSettings, Key,
    MouseButton,
};
use proptest::prelude::*;

const KINDS: [ControlKind; 7] = [
    ControlKind::Key,
    ControlKind::MouseButton,
    ControlKind::MouseAxis,
    ControlKind::JoystickButton,
    ControlKind::JoystickAxis,
    ControlKind::JoystickHat,
    ControlKind::JoystickDirection,
];

proptest! {
    #[test]
    fn raw_lookups_never_panic_and_invert(raw in any::<i32>(), kind in 0usize..KINDS.len()) {
        if let Some(control) = Control::from_raw(KINDS[kind], raw) {
            prop_assert_eq!(control.raw_id(), raw);
            prop_assert_eq!(control.kind(), KINDS[kind]);
        }
    }

    #[test]
    fn key_table_is_sparse_but_consistent(raw in -10i32..400) {
        let known = Key::ALL.iter().any(|key| key.raw_id() == raw);
        prop_assert_eq!(Key::from_raw(raw).is_some(), known);
    }

    #[test]
    fn small_ids_resolve_within_table_bounds(raw in 0i32..32) {
        prop_assert_eq!(MouseButton::from_raw(raw).is_some(), raw < 8);
        prop_assert_eq!(HatIndex::from_raw(raw).is_some(), raw < 16);
    }

    #[test]
    fn button_polling_fires_edges_only(presses in prop::collection::vec(any::<bool>(), 1..40)) {
        let params = JoystickSettings::default();
        let mut state = JoystickState::new();
        let frame = |pressed: bool| JoystickSample {
            axes: Vec::new(),
            buttons: vec![u8::from(pressed)],
            hats: Vec::new(),
        };

        prop_assert!(state.update(&params, &frame(false)).is_empty());
        let mut previous = false;
        for pressed in presses {
            let events = state.update(&params, &frame(pressed));
            if pressed == previous {
                prop_assert!(events.is_empty());
            } else {
                prop_assert_eq!(events, vec![JoystickEvent::Button(JoystickButton::A, pressed)]);
            }
            previous = pressed;
        }
    }

    #[test]
    fn amounts_inside_the_deadzone_never_fire(
        values in prop::collection::vec(-0.0499f32..0.0499, 1..20)
    ) {
        let params = JoystickSettings::default();
        let mut state = JoystickState::new();
        let frame = |value: f32| JoystickSample {
            axes: vec![value],
            buttons: Vec::new(),
            hats: Vec::new(),
        };

        state.update(&params, &frame(0.0));
        for value in values {
            let events = state.update(&params, &frame(value));
            prop_assert!(events.iter().all(|event| !matches!(event, JoystickEvent::Axis(..))));
        }
    }
}
