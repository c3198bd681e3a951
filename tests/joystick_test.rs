use input_router::{
    CatchAll, Category, HatIndex, HatPosition, InputConsumer, InputRouter, JoystickAxis,
    JoystickButton, JoystickConnectionListener, JoystickDevice, JoystickDirection, JoystickSample,
    JoystickSource, Method, ProfileBuilder, RouterError, SlotStatus,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Seen {
    Button(JoystickButton, bool),
    Axis(JoystickAxis, f64),
    Direction(JoystickAxis, JoystickDirection),
    Hat(HatIndex, HatPosition),
}

#[derive(Default)]
struct Recorder {
    seen: Vec<Seen>,
}

impl InputConsumer for Recorder {
    fn bindings(bindings: &mut ProfileBuilder<Self>) {
        bindings
            .catch_all(
                "on_button",
                Category::JoystickButton,
                CatchAll::joystick_buttons(|r: &mut Recorder, b, p| {
                    r.seen.push(Seen::Button(b, p))
                }),
            )
            .catch_all(
                "on_axis",
                Category::JoystickAxis,
                CatchAll::joystick_axes(|r: &mut Recorder, a, v| r.seen.push(Seen::Axis(a, v))),
            )
            .catch_all(
                "on_direction",
                Category::JoystickDirection,
                CatchAll::joystick_directions(|r: &mut Recorder, a, d| {
                    r.seen.push(Seen::Direction(a, d))
                }),
            )
            .catch_all(
                "on_hat",
                Category::JoystickHat,
                CatchAll::joystick_hats(|r: &mut Recorder, h, p| r.seen.push(Seen::Hat(h, p))),
            );
    }
}

fn device() -> JoystickDevice {
    JoystickDevice {
        name: "Pad".to_string(),
        guid: "030000005e0400008e02000014010000".to_string(),
        is_gamepad: true,
    }
}

fn left_x(value: f32) -> JoystickSample {
    JoystickSample {
        axes: vec![value, 0.0],
        buttons: vec![0; 15],
        hats: vec![0],
    }
}

fn bound(slot: usize) -> (InputRouter, Arc<Mutex<Recorder>>) {
    let router = InputRouter::new();
    let recorder = Arc::new(Mutex::new(Recorder::default()));
    router.connect_joystick(slot, device()).unwrap();
    router.bind_joystick(slot, &recorder).unwrap();
    (router, recorder)
}

fn take(recorder: &Arc<Mutex<Recorder>>) -> Vec<Seen> {
    std::mem::take(&mut recorder.lock().unwrap().seen)
}

#[test]
fn test_deadzone_clamp_and_raw_sign_direction() {
    let (router, recorder) = bound(0);
    router.poll_joystick(0, &left_x(0.0)).unwrap();
    assert!(take(&recorder).is_empty());

    router.poll_joystick(0, &left_x(0.03)).unwrap();
    assert_eq!(
        take(&recorder),
        vec![Seen::Direction(JoystickAxis::LeftX, JoystickDirection::Positive)]
    );

    // still inside the deadzone but across zero
    router.poll_joystick(0, &left_x(-0.03)).unwrap();
    assert_eq!(
        take(&recorder),
        vec![Seen::Direction(JoystickAxis::LeftX, JoystickDirection::Negative)]
    );

    router.poll_joystick(0, &left_x(-0.5)).unwrap();
    assert_eq!(take(&recorder), vec![Seen::Axis(JoystickAxis::LeftX, -0.5)]);

    router.poll_joystick(0, &left_x(0.0)).unwrap();
    assert_eq!(
        take(&recorder),
        vec![
            Seen::Axis(JoystickAxis::LeftX, 0.0),
            Seen::Direction(JoystickAxis::LeftX, JoystickDirection::Neutral),
        ]
    );
}

#[test]
fn test_epsilon_suppression() {
    let (router, recorder) = bound(0);
    router.poll_joystick(0, &left_x(0.25)).unwrap();
    router.poll_joystick(0, &left_x(0.2505)).unwrap();
    router.poll_joystick(0, &left_x(0.251)).unwrap();
    assert!(take(&recorder).is_empty());
}

#[test]
fn test_button_edges_only() {
    let (router, recorder) = bound(4);
    let mut sample = left_x(0.0);
    router.poll_joystick(4, &sample).unwrap();

    sample.buttons[JoystickButton::Start.raw_id() as usize] = 1;
    for _ in 0..3 {
        router.poll_joystick(4, &sample).unwrap();
    }
    sample.buttons[JoystickButton::Start.raw_id() as usize] = 0;
    router.poll_joystick(4, &sample).unwrap();

    assert_eq!(
        take(&recorder),
        vec![
            Seen::Button(JoystickButton::Start, true),
            Seen::Button(JoystickButton::Start, false),
        ]
    );
}

#[test]
fn test_hat_changes() {
    let (router, recorder) = bound(0);
    let mut sample = left_x(0.0);
    router.poll_joystick(0, &sample).unwrap();

    sample.hats[0] = 1;
    router.poll_joystick(0, &sample).unwrap();
    router.poll_joystick(0, &sample).unwrap();
    sample.hats[0] = 9;
    router.poll_joystick(0, &sample).unwrap();

    let hat = HatIndex::new(0).unwrap();
    assert_eq!(
        take(&recorder),
        vec![Seen::Hat(hat, HatPosition::Up), Seen::Hat(hat, HatPosition::LeftUp)]
    );
}

#[test]
fn test_reconnection_reset() {
    let (router, recorder) = bound(2);
    let mut pressed = left_x(0.8);
    pressed.buttons[0] = 1;
    router.poll_joystick(2, &left_x(0.0)).unwrap();
    router.poll_joystick(2, &pressed).unwrap();
    assert!(!take(&recorder).is_empty());

    router.disconnect_joystick(2).unwrap();
    assert_eq!(router.joystick_status(2).unwrap(), SlotStatus::Disconnected);
    assert!(matches!(router.poll_joystick(2, &pressed), Err(RouterError::NotConnected(2))));

    router.connect_joystick(2, device()).unwrap();
    assert_eq!(router.joystick_status(2).unwrap(), SlotStatus::Connected(device()));
    router.bind_joystick(2, &recorder).unwrap();

    // identical to the last sample before the disconnect
    router.poll_joystick(2, &pressed).unwrap();
    router.poll_joystick(2, &pressed).unwrap();
    assert!(take(&recorder).is_empty());
}

#[test]
fn test_unknown_indices_are_skipped() {
    let (router, recorder) = bound(0);
    let wide = |value: f32, extra: u8| JoystickSample {
        axes: vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, value, value],
        buttons: [vec![0; 15], vec![extra; 4]].concat(),
        hats: vec![0],
    };
    router.poll_joystick(0, &wide(0.0, 0)).unwrap();
    assert!(!router.poll_joystick(0, &wide(1.0, 1)).unwrap());
    assert!(take(&recorder).is_empty());
}

struct Binder {
    consumers: Mutex<HashMap<usize, Arc<Mutex<Recorder>>>>,
    disconnects: Mutex<Vec<usize>>,
}

impl JoystickConnectionListener for Binder {
    fn on_joystick_connect(&self, router: &InputRouter, slot: usize, _device: &JoystickDevice) {
        let recorder = Arc::new(Mutex::new(Recorder::default()));
        router.bind_joystick(slot, &recorder).unwrap();
        self.consumers.lock().unwrap().insert(slot, recorder);
    }

    fn on_joystick_disconnect(&self, _router: &InputRouter, slot: usize) {
        self.disconnects.lock().unwrap().push(slot);
    }
}

struct FakePads {
    samples: HashMap<usize, JoystickSample>,
}

impl JoystickSource for FakePads {
    fn sample(&mut self, slot: usize) -> Option<JoystickSample> {
        self.samples.get(&slot).cloned()
    }
}

#[test]
fn test_listeners_bind_on_connect() {
    let router = InputRouter::new();
    let binder = Arc::new(Binder {
        consumers: Mutex::new(HashMap::new()),
        disconnects: Mutex::new(Vec::new()),
    });
    let listener: Arc<dyn JoystickConnectionListener> = binder.clone();
    router.add_joystick_listener(Arc::clone(&listener));

    router.connect_joystick(0, device()).unwrap();
    router.connect_joystick(1, device()).unwrap();
    assert_eq!(router.joystick_status(1).unwrap(), SlotStatus::Bound(device()));

    let mut pads = FakePads {
        samples: HashMap::from([(0, left_x(0.0)), (1, left_x(0.0))]),
    };
    router.poll_joysticks(&mut pads).unwrap();
    pads.samples.insert(1, left_x(1.0));
    assert!(router.poll_joysticks(&mut pads).unwrap());

    {
        let consumers = binder.consumers.lock().unwrap();
        assert!(consumers[&0].lock().unwrap().seen.is_empty());
        assert_eq!(
            consumers[&1].lock().unwrap().seen,
            vec![
                Seen::Axis(JoystickAxis::LeftX, 1.0),
                Seen::Direction(JoystickAxis::LeftX, JoystickDirection::Positive),
            ]
        );
    }

    router.disconnect_joystick(1).unwrap();
    // a second disconnect is not announced
    router.disconnect_joystick(1).unwrap();
    assert_eq!(*binder.disconnects.lock().unwrap(), vec![1]);

    assert!(router.remove_joystick_listener(&listener));
    router.connect_joystick(1, device()).unwrap();
    assert_eq!(router.joystick_status(1).unwrap(), SlotStatus::Connected(device()));
}

#[test]
fn test_handler_may_unbind_its_own_slot() {
    struct OneShot {
        router: Arc<InputRouter>,
        fired: u32,
    }

    let router = Arc::new(InputRouter::new());
    let one_shot = Arc::new(Mutex::new(OneShot {
        router: Arc::clone(&router),
        fired: 0,
    }));
    router.connect_joystick(5, device()).unwrap();
    router
        .bind_joystick_with(
            5,
            Arc::new(input_router::JoystickSettings::default()),
            &one_shot,
            |b| {
                b.method(
                    "on_a",
                    Category::JoystickButton,
                    JoystickButton::A,
                    Method::flag(|o: &mut OneShot, _| {
                        o.fired += 1;
                        o.router.unbind_joystick(5).map(|_| ())
                    }),
                );
            },
        )
        .unwrap();

    let mut sample = left_x(0.0);
    router.poll_joystick(5, &sample).unwrap();
    sample.buttons[0] = 1;
    router.poll_joystick(5, &sample).unwrap();
    sample.buttons[0] = 0;
    router.poll_joystick(5, &sample).unwrap();

    assert_eq!(one_shot.lock().unwrap().fired, 1);
    assert_eq!(router.joystick_status(5).unwrap(), SlotStatus::Connected(device()));
}

struct Journal {
    entries: Mutex<Vec<String>>,
}

impl JoystickConnectionListener for Journal {
    fn on_joystick_connect(&self, _router: &InputRouter, slot: usize, _device: &JoystickDevice) {
        self.entries.lock().unwrap().push(format!("connect {}", slot));
    }

    fn on_joystick_disconnect(&self, _router: &InputRouter, slot: usize) {
        self.entries.lock().unwrap().push(format!("disconnect {}", slot));
    }
}

#[test]
fn test_reconnect_over_bound_slot_announces_disconnect() {
    let (router, recorder) = bound(0);
    let journal = Arc::new(Journal {
        entries: Mutex::new(Vec::new()),
    });
    router.add_joystick_listener(journal.clone());

    router.poll_joystick(0, &left_x(0.0)).unwrap();
    router.connect_joystick(0, device()).unwrap();
    router.connect_joystick(1, device()).unwrap();

    assert_eq!(
        *journal.entries.lock().unwrap(),
        vec!["disconnect 0", "connect 0", "connect 1"]
    );
    assert_eq!(router.joystick_status(0).unwrap(), SlotStatus::Connected(device()));
    // the old binding went away with its history
    assert!(!router.poll_joystick(0, &left_x(1.0)).unwrap());
    assert!(take(&recorder).is_empty());
}
