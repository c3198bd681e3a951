use chrono::Local;
use color_eyre::{eyre::eyre, Result};
use input_router::backend::GilrsBackend;
use input_router::{
    CatchAll, Category, Field, HatIndex, HatPosition, InputConsumer, InputRouter, JoystickAxis,
    JoystickButton, JoystickConnectionListener, JoystickDevice, JoystickDirection,
    JoystickParameters, ProfileBuilder, RouterConfig,
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

const CONFIG_ENV: &str = "INPUT_ROUTER_CONFIG";

// Logs everything a bound gamepad does
#[derive(Debug)]
struct GamepadLogger {
    slot: usize,
    left_x: f64,
    left_y: f64,
}

impl InputConsumer for GamepadLogger {
    fn bindings(bindings: &mut ProfileBuilder<Self>) {
        bindings
            .field(
                "left_x",
                Category::JoystickAxis,
                JoystickAxis::LeftX,
                Field::amount(|g: &mut GamepadLogger| &mut g.left_x),
            )
            .field(
                "left_y",
                Category::JoystickAxis,
                JoystickAxis::LeftY,
                Field::amount(|g: &mut GamepadLogger| &mut g.left_y),
            )
            .catch_all(
                "on_button",
                Category::JoystickButton,
                CatchAll::joystick_buttons(GamepadLogger::on_button),
            )
            .catch_all(
                "on_direction",
                Category::JoystickDirection,
                CatchAll::joystick_directions(GamepadLogger::on_direction),
            )
            .catch_all(
                "on_hat",
                Category::JoystickHat,
                CatchAll::joystick_hats(GamepadLogger::on_hat),
            );
    }
}

impl GamepadLogger {
    fn on_button(&mut self, button: JoystickButton, pressed: bool) {
        let state = if pressed { "pressed" } else { "released" };
        info!(
            "[{}] {} {} at {}",
            self.slot,
            button,
            state,
            Local::now().format("%H:%M:%S.%3f")
        );
    }

    fn on_direction(&mut self, axis: JoystickAxis, direction: JoystickDirection) {
        info!(
            "[{}] {} now {} (left stick {:.3}, {:.3})",
            self.slot, axis, direction, self.left_x, self.left_y
        );
    }

    fn on_hat(&mut self, hat: HatIndex, position: HatPosition) {
        info!("[{}] hat {} moved to {}", self.slot, hat.get(), position);
    }
}

// Binds a fresh logger to every gamepad that shows up
struct AutoBind {
    params: Arc<dyn JoystickParameters>,
}

impl JoystickConnectionListener for AutoBind {
    fn on_joystick_connect(&self, router: &InputRouter, slot: usize, device: &JoystickDevice) {
        if !device.is_gamepad {
            warn!("{} has no gamepad mapping, leaving slot {} unbound", device, slot);
            return;
        }
        let logger = Arc::new(Mutex::new(GamepadLogger {
            slot,
            left_x: 0.0,
            left_y: 0.0,
        }));
        match router.bind_joystick_with_parameters(slot, Arc::clone(&self.params), &logger) {
            Ok(()) => info!("Logging {} on slot {}", device, slot),
            Err(e) => warn!("Failed to bind slot {}: {}", slot, e),
        }
    }

    fn on_joystick_disconnect(&self, _router: &InputRouter, slot: usize) {
        info!("Slot {} is free again", slot);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = setup()?;

    let router = InputRouter::new();
    router.add_joystick_listener(Arc::new(AutoBind {
        params: Arc::new(config.joystick.clone()),
    }));

    let backend = GilrsBackend::create()
        .map_err(|e| eyre!("Failed to create gamepad backend: {}", e))?;
    let mut backend = backend.initialize(&router);

    info!("Polling gamepads every {} ms", config.poll_interval_ms);
    let mut ticker = interval(Duration::from_millis(config.poll_interval_ms));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    // For performance monitoring
    let mut last_stats = router.stats();
    let mut last_log_time = Local::now();
    let log_interval = chrono::Duration::seconds(10);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(failure) = backend.poll(&router) {
                    for error in &failure.errors {
                        warn!("Dispatch failed: {}", error);
                    }
                }

                let now = Local::now();
                if now - last_log_time > log_interval {
                    let stats = router.stats();
                    let events = stats.events - last_stats.events;
                    info!(
                        "Router stats: {} events ({} handled, {} errors) in last {} seconds (avg {:.2}/sec), {} gamepad(s)",
                        events,
                        stats.handled - last_stats.handled,
                        stats.errors - last_stats.errors,
                        log_interval.num_seconds(),
                        events as f64 / log_interval.num_seconds() as f64,
                        backend.connected()
                    );
                    last_stats = stats;
                    last_log_time = now;
                }
            }
            result = &mut shutdown => {
                result?;
                info!("Shutdown signal received");
                break;
            }
        }
    }

    Ok(())
}

fn setup() -> Result<RouterConfig> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }

    let path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let config = RouterConfig::load_or_default(path.as_deref())?;
    setup_logging_env(config.level()?);
    Ok(config)
}

fn setup_logging_env(level: Level) {
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
