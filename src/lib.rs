//! Declarative input routing
//!
//! Consumers declare once which controls they care about and how each one
//! reaches them: a field write, a single-argument method or a per-category
//! catch-all. The [`InputRouter`] compiles those declarations into profiles
//! and fans window events out to every registered profile, while polled
//! joystick state is diffed per device slot and routed only to the profile
//! bound to that slot.
//!
//! ```text
//! window callbacks ──► InputRouter::handle_window_event ──► dispatch lists ──► profiles
//! device samples ───► InputRouter::poll_joystick ──► JoystickState ──► bound profile
//! ```

pub mod backend;
pub mod config;
pub mod controls;
pub mod error;
pub mod joystick;
pub mod profile;
pub mod router;

pub use config::{ConfigError, RouterConfig};
pub use controls::{
    Control, ControlKind, HatIndex, HatPosition, JoystickAxis, JoystickButton, JoystickDirection,
    Key, MouseAxis, MouseButton,
};
pub use error::{DispatchError, DispatchFailure, HandlerError, RouterError, SetupError};
pub use joystick::{
    JoystickConnectionListener, JoystickDevice, JoystickParameters, JoystickSample,
    JoystickSettings, JoystickSource, SlotStatus,
};
pub use profile::{
    CatchAll, Category, Field, InputConsumer, InputValue, Method, Profile, ProfileBuilder,
};
pub use router::{InputRouter, RouterStats, WindowEvent};
