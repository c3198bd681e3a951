//! Device layer adapters
//!
//! Backends own the platform device handles, announce connections to the
//! router and sample connected devices once per frame.

mod gamepads;

pub use gamepads::{hat_code, BackendError, BackendState, GilrsBackend, Initializing, Polling};
