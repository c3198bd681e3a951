//! Pointer identities

use super::control_enum;

control_enum! {
    /// A mouse button, keyed by GLFW button index.
    pub enum MouseButton {
        Left = 0,
        Right = 1,
        Middle = 2,
        Button4 = 3,
        Button5 = 4,
        Button6 = 5,
        Button7 = 6,
        Button8 = 7,
    }
}

control_enum! {
    /// A pointer axis. Shared by position, movement and scroll events.
    pub enum MouseAxis {
        X = 0,
        Y = 1,
    }
}
