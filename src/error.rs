//! Error definitions for profile setup, dispatch and device slots

use crate::controls::{Control, ControlKind};
use crate::joystick::SLOT_COUNT;
use crate::profile::{Category, Signature, TargetKind, ValueShape};
use thiserror::Error;

/// Boxed error returned by a fallible consumer method.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Raised while building a profile from a consumer's declared bindings.
///
/// Setup errors are fatal to the registration attempt; no partial profile is kept.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("field {member} is bound to {category} input but holds {found}; {category} input requires {expected}")]
    FieldShape {
        member: String,
        category: Category,
        expected: ValueShape,
        found: ValueShape,
    },

    #[error("method {member} is bound to {category} input but takes {found}; {category} input requires {expected}")]
    MethodShape {
        member: String,
        category: Category,
        expected: ValueShape,
        found: ValueShape,
    },

    #[error("{member} is bound to a {found} control but {category} input is keyed by {expected}")]
    IdentityKind {
        member: String,
        category: Category,
        expected: ControlKind,
        found: ControlKind,
    },

    #[error("{member} cannot target a single control of {category} input; only a catch-all is allowed")]
    NotKeyed { member: String, category: Category },

    #[error("catch-all {member} accepts {found} but {category} input sends {expected}")]
    CatchAllSignature {
        member: String,
        category: Category,
        expected: Signature,
        found: Signature,
    },

    #[error("{member} is tagged more than once for {category} input")]
    DuplicateTag { member: String, category: Category },

    #[error("{member} and {previous} both declare the {kind} for {control} in {category} input")]
    DuplicateTarget {
        member: String,
        previous: String,
        category: Category,
        control: Control,
        kind: TargetKind,
    },

    #[error("{member} and {previous} are both catch-alls for {category} input")]
    DuplicateCatchAll {
        member: String,
        previous: String,
        category: Category,
    },

    #[error("{member} and {previous} are both change hooks")]
    DuplicateChangeHook { member: String, previous: String },
}

/// Raised when a matched target could not be invoked.
///
/// Scoped to one (consumer, category, control) delivery; the remaining
/// consumers still receive the event.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("consumer {consumer} was poisoned by an earlier panic and no longer receives input")]
    Poisoned { consumer: &'static str },

    #[error("{kind} {member} on {consumer} accepts {expected} but was sent {found}")]
    Mismatch {
        consumer: &'static str,
        member: String,
        kind: TargetKind,
        expected: Signature,
        found: Signature,
    },

    #[error("{kind} {member} on {consumer} rejected {category} input: {source}")]
    Rejected {
        consumer: &'static str,
        member: String,
        kind: TargetKind,
        category: Category,
        #[source]
        source: HandlerError,
    },
}

/// Every dispatch error collected during one fan-out.
///
/// The fan-out always completes; `handled` reports whether any consumer
/// still received the event.
#[derive(Debug, Error)]
#[error("{} input target(s) failed during dispatch (handled: {handled})", .errors.len())]
pub struct DispatchFailure {
    pub handled: bool,
    pub errors: Vec<DispatchError>,
}

impl DispatchFailure {
    /// `Ok(handled)` when nothing failed, otherwise the collected failure.
    pub(crate) fn check(handled: bool, errors: Vec<DispatchError>) -> Result<bool, Self> {
        if errors.is_empty() {
            Ok(handled)
        } else {
            Err(Self { handled, errors })
        }
    }

    pub fn first(&self) -> Option<&DispatchError> {
        self.errors.first()
    }
}

/// Errors from the router's registration and device-slot API
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("joystick slot {0} is out of range (slots 0..{max})", max = SLOT_COUNT)]
    InvalidSlot(usize),

    #[error("joystick slot {0} has no connected device")]
    NotConnected(usize),

    #[error("Profile setup failed: {0}")]
    Setup(#[from] SetupError),

    #[error(transparent)]
    Dispatch(#[from] DispatchFailure),
}
