//! Terminal outcome tags and panic payloads.
//!
//! A subscription resolves at most once, to one of three terminal variants:
//!
//! - `Result`: a value was handed to the downstream result handler
//! - `Failure`: an error was handed to the downstream failure handler
//! - `Cancelled`: the downstream cancelled before either happened
//!
//! The payload itself is moved to the winning delivery; the tag is what the
//! shared state cell records.

use core::fmt;
use std::any::Any;

/// The resolution state of a single subscription.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TerminalOutcome {
    /// No terminal signal has won yet.
    #[default]
    Unresolved = 0,
    /// A value delivery won.
    Result = 1,
    /// A failure delivery won.
    Failure = 2,
    /// Cancellation won.
    Cancelled = 3,
}

impl TerminalOutcome {
    /// Decodes a tag stored in the atomic cell.
    ///
    /// Unknown tags decode as `Unresolved`; the cell never stores them.
    #[inline]
    #[must_use]
    pub(crate) const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Result,
            2 => Self::Failure,
            3 => Self::Cancelled,
            _ => Self::Unresolved,
        }
    }

    /// Returns true for every variant except `Unresolved`.
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Unresolved)
    }

    /// Returns the outcome name as a static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unresolved => "unresolved",
            Self::Result => "result",
            Self::Failure => "failure",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TerminalOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload from a caught panic.
///
/// Wraps the panic message so it can travel as an ordinary failure.
#[derive(Debug, Clone)]
pub struct PanicPayload {
    message: String,
}

impl PanicPayload {
    /// Creates a new panic payload with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Extracts the message from a `catch_unwind` payload.
    #[must_use]
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        if let Some(s) = payload.downcast_ref::<&str>() {
            Self::new(*s)
        } else if let Some(s) = payload.downcast_ref::<String>() {
            Self::new(s.clone())
        } else {
            Self::new("unknown panic payload")
        }
    }

    /// Returns the panic message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for PanicPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "panic: {}", self.message)
    }
}

impl From<PanicPayload> for crate::error::Error {
    fn from(payload: PanicPayload) -> Self {
        Self::panicked(payload.message)
    }
}
