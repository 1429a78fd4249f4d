//! Error types for emitter-backed sources.
//!
//! Error handling follows these principles:
//!
//! - Errors are explicit and typed (no stringly-typed errors)
//! - Producer panics are isolated and converted to [`ErrorKind::Panicked`]
//! - Errors raised by downstream handlers are propagated, never re-wrapped
//!
//! # Error Categories
//!
//! - **Configuration**: absent producer or absent failure ([`ErrorKind::InvalidArgument`])
//! - **Producer**: errors returned or panics raised by producer callbacks
//! - **Subscriber**: errors raised by downstream handlers during delivery
//! - **Waiting**: cancellation and timeouts observed by the await adapters

use core::fmt;
use std::sync::Arc;

/// The kind of error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required argument was absent or malformed.
    InvalidArgument,
    /// A producer callback panicked.
    Panicked,
    /// A downstream handler rejected a delivery.
    Subscriber,
    /// The subscription was cancelled before an outcome was delivered.
    Cancelled,
    /// A bounded wait elapsed before an outcome was delivered.
    Timeout,
    /// User-provided error.
    User,
}

impl ErrorKind {
    /// Returns a short static description of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid argument",
            Self::Panicked => "producer panicked",
            Self::Subscriber => "subscriber error",
            Self::Cancelled => "cancelled",
            Self::Timeout => "timed out",
            Self::User => "user error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The main error type for emitter-backed sources.
///
/// # Example
///
/// ```
/// use uni_bridge::{Error, ErrorKind};
///
/// let err = Error::user("boom");
/// assert_eq!(err.kind(), ErrorKind::User);
/// assert_eq!(err.message(), Some("boom"));
/// ```
#[derive(Debug, Clone)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    /// Creates an invalid-argument error with a message.
    #[must_use]
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument).with_message(msg)
    }

    /// Creates an error describing a caught producer panic.
    #[must_use]
    pub fn panicked(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Panicked).with_message(msg)
    }

    /// Creates a user error with a message.
    #[must_use]
    pub fn user(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::User).with_message(msg)
    }

    /// Creates a subscriber error with a message.
    #[must_use]
    pub fn subscriber(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Subscriber).with_message(msg)
    }

    /// Creates a cancellation error.
    #[must_use]
    pub const fn cancelled() -> Self {
        Self::new(ErrorKind::Cancelled)
    }

    /// Creates a timeout error.
    #[must_use]
    pub const fn timeout() -> Self {
        Self::new(ErrorKind::Timeout)
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Adds a message description to the error.
    #[must_use]
    pub fn with_message(mut self, msg: impl Into<String>) -> Self {
        self.message = Some(msg.into());
        self
    }

    /// Attaches an underlying source error.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Returns true if this error is an invalid-argument condition.
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self.kind, ErrorKind::InvalidArgument)
    }

    /// Returns true if this error describes a caught producer panic.
    #[must_use]
    pub const fn is_panicked(&self) -> bool {
        matches!(self.kind, ErrorKind::Panicked)
    }

    /// Returns true if this error represents cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self.kind, ErrorKind::Cancelled)
    }

    /// Returns true if this error is a timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self.kind, ErrorKind::Timeout)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(msg) = &self.message {
            if !msg.is_empty() {
                write!(f, ": {msg}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[derive(Debug)]
    struct Underlying;

    impl fmt::Display for Underlying {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "underlying")
        }
    }

    impl std::error::Error for Underlying {}

    #[test]
    fn constructor_helpers() {
        assert_eq!(
            Error::invalid_argument("x").kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(Error::panicked("x").kind(), ErrorKind::Panicked);
        assert_eq!(Error::user("x").kind(), ErrorKind::User);
        assert_eq!(Error::subscriber("x").kind(), ErrorKind::Subscriber);
        assert!(Error::cancelled().is_cancelled());
        assert!(Error::timeout().is_timeout());
    }

    #[test]
    fn display_includes_message() {
        let err = Error::user("boom");
        assert_eq!(err.to_string(), "user error: boom");

        let bare = Error::new(ErrorKind::InvalidArgument);
        assert_eq!(bare.to_string(), "invalid argument");

        let empty = Error::invalid_argument("");
        assert_eq!(empty.to_string(), "invalid argument");
    }

    #[test]
    fn source_is_exposed() {
        let err = Error::user("wrapped").with_source(Underlying);
        let source = err.source().expect("source attached");
        assert_eq!(source.to_string(), "underlying");
    }

    #[test]
    fn clone_shares_source() {
        let err = Error::user("wrapped").with_source(Underlying);
        let cloned = err.clone();
        assert!(cloned.source().is_some());
        assert_eq!(cloned.message(), Some("wrapped"));
    }
}
