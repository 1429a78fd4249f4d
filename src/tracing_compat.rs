//! Logging facade for the emitter machinery.
//!
//! With the `tracing-integration` feature the `tracing` macros are
//! re-exported; without it the same macro names expand to nothing, so the
//! core can log unconditionally at no cost.
//!
//! Every event emitted by this crate carries a `subscription` field holding
//! the [`SubscriptionId`](crate::SubscriptionId) (`U<n>`). Levels in use:
//!
//! | Level | Events |
//! |-------|--------|
//! | `warn` | producer panicked and was converted to a failure |
//! | `debug` | subscription started, cancelled, producer error signalled, downstream rejected or panicked |
//! | `trace` | winning signal dispatched, late signal dropped (with the current `outcome`), hook fired |
//!
//! Events on the producer path also carry the `label` from
//! [`EmitterConfig`](crate::EmitterConfig).
//!
//! ```rust,ignore
//! use uni_bridge::tracing_compat::{debug, trace};
//!
//! debug!(subscription = %id, "subscription cancelled");
//! trace!(subscription = %id, outcome = %outcome, "late result dropped");
//! ```

#[cfg(feature = "tracing-integration")]
pub use tracing::{Level, debug, error, info, trace, warn};

#[cfg(not(feature = "tracing-integration"))]
mod noop {
    //! No-op implementations when tracing is disabled.

    /// No-op trace-level logging macro.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    /// No-op debug-level logging macro.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// No-op info-level logging macro.
    #[macro_export]
    macro_rules! info {
        ($($arg:tt)*) => {};
    }

    /// No-op warn-level logging macro.
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }

    /// No-op error-level logging macro.
    #[macro_export]
    macro_rules! error {
        ($($arg:tt)*) => {};
    }

    pub use crate::{debug, error, info, trace, warn};
}

#[cfg(not(feature = "tracing-integration"))]
pub use noop::*;

/// No-op level type for when tracing is disabled.
#[cfg(not(feature = "tracing-integration"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Level;

#[cfg(not(feature = "tracing-integration"))]
impl Level {
    /// Trace level (most verbose).
    pub const TRACE: Self = Self;
    /// Debug level.
    pub const DEBUG: Self = Self;
    /// Info level.
    pub const INFO: Self = Self;
    /// Warn level.
    pub const WARN: Self = Self;
    /// Error level (least verbose).
    pub const ERROR: Self = Self;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::init_test_logging;

    fn init_test(test_name: &str) {
        init_test_logging();
        crate::test_phase!(test_name);
    }

    #[test]
    fn logging_macros_compile() {
        init_test("logging_macros_compile");
        trace!("trace message");
        debug!("debug message");
        info!("info message");
        warn!("warn message");
        error!("error message");

        let id = crate::SubscriptionId::new_for_test(7);
        let outcome = crate::TerminalOutcome::Cancelled;
        trace!(subscription = %id, outcome = %outcome, "late result dropped");
        debug!(subscription = %id, label = "orders", "subscription started");
        assert_eq!(id.to_string(), "U7");
        assert!(outcome.is_terminal());
        crate::test_complete!("logging_macros_compile");
    }

    #[test]
    fn level_constants() {
        init_test("level_constants");
        let _ = Level::TRACE;
        let _ = Level::DEBUG;
        let _ = Level::INFO;
        let _ = Level::WARN;
        let _ = Level::ERROR;
        crate::test_complete!("level_constants");
    }
}
