//! Test utilities for emitter-backed sources.
//!
//! This module provides shared helpers for unit and integration tests:
//! - Consistent tracing-based logging initialization
//! - Phase/section macros for readable test output
//! - [`AssertSubscriber`], a recording subscriber with assertion helpers
//!
//! # Example
//! ```
//! use uni_bridge::Uni;
//! use uni_bridge::test_utils::{AssertSubscriber, init_test_logging};
//!
//! init_test_logging();
//! let subscriber = AssertSubscriber::new();
//! Uni::<i32>::emitter(|emitter| emitter.result(1)).subscribe(subscriber.clone()).unwrap();
//! subscriber.assert_result(1);
//! ```

use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Once};

use parking_lot::Mutex;

use crate::error::{Error, ErrorKind};
use crate::uni::{UniSubscriber, UniSubscription};

static INIT_LOGGING: Once = Once::new();

/// Initialize test logging with trace-level output.
///
/// Safe to call multiple times; only initializes once.
pub fn init_test_logging() {
    init_test_logging_with_level(tracing::Level::TRACE);
}

/// Initialize test logging with a custom level.
///
/// The first call wins; later calls are no-ops.
pub fn init_test_logging_with_level(level: tracing::Level) {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_test_writer()
            .with_file(true)
            .with_line_number(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_ansi(false)
            .try_init();
    });
}

/// Log a test phase transition with a visual separator.
#[macro_export]
macro_rules! test_phase {
    ($name:expr) => {
        tracing::info!(phase = %$name, "========================================");
        tracing::info!(phase = %$name, "TEST PHASE: {}", $name);
        tracing::info!(phase = %$name, "========================================");
    };
}

/// Log a section within a test phase.
#[macro_export]
macro_rules! test_section {
    ($name:expr) => {
        tracing::debug!(section = %$name, "--- {} ---", $name);
    };
}

/// Log test completion with summary.
#[macro_export]
macro_rules! test_complete {
    ($name:expr) => {
        tracing::info!(test = %$name, "test completed successfully: {}", $name);
    };
    ($name:expr, $($key:ident = $value:expr),* $(,)?) => {
        tracing::info!(
            test = %$name,
            $($key = %$value,)*
            "test completed successfully: {}",
            $name
        );
    };
}

/// Log before assertions for context.
#[macro_export]
macro_rules! assert_with_log {
    ($cond:expr, $msg:expr, $expected:expr, $actual:expr) => {
        tracing::debug!(
            expected = ?$expected,
            actual = ?$actual,
            "Asserting: {}",
            $msg
        );
        assert!($cond, "{}: expected {:?}, got {:?}", $msg, $expected, $actual);
    };
}

struct Recorded<T> {
    subscription: Mutex<Option<UniSubscription>>,
    subscribe_calls: Mutex<usize>,
    results: Mutex<Vec<T>>,
    failures: Mutex<Vec<Error>>,
    reject_result: Mutex<Option<Error>>,
    reject_failure: Mutex<Option<Error>>,
    cancel_in_handler: AtomicBool,
}

/// A subscriber that records every signal it receives.
///
/// Clones share the same recording, so keep one clone for assertions and
/// hand another to [`Uni::subscribe`](crate::Uni::subscribe).
pub struct AssertSubscriber<T> {
    inner: Arc<Recorded<T>>,
}

impl<T> Clone for AssertSubscriber<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for AssertSubscriber<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> AssertSubscriber<T> {
    /// Creates an accepting subscriber with an empty recording.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Recorded {
                subscription: Mutex::new(None),
                subscribe_calls: Mutex::new(0),
                results: Mutex::new(Vec::new()),
                failures: Mutex::new(Vec::new()),
                reject_result: Mutex::new(None),
                reject_failure: Mutex::new(None),
                cancel_in_handler: AtomicBool::new(false),
            }),
        }
    }

    /// Makes the result handler record the value, then reject it with `err`.
    #[must_use]
    pub fn failing_on_result(self, err: Error) -> Self {
        *self.inner.reject_result.lock() = Some(err);
        self
    }

    /// Makes the failure handler record the failure, then reject it with `err`.
    #[must_use]
    pub fn failing_on_failure(self, err: Error) -> Self {
        *self.inner.reject_failure.lock() = Some(err);
        self
    }

    /// Makes both handlers cancel their own subscription before returning.
    #[must_use]
    pub fn cancelling_in_handler(self) -> Self {
        self.inner.cancel_in_handler.store(true, Ordering::SeqCst);
        self
    }

    /// Returns the subscription received in `on_subscribe`.
    #[must_use]
    pub fn subscription(&self) -> Option<UniSubscription> {
        self.inner.subscription.lock().clone()
    }

    /// Returns how many times `on_subscribe` was called.
    #[must_use]
    pub fn subscribe_count(&self) -> usize {
        *self.inner.subscribe_calls.lock()
    }

    /// Cancels the recorded subscription.
    ///
    /// # Panics
    ///
    /// Panics if `on_subscribe` has not been called.
    pub fn cancel(&self) {
        self.subscription()
            .expect("cancel called before on_subscribe")
            .cancel();
    }

    /// Returns the number of delivered values.
    #[must_use]
    pub fn result_count(&self) -> usize {
        self.inner.results.lock().len()
    }

    /// Returns the number of delivered failures.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.inner.failures.lock().len()
    }

    /// Returns the delivered failures.
    #[must_use]
    pub fn failures(&self) -> Vec<Error> {
        self.inner.failures.lock().clone()
    }

    /// Returns the total number of downstream notifications.
    #[must_use]
    pub fn signal_count(&self) -> usize {
        self.result_count() + self.failure_count()
    }

    /// Asserts that exactly one value and no failure were delivered.
    #[track_caller]
    pub fn assert_completed(&self) -> &Self {
        let results = self.result_count();
        let failures = self.failure_count();
        assert!(
            results == 1 && failures == 0,
            "expected one result and no failure, got {results} result(s) and {failures} failure(s)"
        );
        self
    }

    /// Asserts that exactly one failure and no value were delivered, with the
    /// given kind and a message containing `message`.
    #[track_caller]
    pub fn assert_failure(&self, kind: ErrorKind, message: &str) -> &Self {
        let failures = self.inner.failures.lock();
        let results = self.inner.results.lock().len();
        assert!(
            failures.len() == 1 && results == 0,
            "expected one failure and no result, got {} failure(s) and {results} result(s)",
            failures.len()
        );
        let failure = &failures[0];
        assert_eq!(failure.kind(), kind, "unexpected failure kind: {failure}");
        let actual = failure.message().unwrap_or("");
        assert!(
            actual.contains(message),
            "failure message {actual:?} does not contain {message:?}"
        );
        self
    }

    /// Asserts that nothing was delivered.
    #[track_caller]
    pub fn assert_not_terminated(&self) -> &Self {
        let signals = self.signal_count();
        assert_eq!(signals, 0, "expected no signal, got {signals}");
        self
    }
}

impl<T: Clone> AssertSubscriber<T> {
    /// Returns the delivered values.
    #[must_use]
    pub fn results(&self) -> Vec<T> {
        self.inner.results.lock().clone()
    }
}

impl<T: PartialEq + Debug> AssertSubscriber<T> {
    /// Asserts that exactly `expected` and no failure were delivered.
    #[track_caller]
    pub fn assert_result(&self, expected: T) -> &Self {
        self.assert_completed();
        let results = self.inner.results.lock();
        assert_eq!(results[0], expected, "unexpected result");
        self
    }
}

impl<T: Send + 'static> UniSubscriber<T> for AssertSubscriber<T> {
    fn on_subscribe(&self, subscription: UniSubscription) {
        *self.inner.subscribe_calls.lock() += 1;
        *self.inner.subscription.lock() = Some(subscription);
    }

    fn on_result(&self, value: T) -> Result<(), Error> {
        self.inner.results.lock().push(value);
        self.after_signal();
        self.inner.reject_result.lock().clone().map_or(Ok(()), Err)
    }

    fn on_failure(&self, failure: Error) -> Result<(), Error> {
        self.inner.failures.lock().push(failure);
        self.after_signal();
        self.inner.reject_failure.lock().clone().map_or(Ok(()), Err)
    }
}

impl<T> AssertSubscriber<T> {
    fn after_signal(&self) {
        if self.inner.cancel_in_handler.load(Ordering::SeqCst) {
            if let Some(subscription) = self.subscription() {
                subscription.cancel();
            }
        }
    }
}

impl<T> Debug for AssertSubscriber<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssertSubscriber")
            .field("results", &self.result_count())
            .field("failures", &self.failure_count())
            .finish_non_exhaustive()
    }
}
