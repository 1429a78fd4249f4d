//! The producer-facing emitter.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use super::state::TerminalState;
use super::subscriber::UniSubscriber;
use crate::config::EmitterConfig;
use crate::error::Error;
use crate::tracing_compat::{debug, trace};
use crate::types::{SubscriptionId, TerminalOutcome};

/// Handle passed to a producer callback to report the single outcome.
///
/// Only the first of `result`, `failure` or a downstream cancel takes effect;
/// later signals are dropped silently. An emitter is cheap to clone and can be
/// moved to another thread to complete the subscription asynchronously.
///
/// # Delivery errors
///
/// When the downstream handler rejects the delivery, `result` and `failure`
/// return that handler's error unchanged. The outcome stays resolved and the
/// termination hook does not run. `Ok(())` means the signal was accepted or
/// dropped as redundant.
///
/// A handler that panics is never caught here: the panic keeps unwinding out
/// of `result`/`failure`, and the termination hook does not run.
///
/// # Example
///
/// ```
/// use uni_bridge::Uni;
///
/// let uni = Uni::<i32>::emitter(|emitter| {
///     emitter.on_termination(|| println!("released"));
///     std::thread::spawn(move || emitter.result(42));
///     Ok(())
/// });
///
/// assert_eq!(uni.await_blocking().unwrap(), 42);
/// ```
pub struct UniEmitter<T> {
    inner: Arc<EmitterInner<T>>,
}

struct EmitterInner<T> {
    state: Arc<TerminalState>,
    downstream: Arc<dyn UniSubscriber<T>>,
    config: Arc<EmitterConfig>,
    id: SubscriptionId,
}

impl<T> Clone for UniEmitter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> UniEmitter<T> {
    pub(crate) fn new(
        state: Arc<TerminalState>,
        downstream: Arc<dyn UniSubscriber<T>>,
        config: Arc<EmitterConfig>,
        id: SubscriptionId,
    ) -> Self {
        Self {
            inner: Arc::new(EmitterInner {
                state,
                downstream,
                config,
                id,
            }),
        }
    }

    /// Signals the value.
    ///
    /// Returns the downstream handler's error if it rejected the value.
    pub fn result(&self, value: T) -> Result<(), Error> {
        let inner = &*self.inner;
        if !inner.state.try_resolve(TerminalOutcome::Result) {
            trace!(
                subscription = %inner.id,
                label = inner.config.label_or_default(),
                outcome = %inner.state.outcome(),
                "late result dropped"
            );
            return Ok(());
        }
        trace!(subscription = %inner.id, "result won, dispatching");
        self.dispatch(|| inner.downstream.on_result(value))
    }

    /// Signals a failure.
    ///
    /// Accepts either an [`Error`] or `None`. An absent error is replaced by
    /// an [`InvalidArgument`](crate::ErrorKind::InvalidArgument) failure, which
    /// is delivered as the single terminal failure.
    ///
    /// Returns the downstream handler's error if it rejected the failure.
    pub fn failure(&self, error: impl Into<Option<Error>>) -> Result<(), Error> {
        let inner = &*self.inner;
        if !inner.state.try_resolve(TerminalOutcome::Failure) {
            trace!(
                subscription = %inner.id,
                label = inner.config.label_or_default(),
                outcome = %inner.state.outcome(),
                "late failure dropped"
            );
            return Ok(());
        }
        let failure = error.into().unwrap_or_else(|| {
            debug!(subscription = %inner.id, "failure signalled without an error");
            Error::invalid_argument(inner.config.null_failure_message.clone())
        });
        trace!(subscription = %inner.id, failure = %failure, "failure won, dispatching");
        self.dispatch(|| inner.downstream.on_failure(failure))
    }

    /// Registers the termination hook, replacing any earlier registration.
    ///
    /// The hook runs once, after cancellation or after a delivery the
    /// downstream accepted. Registering after such a termination runs the
    /// hook immediately on the calling thread. After a rejected delivery the
    /// hook never runs.
    pub fn on_termination<F>(&self, hook: F) -> &Self
    where
        F: FnOnce() + Send + 'static,
    {
        if self.inner.state.set_hook(Box::new(hook)) {
            trace!(subscription = %self.inner.id, "termination hook fired on registration");
        }
        self
    }

    /// Returns true once any terminal signal has won.
    ///
    /// Becomes true as soon as `result` or `failure` wins the race, before
    /// and regardless of the downstream handler's verdict.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.inner.state.is_terminated()
    }

    /// Returns the current outcome tag.
    #[must_use]
    pub fn outcome(&self) -> TerminalOutcome {
        self.inner.state.outcome()
    }

    /// Returns the subscription id.
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.inner.id
    }

    /// Returns true if a downstream handler panicked during delivery.
    pub(crate) fn delivery_panicked(&self) -> bool {
        self.inner.state.delivery_panicked()
    }

    fn dispatch<F>(&self, deliver: F) -> Result<(), Error>
    where
        F: FnOnce() -> Result<(), Error>,
    {
        match panic::catch_unwind(AssertUnwindSafe(deliver)) {
            Ok(delivery) => self.settle(delivery),
            Err(payload) => {
                debug!(subscription = %self.inner.id, "downstream handler panicked");
                self.inner.state.mark_delivery_panicked();
                panic::resume_unwind(payload)
            }
        }
    }

    fn settle(&self, delivery: Result<(), Error>) -> Result<(), Error> {
        let inner = &*self.inner;
        match delivery {
            Ok(()) => {
                if inner.state.release_hook() {
                    trace!(subscription = %inner.id, "termination hook fired after delivery");
                }
                Ok(())
            }
            Err(err) => {
                debug!(
                    subscription = %inner.id,
                    label = inner.config.label_or_default(),
                    error = %err,
                    "downstream rejected delivery"
                );
                inner.state.suppress_hook();
                Err(err)
            }
        }
    }
}

impl<T> std::fmt::Debug for UniEmitter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UniEmitter")
            .field("id", &self.inner.id)
            .field("outcome", &self.inner.state.outcome())
            .finish_non_exhaustive()
    }
}
