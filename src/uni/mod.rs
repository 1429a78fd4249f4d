//! Emitter-backed single-value sources.
//!
//! A [`Uni`] wraps a producer callback. Each subscription gets a fresh
//! terminal state cell shared by a [`UniEmitter`] (handed to the producer)
//! and a [`UniSubscription`] (handed to the subscriber). The first of
//! `result`, `failure` or `cancel` to reach the cell decides the outcome; the
//! rest are dropped.
//!
//! ```text
//! subscribe(S)
//!   ├─ allocate TerminalState, UniEmitter, UniSubscription
//!   ├─ S.on_subscribe(subscription)          cancellation possible from here on
//!   ├─ producer(emitter)                      synchronously, exactly once
//!   │    └─ emitter.result(v) ─► S.on_result(v) ─► hook (if accepted)
//!   └─ producer error / panic ─► emitter.failure(e)
//! ```
//!
//! The crate imposes no scheduling: every entry point runs on the caller's
//! thread and none of them blocks.

mod emitter;
mod state;
mod subscriber;
mod subscription;
mod wait;

pub use emitter::UniEmitter;
pub use subscriber::{CallbackSubscriber, UniSubscriber};
pub use subscription::UniSubscription;
pub use wait::UniFuture;

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::config::EmitterConfig;
use crate::error::Error;
use crate::tracing_compat::{debug, trace, warn};
use crate::types::{PanicPayload, SubscriptionId};
use state::TerminalState;

/// A producer callback.
///
/// Receives the emitter for one subscription. Returning `Err` (or panicking,
/// when panics are caught) counts as an implicit `failure` signal.
pub type Producer<T> = Arc<dyn Fn(UniEmitter<T>) -> Result<(), Error> + Send + Sync>;

/// A cold single-value source created from a producer callback.
///
/// Nothing runs until [`subscribe`](Self::subscribe) is called, and every
/// subscription runs the producer again.
///
/// # Example
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use uni_bridge::Uni;
///
/// let uni = Uni::<i32>::emitter(|emitter| {
///     emitter.result(1)?;
///     emitter.result(2)?; // dropped
///     Ok(())
/// });
///
/// let seen = Arc::new(Mutex::new(None));
/// let sink = Arc::clone(&seen);
/// uni.subscribe_with(move |v| *sink.lock().unwrap() = Some(v), |_| {})
///     .unwrap();
/// assert_eq!(*seen.lock().unwrap(), Some(1));
/// ```
pub struct Uni<T> {
    producer: Producer<T>,
    config: Arc<EmitterConfig>,
}

impl<T> Clone for Uni<T> {
    fn clone(&self) -> Self {
        Self {
            producer: Arc::clone(&self.producer),
            config: Arc::clone(&self.config),
        }
    }
}

impl<T: Send + 'static> Uni<T> {
    /// Creates a source from a producer closure.
    ///
    /// Uses [`EmitterConfig::default`]; environment overrides only apply
    /// through [`EmitterConfig::from_env`] and [`with_config`](Self::with_config).
    pub fn emitter<F>(producer: F) -> Self
    where
        F: Fn(UniEmitter<T>) -> Result<(), Error> + Send + Sync + 'static,
    {
        Self {
            producer: Arc::new(producer),
            config: Arc::new(EmitterConfig::default()),
        }
    }

    /// Creates a source from an optional producer.
    ///
    /// Fails with [`InvalidArgument`](crate::ErrorKind::InvalidArgument) when
    /// the producer is absent. No subscription exists at that point.
    pub fn from_producer(producer: Option<Producer<T>>) -> Result<Self, Error> {
        let producer =
            producer.ok_or_else(|| Error::invalid_argument("producer must not be absent"))?;
        Ok(Self {
            producer,
            config: Arc::new(EmitterConfig::default()),
        })
    }

    /// Replaces the configuration used by later subscriptions.
    #[must_use]
    pub fn with_config(mut self, config: EmitterConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    /// Subscribes `subscriber` and runs the producer once.
    ///
    /// The subscriber receives its [`UniSubscription`] before the producer
    /// starts; a clone is also returned. If the producer returns an error or
    /// panics, that error is signalled as a failure. The call only fails when
    /// the subscriber rejects that implicit failure, in which case its error
    /// is returned here.
    ///
    /// # Panics
    ///
    /// A panic raised by one of the subscriber's handlers while the producer
    /// delivers synchronously unwinds out of this call unchanged.
    pub fn subscribe<S>(&self, subscriber: S) -> Result<UniSubscription, Error>
    where
        S: UniSubscriber<T> + 'static,
    {
        let id = SubscriptionId::next();
        let state = Arc::new(TerminalState::new());
        let downstream: Arc<dyn UniSubscriber<T>> = Arc::new(subscriber);
        let subscription = UniSubscription::new(Arc::clone(&state), id);
        let emitter = UniEmitter::new(state, Arc::clone(&downstream), Arc::clone(&self.config), id);

        debug!(
            subscription = %id,
            label = self.config.label_or_default(),
            "subscription started"
        );
        downstream.on_subscribe(subscription.clone());

        if let Err(err) = self.run_producer(&emitter) {
            if emitter.is_terminated() {
                trace!(subscription = %id, error = %err, "producer error after resolution swallowed");
            } else {
                debug!(subscription = %id, error = %err, "producer raised, signalling failure");
            }
            emitter.failure(err)?;
        }
        Ok(subscription)
    }

    /// Subscribes a pair of one-shot callbacks.
    pub fn subscribe_with<R, F>(&self, on_result: R, on_failure: F) -> Result<UniSubscription, Error>
    where
        R: FnOnce(T) + Send + 'static,
        F: FnOnce(Error) + Send + 'static,
    {
        self.subscribe(CallbackSubscriber::new(on_result, on_failure))
    }

    fn run_producer(&self, emitter: &UniEmitter<T>) -> Result<(), Error> {
        let run = || (self.producer)(emitter.clone());
        if !self.config.catch_producer_panics {
            return run();
        }
        panic::catch_unwind(AssertUnwindSafe(run)).unwrap_or_else(|payload| {
            if emitter.delivery_panicked() {
                trace!(subscription = %emitter.id(), "downstream panic passing through");
                panic::resume_unwind(payload);
            }
            let payload = PanicPayload::from_panic(&*payload);
            warn!(
                subscription = %emitter.id(),
                label = self.config.label_or_default(),
                panic = payload.message(),
                "producer panicked"
            );
            Err(payload.into())
        })
    }
}

impl<T> std::fmt::Debug for Uni<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Uni")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
