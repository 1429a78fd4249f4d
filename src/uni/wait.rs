//! Awaiting the outcome of a [`Uni`].
//!
//! Two adapters bridge the callback world to callers that want the value:
//!
//! - [`UniFuture`]: a lazily subscribing `Future`. Dropping it before it
//!   resolves cancels the subscription.
//! - [`Uni::await_blocking`] / [`Uni::await_timeout`]: park the calling
//!   thread until the outcome arrives.
//!
//! # Cancel Safety
//!
//! Dropping a pending `UniFuture` is a cancellation: the termination hook
//! runs and any later signal from the producer is dropped.
//!
//! Cancelling the future's [`UniSubscription`] from elsewhere wakes it, and it
//! resolves to a [`Cancelled`](crate::ErrorKind::Cancelled) error.

use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};

use super::{Uni, UniSubscriber, UniSubscription};
use crate::error::Error;
use crate::tracing_compat::{debug, trace};

struct FutureSlot<T> {
    outcome: Option<Result<T, Error>>,
    waker: Option<Waker>,
}

struct FutureSubscriber<T> {
    slot: Arc<Mutex<FutureSlot<T>>>,
}

impl<T> FutureSubscriber<T> {
    fn complete(&self, outcome: Result<T, Error>) {
        let waker = {
            let mut slot = self.slot.lock();
            slot.outcome = Some(outcome);
            slot.waker.take()
        };
        if let Some(waker) = waker {
            waker.wake();
        }
    }
}

impl<T: Send> UniSubscriber<T> for FutureSubscriber<T> {
    fn on_result(&self, value: T) -> Result<(), Error> {
        self.complete(Ok(value));
        Ok(())
    }

    fn on_failure(&self, failure: Error) -> Result<(), Error> {
        self.complete(Err(failure));
        Ok(())
    }
}

/// Future returned by [`Uni::into_future`].
///
/// Subscribes on first poll. Resolves to the delivered value or failure, or
/// to [`Error::cancelled`] if the subscription is cancelled first.
pub struct UniFuture<T> {
    uni: Uni<T>,
    slot: Arc<Mutex<FutureSlot<T>>>,
    subscription: Option<UniSubscription>,
    done: bool,
}

impl<T> UniFuture<T> {
    fn new(uni: Uni<T>) -> Self {
        Self {
            uni,
            slot: Arc::new(Mutex::new(FutureSlot {
                outcome: None,
                waker: None,
            })),
            subscription: None,
            done: false,
        }
    }

    /// Returns the subscription once the future has been polled.
    #[must_use]
    pub fn subscription(&self) -> Option<&UniSubscription> {
        self.subscription.as_ref()
    }
}

impl<T: Send + 'static> Future for UniFuture<T> {
    type Output = Result<T, Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        assert!(!this.done, "UniFuture polled after completion");

        if this.subscription.is_none() {
            let subscriber = FutureSubscriber {
                slot: Arc::clone(&this.slot),
            };
            match this.uni.subscribe(subscriber) {
                Ok(subscription) => this.subscription = Some(subscription),
                Err(err) => {
                    this.done = true;
                    return Poll::Ready(Err(err));
                }
            }
        }

        let mut slot = this.slot.lock();
        if let Some(outcome) = slot.outcome.take() {
            drop(slot);
            this.done = true;
            return Poll::Ready(outcome);
        }
        match &slot.waker {
            Some(existing) if existing.will_wake(cx.waker()) => {}
            _ => slot.waker = Some(cx.waker().clone()),
        }
        drop(slot);

        if let Some(subscription) = &this.subscription {
            subscription.register_cancel_waker(cx.waker());
            if subscription.is_cancelled() {
                trace!(subscription = %subscription.id(), "UniFuture observed cancellation");
                this.done = true;
                return Poll::Ready(Err(Error::cancelled()));
            }
        }
        Poll::Pending
    }
}

impl<T> Drop for UniFuture<T> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        if let Some(subscription) = self.subscription.take() {
            debug!(subscription = %subscription.id(), "pending UniFuture dropped, cancelling");
            subscription.cancel();
        }
    }
}

impl<T> std::fmt::Debug for UniFuture<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UniFuture")
            .field("subscription", &self.subscription)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> IntoFuture for Uni<T> {
    type Output = Result<T, Error>;
    type IntoFuture = UniFuture<T>;

    fn into_future(self) -> Self::IntoFuture {
        UniFuture::new(self)
    }
}

struct BlockingWaiter<T> {
    outcome: Mutex<Option<Result<T, Error>>>,
    ready: Condvar,
}

impl<T> BlockingWaiter<T> {
    fn complete(&self, outcome: Result<T, Error>) {
        *self.outcome.lock() = Some(outcome);
        self.ready.notify_all();
    }
}

impl<T: Send> UniSubscriber<T> for BlockingWaiter<T> {
    fn on_result(&self, value: T) -> Result<(), Error> {
        self.complete(Ok(value));
        Ok(())
    }

    fn on_failure(&self, failure: Error) -> Result<(), Error> {
        self.complete(Err(failure));
        Ok(())
    }
}

impl<T: Send + 'static> Uni<T> {
    /// Subscribes and blocks the calling thread until the outcome arrives.
    ///
    /// Never returns if the producer never signals.
    pub fn await_blocking(&self) -> Result<T, Error> {
        self.wait_for(None)
    }

    /// Subscribes and blocks for at most `timeout`.
    ///
    /// On expiry the subscription is cancelled and a
    /// [`Timeout`](crate::ErrorKind::Timeout) error is returned. If a delivery
    /// wins the race against that cancellation, its outcome is returned
    /// instead.
    pub fn await_timeout(&self, timeout: Duration) -> Result<T, Error> {
        self.wait_for(Some(timeout))
    }

    fn wait_for(&self, timeout: Option<Duration>) -> Result<T, Error> {
        let waiter = Arc::new(BlockingWaiter {
            outcome: Mutex::new(None),
            ready: Condvar::new(),
        });
        let subscription = self.subscribe(Arc::clone(&waiter))?;
        let mut deadline = timeout.map(|t| Instant::now() + t);

        let mut outcome = waiter.outcome.lock();
        loop {
            if let Some(done) = outcome.take() {
                return done;
            }
            match deadline {
                None => waiter.ready.wait(&mut outcome),
                Some(at) => {
                    if !waiter.ready.wait_until(&mut outcome, at).timed_out() {
                        continue;
                    }
                    if let Some(done) = outcome.take() {
                        return done;
                    }
                    MutexGuard::unlocked(&mut outcome, || subscription.cancel());
                    if subscription.is_cancelled() {
                        debug!(subscription = %subscription.id(), "await timed out");
                        return Err(Error::timeout());
                    }
                    // A delivery won the race and is about to land.
                    deadline = None;
                }
            }
        }
    }
}
