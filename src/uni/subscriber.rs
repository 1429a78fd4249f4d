//! The downstream capability interface.
//!
//! The emitter machinery depends only on [`UniSubscriber`]; it never sees a
//! concrete consumer type. Handlers take `&self` because delivery can come
//! from any thread, and they return `Result` so a consumer can reject a
//! delivery. A rejected delivery is reported back to the producer and keeps
//! the termination hook from running.

use std::sync::Arc;

use parking_lot::Mutex;

use super::UniSubscription;
use crate::error::Error;

/// A consumer of a single asynchronous outcome.
///
/// A subscriber receives [`on_subscribe`](Self::on_subscribe) first, then at
/// most one of [`on_result`](Self::on_result) or
/// [`on_failure`](Self::on_failure), on whichever thread produced it.
pub trait UniSubscriber<T>: Send + Sync {
    /// Receives the handle that can cancel this subscription.
    ///
    /// Called before the producer runs, so cancellation is possible before
    /// any signal is produced.
    fn on_subscribe(&self, _subscription: UniSubscription) {}

    /// Receives the value. Returning `Err` marks the delivery as failed.
    fn on_result(&self, value: T) -> Result<(), Error>;

    /// Receives the failure. Returning `Err` marks the delivery as failed.
    fn on_failure(&self, failure: Error) -> Result<(), Error>;
}

impl<T, S> UniSubscriber<T> for Arc<S>
where
    S: UniSubscriber<T> + ?Sized,
{
    fn on_subscribe(&self, subscription: UniSubscription) {
        (**self).on_subscribe(subscription);
    }

    fn on_result(&self, value: T) -> Result<(), Error> {
        (**self).on_result(value)
    }

    fn on_failure(&self, failure: Error) -> Result<(), Error> {
        (**self).on_failure(failure)
    }
}

type ResultCallback<T> = Box<dyn FnOnce(T) + Send + 'static>;
type FailureCallback = Box<dyn FnOnce(Error) + Send + 'static>;

/// A subscriber built from a pair of one-shot callbacks.
///
/// Created by [`Uni::subscribe_with`](super::Uni::subscribe_with).
pub struct CallbackSubscriber<T> {
    on_result: Mutex<Option<ResultCallback<T>>>,
    on_failure: Mutex<Option<FailureCallback>>,
}

impl<T> CallbackSubscriber<T> {
    /// Creates a subscriber that forwards to the given callbacks.
    pub fn new<R, F>(on_result: R, on_failure: F) -> Self
    where
        R: FnOnce(T) + Send + 'static,
        F: FnOnce(Error) + Send + 'static,
    {
        Self {
            on_result: Mutex::new(Some(Box::new(on_result))),
            on_failure: Mutex::new(Some(Box::new(on_failure))),
        }
    }
}

impl<T: Send + 'static> UniSubscriber<T> for CallbackSubscriber<T> {
    fn on_result(&self, value: T) -> Result<(), Error> {
        let callback = self.on_result.lock().take();
        if let Some(callback) = callback {
            callback(value);
        }
        Ok(())
    }

    fn on_failure(&self, failure: Error) -> Result<(), Error> {
        let callback = self.on_failure.lock().take();
        if let Some(callback) = callback {
            callback(failure);
        }
        Ok(())
    }
}

impl<T> std::fmt::Debug for CallbackSubscriber<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackSubscriber")
            .field("result_pending", &self.on_result.lock().is_some())
            .field("failure_pending", &self.on_failure.lock().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn callbacks_fire_once() {
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_result = Arc::clone(&seen);
        let subscriber = CallbackSubscriber::new(
            move |v: usize| {
                seen_result.fetch_add(v, Ordering::SeqCst);
            },
            |_err| {},
        );

        subscriber.on_result(5).expect("accepted");
        subscriber.on_result(7).expect("accepted");
        assert_eq!(seen.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn arc_forwards_to_inner() {
        let failures = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&failures);
        let subscriber = Arc::new(CallbackSubscriber::new(|_v: i32| {}, move |_err| {
            counted.fetch_add(1, Ordering::SeqCst);
        }));

        UniSubscriber::<i32>::on_failure(&subscriber, Error::user("boom")).expect("accepted");
        assert_eq!(failures.load(Ordering::SeqCst), 1);
    }
}
