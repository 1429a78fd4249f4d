//! The consumer-facing cancellation handle.

use std::sync::Arc;
use std::task::Waker;

use super::state::TerminalState;
use crate::tracing_compat::{debug, trace};
use crate::types::{SubscriptionId, TerminalOutcome};

/// Handle handed to the downstream subscriber at subscription time.
///
/// Cancellation competes with the producer's `result`/`failure` calls for the
/// single terminal transition. It never interrupts a running producer; it
/// only makes later deliveries no-ops.
///
/// Cloning yields another handle to the same subscription.
#[derive(Clone)]
pub struct UniSubscription {
    state: Arc<TerminalState>,
    id: SubscriptionId,
}

impl UniSubscription {
    pub(crate) fn new(state: Arc<TerminalState>, id: SubscriptionId) -> Self {
        Self { state, id }
    }

    /// Cancels the subscription.
    ///
    /// If cancellation wins, the termination hook runs once on this thread
    /// and nothing is delivered downstream. Otherwise this is a silent no-op,
    /// which makes repeated or late cancellation harmless, including from
    /// inside a downstream handler.
    pub fn cancel(&self) {
        if self.state.try_resolve(TerminalOutcome::Cancelled) {
            debug!(subscription = %self.id, "subscription cancelled");
            if self.state.release_hook() {
                trace!(subscription = %self.id, "termination hook fired on cancel");
            }
            self.state.wake_cancelled();
        } else {
            trace!(
                subscription = %self.id,
                outcome = %self.state.outcome(),
                "cancel ignored, already terminated"
            );
        }
    }

    /// Registers `waker` to be woken if cancellation wins.
    pub(crate) fn register_cancel_waker(&self, waker: &Waker) {
        self.state.register_cancel_waker(waker);
    }

    /// Returns true if cancellation won the terminal race.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state.outcome() == TerminalOutcome::Cancelled
    }

    /// Returns true once any terminal signal has won.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.state.is_terminated()
    }

    /// Returns the current outcome tag.
    #[must_use]
    pub fn outcome(&self) -> TerminalOutcome {
        self.state.outcome()
    }

    /// Returns the subscription id.
    #[must_use]
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl std::fmt::Debug for UniSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UniSubscription")
            .field("id", &self.id)
            .field("outcome", &self.state.outcome())
            .finish()
    }
}
