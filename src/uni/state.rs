//! The per-subscription terminal state cell.
//!
//! A [`TerminalState`] is shared by exactly one emitter and one subscription
//! handle. It records which terminal signal won and owns the termination hook.
//!
//! # Race resolution
//!
//! The outcome is a single `AtomicU8` that moves from `Unresolved` to a
//! terminal tag with one compare-and-exchange. Whoever wins the exchange owns
//! the downstream effect; every other caller observes a failed exchange and
//! does nothing. No lock is held while user code runs, so a downstream handler
//! may call [`cancel`](super::UniSubscription::cancel) reentrantly.
//!
//! # Termination hook
//!
//! The hook slot is guarded by a short critical section that only swaps the
//! boxed closure in or out. The winner of the outcome exchange later decides
//! the hook's fate exactly once:
//!
//! - `release_hook`: cancellation won, or a delivery was accepted. The hook
//!   runs now, and any hook registered later runs at registration.
//! - `suppress_hook`: the downstream handler rejected the delivery. The hook
//!   is dropped, and any hook registered later is dropped too.
//!
//! Both sides `take()` the slot under the lock after publishing or observing
//! the phase, so a hook racing with termination runs at most once.
//!
//! A downstream handler that panics during delivery is treated like a
//! rejection: the hook is suppressed and the cell remembers the panic so the
//! operator can let it keep unwinding instead of mistaking it for a producer
//! panic.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::task::Waker;

use parking_lot::Mutex;

use crate::types::TerminalOutcome;

/// A zero-argument cleanup callback.
pub(crate) type TerminationHook = Box<dyn FnOnce() + Send + 'static>;

const HOOK_ARMED: u8 = 0;
const HOOK_RELEASED: u8 = 1;
const HOOK_SUPPRESSED: u8 = 2;

/// Shared state for one subscription.
pub(crate) struct TerminalState {
    outcome: AtomicU8,
    hook_phase: AtomicU8,
    hook: Mutex<Option<TerminationHook>>,
    delivery_panicked: AtomicBool,
    cancel_waker: Mutex<Option<Waker>>,
}

impl TerminalState {
    pub(crate) fn new() -> Self {
        Self {
            outcome: AtomicU8::new(TerminalOutcome::Unresolved as u8),
            hook_phase: AtomicU8::new(HOOK_ARMED),
            hook: Mutex::new(None),
            delivery_panicked: AtomicBool::new(false),
            cancel_waker: Mutex::new(None),
        }
    }

    /// Attempts the one-way `Unresolved -> to` transition.
    ///
    /// Returns `true` for exactly one caller per cell.
    pub(crate) fn try_resolve(&self, to: TerminalOutcome) -> bool {
        debug_assert!(to.is_terminal());
        self.outcome
            .compare_exchange(
                TerminalOutcome::Unresolved as u8,
                to as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    pub(crate) fn outcome(&self) -> TerminalOutcome {
        TerminalOutcome::from_u8(self.outcome.load(Ordering::Acquire))
    }

    pub(crate) fn is_terminated(&self) -> bool {
        self.outcome().is_terminal()
    }

    /// Registers `hook`, replacing any earlier unfired registration.
    ///
    /// Runs the hook immediately if termination already released hooks.
    /// Returns `true` if the hook ran on this call.
    pub(crate) fn set_hook(&self, hook: TerminationHook) -> bool {
        if self.hook_phase.load(Ordering::Acquire) == HOOK_SUPPRESSED {
            return false;
        }
        {
            let mut slot = self.hook.lock();
            *slot = Some(hook);
        }
        match self.hook_phase.load(Ordering::Acquire) {
            HOOK_RELEASED => self.run_hook(),
            HOOK_SUPPRESSED => {
                drop(self.hook.lock().take());
                false
            }
            _ => false,
        }
    }

    /// Runs the registered hook, if any, and arms later registrations to run
    /// immediately. Only the winner of [`try_resolve`](Self::try_resolve)
    /// calls this, at most once.
    pub(crate) fn release_hook(&self) -> bool {
        self.hook_phase.store(HOOK_RELEASED, Ordering::Release);
        self.run_hook()
    }

    /// Drops the registered hook without running it. Only the winner of
    /// [`try_resolve`](Self::try_resolve) calls this, at most once.
    pub(crate) fn suppress_hook(&self) {
        self.hook_phase.store(HOOK_SUPPRESSED, Ordering::Release);
        let hook = self.hook.lock().take();
        drop(hook);
    }

    /// Records that a downstream handler unwound during delivery.
    pub(crate) fn mark_delivery_panicked(&self) {
        self.delivery_panicked.store(true, Ordering::Release);
        self.suppress_hook();
    }

    pub(crate) fn delivery_panicked(&self) -> bool {
        self.delivery_panicked.load(Ordering::Acquire)
    }

    /// Stores the waker to notify when cancellation wins.
    ///
    /// Callers must re-check [`outcome`](Self::outcome) after registering.
    pub(crate) fn register_cancel_waker(&self, waker: &Waker) {
        let mut slot = self.cancel_waker.lock();
        match &*slot {
            Some(existing) if existing.will_wake(waker) => {}
            _ => *slot = Some(waker.clone()),
        }
    }

    /// Wakes the registered cancel waker. Only the cancel winner calls this.
    pub(crate) fn wake_cancelled(&self) {
        let waker = self.cancel_waker.lock().take();
        if let Some(waker) = waker {
            waker.wake();
        }
    }

    fn run_hook(&self) -> bool {
        let hook = self.hook.lock().take();
        hook.is_some_and(|hook| {
            hook();
            true
        })
    }
}

impl std::fmt::Debug for TerminalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalState")
            .field("outcome", &self.outcome())
            .field("hook_phase", &self.hook_phase.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}
