//! Uni-bridge: exactly-once, cancel-correct bridge from callback producers to
//! single-value sources.
//!
//! # Overview
//!
//! A [`Uni`] is a cold source that resolves to at most one outcome: a value,
//! a failure, or a downstream cancellation. It is built from a producer
//! callback that receives a [`UniEmitter`] and may complete it synchronously,
//! later, or from another thread. The first terminal signal wins; everything
//! after it is dropped.
//!
//! # Core Guarantees
//!
//! - **Exactly once**: at most one of `on_result`/`on_failure` reaches the subscriber
//! - **Cancel-correctness**: cancellation never interrupts the producer, it only
//!   makes later deliveries no-ops and releases resources through the hook
//! - **Single release**: the termination hook runs at most once, after cancel or
//!   an accepted delivery, and never while an internal lock is held
//! - **No silent consumer errors**: a subscriber rejecting a delivery surfaces as
//!   an `Err` to whoever emitted it
//!
//! # Module Structure
//!
//! - [`uni`]: The source, emitter, subscription and subscriber contract
//! - [`types`]: Identifiers and outcome tags
//! - [`config`]: Emitter configuration and environment overrides
//! - [`error`](mod@error): Error types
//! - [`tracing_compat`]: Optional tracing integration (requires `tracing-integration` feature)
//!
//! # Example
//!
//! ```
//! use uni_bridge::Uni;
//!
//! let uni = Uni::<&str>::emitter(|emitter| {
//!     emitter.on_termination(|| { /* release resources */ });
//!     emitter.result("hello")
//! });
//!
//! assert_eq!(uni.await_blocking().unwrap(), "hello");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

pub mod config;
pub mod error;
pub mod tracing_compat;
pub mod types;
pub mod uni;

#[cfg(any(test, feature = "test-internals"))]
pub mod test_utils;

pub use config::{ConfigError, EmitterConfig};
pub use error::{Error, ErrorKind};
pub use types::{PanicPayload, SubscriptionId, TerminalOutcome};
pub use uni::{
    CallbackSubscriber, Producer, Uni, UniEmitter, UniFuture, UniSubscriber, UniSubscription,
};
