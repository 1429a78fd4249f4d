//! Core types shared by the emitter machinery.
//!
//! - [`id`]: Subscription identifiers
//! - [`outcome`]: Terminal outcome tags and panic payloads

pub mod id;
pub mod outcome;

pub use id::SubscriptionId;
pub use outcome::{PanicPayload, TerminalOutcome};
