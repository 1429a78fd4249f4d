#![allow(dead_code)]
#![allow(unused_imports)]
//! Shared integration test utilities.
//!
//! Import with:
//! ```ignore
//! mod common;
//! use common::*;
//! ```

use proptest::prelude::ProptestConfig;
use proptest::test_runner::RngSeed;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use uni_bridge::UniEmitter;

pub use uni_bridge::test_utils::{AssertSubscriber, init_test_logging};

/// Default seed for property tests when running under CI.
pub const DEFAULT_PROPTEST_SEED: u64 = 0x5EED_5EED;

const PROPTEST_SEED_ENV: &str = "UNI_BRIDGE_PROPTEST_SEED";

fn read_proptest_seed() -> Option<u64> {
    std::env::var(PROPTEST_SEED_ENV)
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .or_else(|| std::env::var_os("CI").map(|_| DEFAULT_PROPTEST_SEED))
}

/// Proptest config with `cases` cases and an optional fixed seed.
#[must_use]
pub fn test_proptest_config(cases: u32) -> ProptestConfig {
    let mut config = ProptestConfig {
        cases,
        ..ProptestConfig::default()
    };
    if let Some(seed) = read_proptest_seed() {
        config.rng_seed = RngSeed::Fixed(seed);
    }
    config
}

/// Counts termination hook invocations.
#[derive(Debug, Clone, Default)]
pub struct HookCounter {
    fired: Arc<AtomicUsize>,
}

impl HookCounter {
    /// Creates a counter at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a counting hook on `emitter`.
    pub fn register<T>(&self, emitter: &UniEmitter<T>) {
        let fired = Arc::clone(&self.fired);
        emitter.on_termination(move || {
            fired.fetch_add(1, Ordering::SeqCst);
        });
    }

    /// Returns how many times the hook ran.
    #[must_use]
    pub fn count(&self) -> usize {
        self.fired.load(Ordering::SeqCst)
    }
}
