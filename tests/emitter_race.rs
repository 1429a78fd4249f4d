//! Cross-thread races between `result`, `failure` and `cancel`.
//!
//! Each round starts several threads behind a barrier and checks that exactly
//! one terminal signal wins, that the subscriber sees at most one delivery,
//! and that the termination hook runs at most once.

mod common;

use common::{AssertSubscriber, HookCounter, init_test_logging};
use parking_lot::Mutex;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use uni_bridge::{Error, TerminalOutcome, Uni, UniEmitter};

const ROUNDS: usize = 200;

fn init_test(test_name: &str) {
    init_test_logging();
    uni_bridge::test_phase!(test_name);
}

/// Subscribes and returns the emitter the producer received.
fn subscribe_parked(
    subscriber: &AssertSubscriber<usize>,
    hooks: &HookCounter,
) -> (UniEmitter<usize>, uni_bridge::UniSubscription) {
    let slot = Arc::new(Mutex::new(None));
    let keep = Arc::clone(&slot);
    let counter = hooks.clone();
    let uni = Uni::<usize>::emitter(move |emitter| {
        counter.register(&emitter);
        *keep.lock() = Some(emitter);
        Ok(())
    });
    let subscription = uni.subscribe(subscriber.clone()).expect("subscribe");
    let emitter = slot.lock().take().expect("producer ran");
    (emitter, subscription)
}

#[test]
fn result_failure_cancel_race_has_one_winner() {
    init_test("result_failure_cancel_race_has_one_winner");
    for round in 0..ROUNDS {
        let subscriber = AssertSubscriber::new();
        let hooks = HookCounter::new();
        let (emitter, subscription) = subscribe_parked(&subscriber, &hooks);
        let barrier = Arc::new(Barrier::new(4));

        let mut handles = Vec::new();
        for value in 0..2 {
            let emitter = emitter.clone();
            let barrier = Arc::clone(&barrier);
            handles.push(thread::spawn(move || {
                barrier.wait();
                emitter.result(value).expect("accepting subscriber");
            }));
        }
        {
            let emitter = emitter.clone();
            let barrier = Arc::clone(&barrier);
            handles.push(thread::spawn(move || {
                barrier.wait();
                emitter
                    .failure(Error::user("racing failure"))
                    .expect("accepting subscriber");
            }));
        }
        {
            let subscription = subscription.clone();
            let barrier = Arc::clone(&barrier);
            handles.push(thread::spawn(move || {
                barrier.wait();
                subscription.cancel();
            }));
        }
        for handle in handles {
            handle.join().expect("racer panicked");
        }

        let signals = subscriber.signal_count();
        match subscription.outcome() {
            TerminalOutcome::Result => {
                assert_eq!(subscriber.result_count(), 1, "round {round}");
                assert_eq!(signals, 1, "round {round}");
            }
            TerminalOutcome::Failure => {
                assert_eq!(subscriber.failure_count(), 1, "round {round}");
                assert_eq!(signals, 1, "round {round}");
            }
            TerminalOutcome::Cancelled => assert_eq!(signals, 0, "round {round}"),
            TerminalOutcome::Unresolved => panic!("round {round}: nothing won"),
        }
        assert_eq!(hooks.count(), 1, "round {round}");
    }
    uni_bridge::test_complete!("result_failure_cancel_race_has_one_winner", rounds = ROUNDS);
}

#[test]
fn concurrent_cancels_fire_hook_once() {
    init_test("concurrent_cancels_fire_hook_once");
    for round in 0..ROUNDS {
        let subscriber = AssertSubscriber::new();
        let hooks = HookCounter::new();
        let (_emitter, subscription) = subscribe_parked(&subscriber, &hooks);
        let barrier = Arc::new(Barrier::new(4));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let subscription = subscription.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    subscription.cancel();
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("canceller panicked");
        }

        assert!(subscription.is_cancelled(), "round {round}");
        assert_eq!(hooks.count(), 1, "round {round}");
        subscriber.assert_not_terminated();
    }
    uni_bridge::test_complete!("concurrent_cancels_fire_hook_once", rounds = ROUNDS);
}

#[test]
fn hook_registration_races_with_cancel() {
    init_test("hook_registration_races_with_cancel");
    for round in 0..ROUNDS {
        let subscriber = AssertSubscriber::<usize>::new();
        let slot = Arc::new(Mutex::new(None));
        let keep = Arc::clone(&slot);
        let uni = Uni::<usize>::emitter(move |emitter| {
            *keep.lock() = Some(emitter);
            Ok(())
        });
        let subscription = uni.subscribe(subscriber.clone()).expect("subscribe");
        let emitter = slot.lock().take().expect("producer ran");

        let hooks = HookCounter::new();
        let barrier = Arc::new(Barrier::new(2));
        let registrar = {
            let hooks = hooks.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                hooks.register(&emitter);
            })
        };
        barrier.wait();
        subscription.cancel();
        registrar.join().expect("registrar panicked");

        assert_eq!(hooks.count(), 1, "round {round}");
    }
    uni_bridge::test_complete!("hook_registration_races_with_cancel", rounds = ROUNDS);
}

#[test]
fn result_from_another_thread_reaches_subscriber() {
    init_test("result_from_another_thread_reaches_subscriber");
    let hooks = HookCounter::new();
    let counter = hooks.clone();
    let uni = Uni::<usize>::emitter(move |emitter| {
        counter.register(&emitter);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(5));
            emitter.result(42).expect("accepting subscriber");
        });
        Ok(())
    });

    let value = uni.await_blocking().expect("value");
    assert_eq!(value, 42);

    // The hook runs on the producer thread right after delivery.
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while hooks.count() == 0 && std::time::Instant::now() < deadline {
        thread::yield_now();
    }
    assert_eq!(hooks.count(), 1);
    uni_bridge::test_complete!("result_from_another_thread_reaches_subscriber");
}
