//! `Uni` as a `Future`, driven by `futures_lite::future::block_on`.

mod common;

use common::{HookCounter, init_test_logging};
use futures_lite::future;
use parking_lot::Mutex;
use std::future::{Future, IntoFuture};
use std::pin::pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::thread;
use std::time::Duration;
use uni_bridge::{Error, ErrorKind, TerminalOutcome, Uni, UniEmitter};

fn init_test(test_name: &str) {
    init_test_logging();
    uni_bridge::test_phase!(test_name);
}

#[test]
fn await_sync_result() {
    init_test("await_sync_result");
    let uni = Uni::<String>::emitter(|emitter| emitter.result("ready".to_string()));
    let value = future::block_on(async { uni.await }).expect("value");
    assert_eq!(value, "ready");
    uni_bridge::test_complete!("await_sync_result");
}

#[test]
fn await_threaded_result() {
    init_test("await_threaded_result");
    let uni = Uni::<u64>::emitter(|emitter| {
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            emitter.result(99).expect("future accepts");
        });
        Ok(())
    });
    let value = future::block_on(uni.into_future()).expect("value");
    assert_eq!(value, 99);
    uni_bridge::test_complete!("await_threaded_result");
}

#[test]
fn await_failure() {
    init_test("await_failure");
    let uni = Uni::<u64>::emitter(|_emitter| Err(Error::user("producer failed")));
    let err = future::block_on(uni.into_future()).expect_err("failure");
    assert_eq!(err.kind(), ErrorKind::User);
    assert_eq!(err.message(), Some("producer failed"));
    uni_bridge::test_complete!("await_failure");
}

#[test]
fn each_await_resubscribes() {
    init_test("each_await_resubscribes");
    let uni = Uni::<u8>::emitter(|emitter| emitter.result(1));
    let first = future::block_on(uni.clone().into_future()).expect("first");
    let second = future::block_on(uni.into_future()).expect("second");
    assert_eq!((first, second), (1, 1));
    uni_bridge::test_complete!("each_await_resubscribes");
}

#[test]
fn dropping_pending_future_cancels() {
    init_test("dropping_pending_future_cancels");
    let hooks = HookCounter::new();
    let counter = hooks.clone();
    let parked: Arc<Mutex<Option<UniEmitter<u8>>>> = Arc::new(Mutex::new(None));
    let keep = Arc::clone(&parked);
    let uni = Uni::<u8>::emitter(move |emitter| {
        counter.register(&emitter);
        *keep.lock() = Some(emitter);
        Ok(())
    });

    let mut fut = Box::pin(uni.into_future());
    let mut cx = Context::from_waker(std::task::Waker::noop());
    assert!(fut.as_mut().poll(&mut cx).is_pending());
    let subscription = fut.subscription().cloned().expect("subscribed on poll");
    drop(fut);

    assert_eq!(subscription.outcome(), TerminalOutcome::Cancelled);
    assert_eq!(hooks.count(), 1);

    let emitter = parked.lock().take().expect("producer ran");
    emitter.result(3).expect("late result is dropped");
    assert_eq!(hooks.count(), 1);
    uni_bridge::test_complete!("dropping_pending_future_cancels");
}

#[test]
fn unpolled_future_never_subscribes() {
    init_test("unpolled_future_never_subscribes");
    let runs = HookCounter::new();
    let counter = runs.clone();
    let uni = Uni::<u8>::emitter(move |emitter| {
        counter.register(&emitter);
        emitter.result(1)
    });
    let fut = uni.into_future();
    assert!(fut.subscription().is_none());
    drop(fut);
    assert_eq!(runs.count(), 0);
    uni_bridge::test_complete!("unpolled_future_never_subscribes");
}

#[test]
fn completed_future_drop_does_not_cancel() {
    init_test("completed_future_drop_does_not_cancel");
    let uni = Uni::<u8>::emitter(|emitter| emitter.result(4));
    let mut fut = pin!(uni.into_future());
    let mut cx = Context::from_waker(std::task::Waker::noop());
    let Poll::Ready(value) = fut.as_mut().poll(&mut cx) else {
        panic!("sync producer resolves on first poll");
    };
    assert_eq!(value.expect("value"), 4);
    let subscription = fut.subscription().cloned().expect("subscribed");
    assert_eq!(subscription.outcome(), TerminalOutcome::Result);
    uni_bridge::test_complete!("completed_future_drop_does_not_cancel");
}

#[test]
fn outside_cancel_resolves_future_as_cancelled() {
    init_test("outside_cancel_resolves_future_as_cancelled");
    let hooks = HookCounter::new();
    let counter = hooks.clone();
    let uni = Uni::<u8>::emitter(move |emitter| {
        counter.register(&emitter);
        Ok(())
    });

    let mut fut = Box::pin(uni.into_future());
    let mut cx = Context::from_waker(std::task::Waker::noop());
    assert!(fut.as_mut().poll(&mut cx).is_pending());
    let subscription = fut.subscription().cloned().expect("subscribed on poll");

    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(10));
        subscription.cancel();
    });
    let err = future::block_on(fut).expect_err("cancelled");
    canceller.join().expect("canceller panicked");

    assert!(err.is_cancelled());
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert_eq!(hooks.count(), 1);
    uni_bridge::test_complete!("outside_cancel_resolves_future_as_cancelled");
}
