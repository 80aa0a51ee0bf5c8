//! E2E tests for change notification
//!
//! The poller fans each dirty tick out to every listener once, in
//! registration order, and stops with the session.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use vmremote::mock::MockEngine;
use vmremote::properties::StripProperty;
use vmremote::{Remote, RemoteConfig};

fn connected() -> (Remote, MockEngine) {
    let engine = MockEngine::new();
    let config = RemoteConfig {
        poll_interval_ms: 1,
        settle_delay_ms: 0,
        ..Default::default()
    };
    let remote = Remote::with_api(engine.clone(), config);
    remote.connect().unwrap();
    (remote, engine)
}

fn wait_for(mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    done()
}

#[test]
fn test_each_listener_runs_once_in_order() {
    let (remote, engine) = connected();
    let order = Arc::new(Mutex::new(Vec::new()));
    for n in 0..3 {
        let order = Arc::clone(&order);
        remote.on_change(move || order.lock().unwrap().push(n));
    }

    engine.mark_dirty();
    assert!(wait_for(|| order.lock().unwrap().len() == 3));
    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
}

#[test]
fn test_own_writes_are_reported() {
    let (remote, _engine) = connected();
    let hits = Arc::new(AtomicUsize::new(0));
    let h = Arc::clone(&hits);
    remote.on_change(move || {
        h.fetch_add(1, Ordering::SeqCst);
    });

    remote
        .set_strip_parameter(0, StripProperty::Mute, true)
        .unwrap();
    assert!(wait_for(|| hits.load(Ordering::SeqCst) >= 1));
}

#[test]
fn test_unsubscribe_stops_delivery() {
    let (remote, engine) = connected();
    let kept = Arc::new(AtomicUsize::new(0));
    let dropped = Arc::new(AtomicUsize::new(0));

    let k = Arc::clone(&kept);
    remote.on_change(move || {
        k.fetch_add(1, Ordering::SeqCst);
    });
    let d = Arc::clone(&dropped);
    let subscription = remote.on_change(move || {
        d.fetch_add(1, Ordering::SeqCst);
    });

    assert!(subscription.unsubscribe());
    assert_eq!(remote.listener_count(), 1);

    engine.mark_dirty();
    assert!(wait_for(|| kept.load(Ordering::SeqCst) == 1));
    assert_eq!(dropped.load(Ordering::SeqCst), 0);
}

#[test]
fn test_panicking_listener_does_not_starve_others() {
    let (remote, engine) = connected();
    let hits = Arc::new(AtomicUsize::new(0));
    remote.on_change(|| panic!("listener failure"));
    let h = Arc::clone(&hits);
    remote.on_change(move || {
        h.fetch_add(1, Ordering::SeqCst);
    });

    engine.mark_dirty();
    assert!(wait_for(|| hits.load(Ordering::SeqCst) == 1));

    engine.mark_dirty();
    assert!(wait_for(|| hits.load(Ordering::SeqCst) == 2));
}

#[test]
fn test_polling_stops_after_disconnect() {
    let (remote, engine) = connected();
    assert!(wait_for(|| engine.dirty_polls() > 2));

    remote.disconnect().unwrap();
    let after = engine.dirty_polls();
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(engine.dirty_polls(), after);
}

#[test]
fn test_no_polling_before_connect() {
    let engine = MockEngine::new();
    let _remote = Remote::with_api(engine.clone(), RemoteConfig::default());
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(engine.dirty_polls(), 0);
}
