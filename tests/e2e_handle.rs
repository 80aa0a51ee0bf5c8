//! E2E tests for the async remote handle
//!
//! Many tasks share one worker; native calls stay serialized and the
//! settle window is awaited on the caller's task.

use std::time::Duration;
use vmremote::mock::MockEngine;
use vmremote::properties::{BusProperty, StripProperty};
use vmremote::{ConnectionState, ParameterAddress, Remote, RemoteConfig, RemoteHandle, Value};

fn spawn() -> (RemoteHandle, MockEngine) {
    let engine = MockEngine::new();
    let config = RemoteConfig {
        poll_interval_ms: 1,
        settle_delay_ms: 0,
        ..Default::default()
    };
    (RemoteHandle::spawn(Remote::with_api(engine.clone(), config)), engine)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_tasks_share_one_session() {
    let (handle, engine) = spawn();
    handle.connect().await.unwrap();

    let mut tasks = Vec::new();
    for index in 0..4usize {
        let handle = handle.clone();
        tasks.push(tokio::spawn(async move {
            let gain = ParameterAddress::strip(index, StripProperty::Gain);
            handle.set(gain.clone(), -(index as f32)).await.unwrap();
            handle.get(gain).await.unwrap()
        }));
    }
    for (index, task) in tasks.into_iter().enumerate() {
        assert_eq!(task.await.unwrap(), Value::Float(-(index as f32)));
    }
    assert_eq!(engine.scripts().len(), 4);
}

#[tokio::test]
async fn test_status_tracks_lifecycle() {
    let (handle, _engine) = spawn();
    assert_eq!(
        handle.status().await.unwrap().state,
        ConnectionState::Initialised
    );

    handle.connect().await.unwrap();
    let status = handle.status().await.unwrap();
    assert_eq!(status.state, ConnectionState::Connected);
    assert!(status.version.is_some());

    handle.disconnect().await.unwrap();
    assert_eq!(
        handle.status().await.unwrap().state,
        ConnectionState::Initialised
    );
}

#[tokio::test]
async fn test_change_stream_sees_writes() {
    let (handle, _engine) = spawn();
    handle.connect().await.unwrap();
    let (_subscription, mut changes) = handle.changes().await.unwrap();

    handle
        .set(ParameterAddress::bus(0, BusProperty::Mute), true)
        .await
        .unwrap();
    let got = tokio::time::timeout(Duration::from_secs(2), changes.recv()).await;
    assert_eq!(got.unwrap(), Some(()));
}
