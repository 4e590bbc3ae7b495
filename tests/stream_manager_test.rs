//! Stream connection manager lifecycle tests
//!
//! Run on a paused clock so the 5 s retry timer can be stepped through
//! deterministically.

mod common;

use common::{server_error, FakeTransportFactory, ScriptedSignaling};
use cyberfish::domain::shared::value_objects::{AttemptGeneration, WhepEndpoint};
use cyberfish::domain::stream::{
    ConnectivityState, ManagerOptions, StreamConnectionManager, StreamError, StreamEvent,
    StreamState,
};
use std::sync::Arc;
use std::time::Duration;

fn manager(
    factory: &Arc<FakeTransportFactory>,
    signaling: &Arc<ScriptedSignaling>,
) -> StreamConnectionManager {
    StreamConnectionManager::new(
        factory.clone(),
        signaling.clone(),
        ManagerOptions::default(),
    )
}

async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[tokio::test(start_paused = true)]
async fn test_plays_only_after_first_media_frame() {
    let factory = FakeTransportFactory::new();
    let signaling = ScriptedSignaling::answering();
    let manager = manager(&factory, &signaling);
    let mut events = manager.subscribe();

    manager.start().await;
    assert_eq!(manager.state(), StreamState::Negotiating);
    assert_eq!(signaling.exchanges(), 1);

    factory.latest().listener.on_track();
    assert_eq!(manager.state(), StreamState::Negotiating);

    factory.latest().listener.on_media_playing();
    let status = manager.status();
    assert_eq!(status.state, StreamState::Playing);
    assert_eq!(status.overlay, None);
    assert_eq!(status.last_error, None);

    let transitions: Vec<(StreamState, StreamState)> = std::iter::from_fn(|| events.try_recv().ok())
        .filter_map(|event| match event {
            StreamEvent::StateChanged { from, to, .. } => Some((from, to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        transitions,
        vec![
            (StreamState::Idle, StreamState::Negotiating),
            (StreamState::Negotiating, StreamState::Playing),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_answer_without_media_stays_negotiating() {
    let factory = FakeTransportFactory::new();
    let signaling = ScriptedSignaling::answering();
    let manager = manager(&factory, &signaling);

    manager.start().await;
    factory
        .latest()
        .listener
        .on_connectivity_change(ConnectivityState::Connected);
    advance(60_000).await;

    assert_eq!(manager.state(), StreamState::Negotiating);
    assert_eq!(factory.created(), 1);
    assert!(!manager.status().retry_pending);
}

#[tokio::test(start_paused = true)]
async fn test_failing_endpoint_retries_every_five_seconds() {
    let factory = FakeTransportFactory::new();
    let signaling = ScriptedSignaling::failing();
    let manager = manager(&factory, &signaling);

    manager.start().await;
    let status = manager.status();
    assert_eq!(status.state, StreamState::Failed);
    assert_eq!(status.last_error, Some(server_error()));
    assert_eq!(
        status.overlay.as_deref(),
        Some("Unable to connect to drone camera. Retrying...")
    );
    assert!(status.retry_pending);

    advance(4_900).await;
    assert_eq!(signaling.exchanges(), 1);

    advance(200).await;
    assert_eq!(signaling.exchanges(), 2);
    assert_eq!(manager.generation(), AttemptGeneration::new(2));

    advance(10_000).await;
    assert_eq!(signaling.exchanges(), 4);
    assert_eq!(manager.state(), StreamState::Failed);
    assert_eq!(factory.max_open(), 1);

    manager.dispose().await;
}

#[tokio::test(start_paused = true)]
async fn test_rapid_failures_schedule_one_retry() {
    let factory = FakeTransportFactory::new();
    let signaling = ScriptedSignaling::answering();
    let manager = manager(&factory, &signaling);

    manager.start().await;
    let listener = factory.latest().listener.clone();
    listener.on_connectivity_change(ConnectivityState::Disconnected);
    listener.on_connectivity_change(ConnectivityState::Failed);
    manager.schedule_retry();

    assert_eq!(manager.state(), StreamState::Failed);
    assert!(manager.status().retry_pending);

    advance(5_100).await;
    assert_eq!(factory.created(), 2);
    assert_eq!(signaling.exchanges(), 2);
    assert_eq!(manager.state(), StreamState::Negotiating);

    advance(20_000).await;
    assert_eq!(factory.created(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_failure_after_playing_recovers() {
    let factory = FakeTransportFactory::new();
    let signaling = ScriptedSignaling::answering();
    let manager = manager(&factory, &signaling);

    manager.start().await;
    factory.latest().listener.on_media_playing();
    assert_eq!(manager.state(), StreamState::Playing);

    factory
        .latest()
        .listener
        .on_connectivity_change(ConnectivityState::Closed);
    assert_eq!(manager.state(), StreamState::Failed);
    assert!(matches!(
        manager.status().last_error,
        Some(StreamError::Transport(_))
    ));

    advance(5_100).await;
    assert_eq!(manager.state(), StreamState::Negotiating);
    assert!(factory.transport(0).is_closed());
    assert_eq!(factory.open(), 1);

    factory.latest().listener.on_media_playing();
    assert_eq!(manager.state(), StreamState::Playing);
    assert_eq!(manager.status().last_error, None);
}

#[tokio::test(start_paused = true)]
async fn test_stale_callbacks_are_ignored() {
    let factory = FakeTransportFactory::new();
    let signaling = ScriptedSignaling::answering();
    let manager = manager(&factory, &signaling);

    manager.start().await;
    let stale = factory.latest().listener.clone();

    manager.start().await;
    assert!(factory.transport(0).is_closed());
    assert!(!stale.is_current());

    stale.on_media_playing();
    stale.on_connectivity_change(ConnectivityState::Failed);
    let status = manager.status();
    assert_eq!(status.state, StreamState::Negotiating);
    assert!(!status.retry_pending);
    assert_eq!(status.generation, AttemptGeneration::new(2));

    factory.latest().listener.on_media_playing();
    assert_eq!(manager.state(), StreamState::Playing);
}

#[tokio::test(start_paused = true)]
async fn test_restart_keeps_one_transport_open() {
    let factory = FakeTransportFactory::new();
    let signaling = ScriptedSignaling::answering();
    let manager = manager(&factory, &signaling);

    for _ in 0..5 {
        manager.start().await;
        factory.latest().listener.on_media_playing();
    }

    assert_eq!(factory.created(), 5);
    assert_eq!(factory.open(), 1);
    assert_eq!(factory.max_open(), 1);
    assert!((0..4).all(|i| factory.transport(i).is_closed()));
}

#[tokio::test(start_paused = true)]
async fn test_dispose_cancels_pending_retry() {
    let factory = FakeTransportFactory::new();
    let signaling = ScriptedSignaling::failing();
    let manager = manager(&factory, &signaling);

    manager.start().await;
    assert!(manager.status().retry_pending);

    manager.dispose().await;
    manager.dispose().await;

    let status = manager.status();
    assert_eq!(status.state, StreamState::Closed);
    assert!(!status.retry_pending);
    assert!(!status.transport_open);
    assert!(factory.latest().is_closed());

    advance(30_000).await;
    assert_eq!(signaling.exchanges(), 1);

    manager.start().await;
    assert_eq!(manager.state(), StreamState::Closed);
    assert_eq!(factory.created(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_dispose_during_exchange_drops_answer() {
    let factory = FakeTransportFactory::new();
    let signaling = ScriptedSignaling::answering();
    let gate = signaling.hold();
    let manager = manager(&factory, &signaling);

    let attempt = tokio::spawn({
        let manager = manager.clone();
        async move { manager.start().await }
    });
    while signaling.exchanges() == 0 {
        tokio::task::yield_now().await;
    }

    manager.dispose().await;
    gate.notify_one();
    attempt.await.unwrap();

    let status = manager.status();
    assert_eq!(status.state, StreamState::Closed);
    assert!(!status.retry_pending);
    assert!(!status.transport_open);
    assert_eq!(factory.created(), 1);
    assert!(factory.latest().is_closed());
    assert_eq!(factory.latest().answers_applied(), 0);

    advance(30_000).await;
    assert_eq!(signaling.exchanges(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_dispose_during_transport_setup_closes_transport() {
    let factory = FakeTransportFactory::new();
    let gate = factory.hold();
    let signaling = ScriptedSignaling::failing();
    let manager = manager(&factory, &signaling);

    let attempt = tokio::spawn({
        let manager = manager.clone();
        async move { manager.start().await }
    });
    while factory.requested() == 0 {
        tokio::task::yield_now().await;
    }

    manager.dispose().await;
    gate.notify_one();
    attempt.await.unwrap();

    let status = manager.status();
    assert_eq!(status.state, StreamState::Closed);
    assert!(!status.retry_pending);
    assert!(!status.transport_open);
    assert_eq!(factory.created(), 1);
    assert!(factory.latest().is_closed());
    assert_eq!(factory.open(), 0);

    advance(30_000).await;
    assert_eq!(signaling.exchanges(), 0);
}

#[tokio::test]
async fn test_dispose_before_start() {
    let factory = FakeTransportFactory::new();
    let signaling = ScriptedSignaling::answering();
    let manager = manager(&factory, &signaling);

    manager.dispose().await;
    assert_eq!(manager.state(), StreamState::Closed);
    assert_eq!(factory.created(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_malformed_answer_fails_attempt() {
    let factory = FakeTransportFactory::new();
    let signaling = ScriptedSignaling::answering();
    signaling.push(Ok("<html>not sdp</html>".to_string()));
    let manager = manager(&factory, &signaling);
    let mut events = manager.subscribe();

    manager.start().await;
    assert!(matches!(
        manager.status().last_error,
        Some(StreamError::Negotiation(_))
    ));

    let retry = std::iter::from_fn(|| events.try_recv().ok()).find_map(|event| match event {
        StreamEvent::RetryScheduled { delay_ms, .. } => Some(delay_ms),
        _ => None,
    });
    assert_eq!(retry, Some(5_000));

    advance(5_100).await;
    assert_eq!(manager.state(), StreamState::Negotiating);
    assert_eq!(signaling.exchanges(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_retarget_restarts_against_new_endpoint() {
    let factory = FakeTransportFactory::new();
    let signaling = ScriptedSignaling::answering();
    signaling.push(Err(server_error()));
    let manager = manager(&factory, &signaling);

    manager.start().await;
    assert!(manager.status().retry_pending);

    let endpoint = WhepEndpoint::new("192.168.4.1", 8889, WhepEndpoint::DEFAULT_PATH);
    manager.retarget(endpoint.clone()).await;

    assert_eq!(signaling.endpoints(), vec![endpoint]);
    assert_eq!(manager.state(), StreamState::Negotiating);
    assert!(!manager.status().retry_pending);

    advance(10_000).await;
    assert_eq!(signaling.exchanges(), 2);
}
