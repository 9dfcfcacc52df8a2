//! Integration tests for the callback surface over the scripted transport.
//!
//! These exercise the lifecycle the way a pool drives it: callbacks fired
//! from spawned tasks, many operations in flight, statistics polled on the
//! side.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use lifeline::adapter::IoErrorClassifier;
use lifeline::domain::{ConnectionSettings, TargetAddress};
use lifeline::error::{LifecycleError, TransportError};
use lifeline::lifecycle::{ChannelLifecycle, RetryBackoff};
use lifeline::port::{Connection, Lifecycle};
use lifeline::registry::ConnectionRegistry;
use lifeline::testkit;
use lifeline::testkit::transport::{refused, MockConnection, ScriptedTransport};

type Outcome = Result<Arc<MockConnection>, LifecycleError>;

fn lifecycle(transport: ScriptedTransport) -> ChannelLifecycle<ScriptedTransport> {
    ChannelLifecycle::new(
        testkit::config::target(),
        testkit::config::settings(),
        transport,
        ConnectionRegistry::new(),
        Arc::new(IoErrorClassifier),
    )
}

/// Lifecycle for `host` that registers into `registry`.
fn sharing(
    registry: &ConnectionRegistry<MockConnection>,
    host: &str,
) -> ChannelLifecycle<ScriptedTransport> {
    ChannelLifecycle::new(
        TargetAddress::new(host, 9),
        testkit::config::settings(),
        ScriptedTransport::new(),
        registry.clone(),
        Arc::new(IoErrorClassifier),
    )
}

/// Issue `n` callback creates; every callback sends its outcome on the channel.
fn create_many(
    lifecycle: &ChannelLifecycle<ScriptedTransport>,
    n: usize,
) -> (mpsc::UnboundedReceiver<Outcome>, Arc<AtomicU32>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let calls = Arc::new(AtomicU32::new(0));
    for _ in 0..n {
        let tx = tx.clone();
        let calls = Arc::clone(&calls);
        Lifecycle::create(
            lifecycle,
            Box::new(move |result| {
                calls.fetch_add(1, Ordering::SeqCst);
                let _ = tx.send(result);
            }),
        );
    }
    (rx, calls)
}

// ---------------------------------------------------------------------------
// Exactly-once callbacks
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn every_create_callback_fires_once() {
    let results = (0..100)
        .map(|i| if i % 3 == 0 { Err(refused()) } else { Ok(()) })
        .collect();
    let lifecycle = lifecycle(ScriptedTransport::new().with_connect_results(results));

    let (mut rx, calls) = create_many(&lifecycle, 100);

    let mut ok = 0;
    let mut retriable = 0;
    for _ in 0..100 {
        match rx.recv().await.unwrap() {
            Ok(_) => ok += 1,
            Err(e) if e.is_retriable() => retriable += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(ok, 66);
    assert_eq!(retriable, 34);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 100);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn every_destroy_callback_fires_once() {
    let lifecycle = lifecycle(ScriptedTransport::new());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let calls = Arc::new(AtomicU32::new(0));

    let mut conns = Vec::new();
    for _ in 0..10 {
        conns.push(lifecycle.create().await.unwrap());
    }
    // Half of them are already gone by the time the pool destroys them.
    for conn in conns.iter().step_by(2) {
        conn.drop_peer();
    }

    for conn in conns.iter().cloned() {
        let tx = tx.clone();
        let calls = Arc::clone(&calls);
        Lifecycle::destroy(
            &lifecycle,
            conn,
            false,
            Box::new(move |result| {
                calls.fetch_add(1, Ordering::SeqCst);
                let _ = tx.send(result.is_ok());
            }),
        );
    }
    drop(tx);

    let mut delivered = 0;
    while let Some(ok) = rx.recv().await {
        assert!(ok);
        delivered += 1;
    }
    assert_eq!(delivered, 10);
    assert_eq!(calls.load(Ordering::SeqCst), 10);

    let closes: u32 = conns.iter().map(|c| c.close_count()).sum();
    assert_eq!(closes, 5);
    assert!(conns.iter().all(|c| !c.is_open()));
}

// ---------------------------------------------------------------------------
// Statistics under concurrency
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stats_polled_during_creates_sum_to_total() {
    const N: usize = 500;
    let lifecycle = lifecycle(ScriptedTransport::new().with_delay(Duration::from_millis(2)));

    let seen = Arc::new(AtomicU64::new(0));
    let stop = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let poller = {
        let lifecycle = lifecycle.clone();
        let seen = Arc::clone(&seen);
        let stop = Arc::clone(&stop);
        tokio::spawn(async move {
            while !stop.load(Ordering::SeqCst) {
                seen.fetch_add(Lifecycle::stats(&lifecycle).sample_count, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
    };

    let (mut rx, _) = create_many(&lifecycle, N);
    for _ in 0..N {
        rx.recv().await.unwrap().unwrap();
    }

    stop.store(true, Ordering::SeqCst);
    poller.await.unwrap();
    let total = seen.load(Ordering::SeqCst) + lifecycle.stats().sample_count;
    assert_eq!(total, N as u64);
}

#[tokio::test]
async fn stats_percentiles_are_ordered() {
    let lifecycle = lifecycle(ScriptedTransport::new().with_delay(Duration::from_millis(3)));

    for _ in 0..20 {
        lifecycle.create().await.unwrap();
    }

    let stats = lifecycle.stats();
    assert_eq!(stats.sample_count, 20);
    assert!(stats.min >= 3);
    assert!(stats.min <= stats.p50);
    assert!(stats.p50 <= stats.p95);
    assert!(stats.p95 <= stats.p99);
    assert!(stats.p99 <= stats.max);
    assert!(stats.average >= stats.min as f64 && stats.average <= stats.max as f64);
}

// ---------------------------------------------------------------------------
// Retry loop as a pool would run it
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pool_style_retry_reaches_success() {
    let transport = ScriptedTransport::new()
        .with_connect_results(vec![Err(refused()), Err(refused()), Err(refused())]);
    let counter = transport.counter();
    let lifecycle = lifecycle(transport);
    let mut backoff = RetryBackoff::new(testkit::config::backoff());

    let conn = loop {
        match lifecycle.create().await {
            Ok(conn) => break conn,
            Err(e) if e.is_retriable() => tokio::time::sleep(backoff.next_delay()).await,
            Err(e) => panic!("unexpected error: {e}"),
        }
    };

    assert_eq!(backoff.attempts(), 3);
    assert_eq!(counter.load(Ordering::SeqCst), 4);
    assert!(lifecycle.validate_get(&conn));
    assert_eq!(lifecycle.stats().sample_count, 1);
}

#[tokio::test]
async fn registry_outlives_dropped_handles() {
    let lifecycle = lifecycle(ScriptedTransport::new());

    let kept = lifecycle.create().await.unwrap();
    drop(lifecycle.create().await.unwrap());

    assert_eq!(lifecycle.registry().len(), 2);
    assert_eq!(lifecycle.registry().live().len(), 1);
    assert_eq!(lifecycle.registry().prune(), 1);
    assert!(lifecycle.registry().contains(&kept));
}

#[tokio::test]
async fn shared_registry_keeps_connections_from_every_lifecycle() {
    let registry = ConnectionRegistry::new();
    let a = sharing(&registry, "a.invalid");
    let b = sharing(&registry, "b.invalid");

    // Each transport numbers its connections from 1.
    let from_a = a.create().await.unwrap();
    let from_b = b.create().await.unwrap();
    assert_eq!(from_a.id(), from_b.id());

    assert_eq!(registry.len(), 2);
    assert!(registry.contains(&from_a));
    assert!(registry.contains(&from_b));

    assert_eq!(registry.close_all().await, 2);
    assert!(!from_a.is_open());
    assert!(!from_b.is_open());
}

#[tokio::test]
async fn shared_registry_destroy_only_removes_own_connection() {
    let registry = ConnectionRegistry::new();
    let a = sharing(&registry, "a.invalid");
    let b = sharing(&registry, "b.invalid");

    let from_a = a.create().await.unwrap();
    let from_b = b.create().await.unwrap();
    a.destroy(from_a, false).await.unwrap();

    assert_eq!(registry.len(), 1);
    assert!(registry.contains(&from_b));
}

// ---------------------------------------------------------------------------
// Connect timeout
// ---------------------------------------------------------------------------

#[tokio::test]
async fn connect_timeout_is_classified_as_timeout() {
    let settings = ConnectionSettings {
        connect_timeout: Some(Duration::from_millis(20)),
        ..ConnectionSettings::default()
    };
    let lifecycle = ChannelLifecycle::new(
        testkit::config::target(),
        settings,
        ScriptedTransport::new().with_delay(Duration::from_secs(5)),
        ConnectionRegistry::new(),
        Arc::new(IoErrorClassifier),
    );

    let (tx, rx) = tokio::sync::oneshot::channel();
    Lifecycle::create(
        &lifecycle,
        Box::new(move |result| {
            let _ = tx.send(result);
        }),
    );
    let err = rx.await.unwrap().unwrap_err();

    assert!(!err.is_retriable());
    assert!(
        matches!(err, LifecycleError::Connect(TransportError::Timeout(_))),
        "expected timeout, got {err:?}"
    );
}
