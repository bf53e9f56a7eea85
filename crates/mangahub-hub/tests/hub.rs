// Behaviour of the fan-out coordinator under register / unregister /
// broadcast traffic, driven through the public handle only.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mangahub_core::config::HubConfig;
use mangahub_core::types::ChatMessage;
use mangahub_hub::{Client, Hub, HubError, HubHandle, Sink, SinkError};

#[derive(Clone, Default)]
struct Tally {
    received: Arc<Mutex<Vec<String>>>,
    attempts: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
    closed: Arc<AtomicUsize>,
}

impl Tally {
    fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }

    fn closes(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

struct RecordingSink(Tally);

#[async_trait::async_trait]
impl Sink for RecordingSink {
    async fn send(&mut self, payload: &str) -> Result<(), SinkError> {
        self.0.attempts.fetch_add(1, Ordering::SeqCst);
        if self.0.fail.load(Ordering::SeqCst) {
            return Err(SinkError::Write("simulated reset".into()));
        }
        self.0.received.lock().unwrap().push(payload.to_string());
        Ok(())
    }

    async fn close(&mut self) {
        self.0.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Never completes a write; stands in for a peer that stopped reading.
struct StalledSink;

#[async_trait::async_trait]
impl Sink for StalledSink {
    async fn send(&mut self, _payload: &str) -> Result<(), SinkError> {
        std::future::pending::<()>().await;
        Ok(())
    }

    async fn close(&mut self) {}
}

fn spawn_hub() -> HubHandle {
    spawn_hub_with(HubConfig::default())
}

fn spawn_hub_with(config: HubConfig) -> HubHandle {
    let (hub, handle) = Hub::new(&config);
    tokio::spawn(hub.run());
    handle
}

fn client(user_id: &str, tally: &Tally) -> Client {
    Client::new(user_id, user_id, RecordingSink(tally.clone()))
}

#[tokio::test]
async fn both_clients_receive_identical_payload() {
    let hub = spawn_hub();
    let (a, b) = (Tally::default(), Tally::default());
    hub.register(client("a", &a)).await.unwrap();
    hub.register(client("b", &b)).await.unwrap();

    let report = hub.broadcast_with_report(ChatMessage::new("hi")).await.unwrap();

    assert_eq!(report.delivered, 2);
    assert_eq!(report.evicted, 0);
    let expected = r#"{"user_id":"","username":"","message":"hi","timestamp":0}"#;
    assert_eq!(a.received(), vec![expected.to_string()]);
    assert_eq!(a.received(), b.received());
}

#[tokio::test]
async fn one_attempt_per_registered_client() {
    let hub = spawn_hub();
    let tallies: Vec<Tally> = (0..5).map(|_| Tally::default()).collect();
    for (i, p) in tallies.iter().enumerate() {
        hub.register(client(&format!("u{i}"), p)).await.unwrap();
    }

    hub.broadcast_with_report(ChatMessage::new("m")).await.unwrap();

    for p in &tallies {
        assert_eq!(p.attempts.load(Ordering::SeqCst), 1);
    }
}

#[tokio::test]
async fn failed_write_evicts_before_next_broadcast() {
    let hub = spawn_hub();
    let a = Tally::default();
    a.fail.store(true, Ordering::SeqCst);
    hub.register(client("a", &a)).await.unwrap();

    let first = hub.broadcast_with_report(ChatMessage::new("x")).await.unwrap();
    assert_eq!(first.delivered, 0);
    assert_eq!(first.evicted, 1);
    assert!(a.received().is_empty());
    assert_eq!(a.closes(), 1);

    // Even if the peer would accept writes now, it is gone for good.
    a.fail.store(false, Ordering::SeqCst);
    let second = hub.broadcast_with_report(ChatMessage::new("y")).await.unwrap();
    assert_eq!(second.delivered, 0);
    assert_eq!(a.attempts.load(Ordering::SeqCst), 1);
    assert_eq!(hub.stats().await.unwrap().clients, 0);
}

#[tokio::test]
async fn eviction_fires_close_signal() {
    let hub = spawn_hub();
    let a = Tally::default();
    a.fail.store(true, Ordering::SeqCst);
    let mut c = client("a", &a);
    let closed = c.on_close();
    hub.register(c).await.unwrap();

    hub.broadcast_with_report(ChatMessage::new("x")).await.unwrap();

    tokio::time::timeout(Duration::from_secs(1), closed)
        .await
        .expect("eviction must signal the session")
        .unwrap();
}

#[tokio::test]
async fn unregister_fires_close_signal_once_removed() {
    let hub = spawn_hub();
    let a = Tally::default();
    let mut c = client("a", &a);
    let mut closed = c.on_close();
    let id = hub.register(c).await.unwrap();

    hub.broadcast_with_report(ChatMessage::new("x")).await.unwrap();
    assert!(closed.try_recv().is_err());

    hub.unregister(id).await.unwrap();
    hub.stats().await.unwrap();
    assert!(closed.try_recv().is_ok());
}

#[tokio::test]
async fn failing_client_does_not_affect_healthy_one() {
    let hub = spawn_hub();
    let (bad, good) = (Tally::default(), Tally::default());
    bad.fail.store(true, Ordering::SeqCst);
    hub.register(client("bad", &bad)).await.unwrap();
    hub.register(client("good", &good)).await.unwrap();

    hub.broadcast_with_report(ChatMessage::new("1")).await.unwrap();
    hub.broadcast_with_report(ChatMessage::new("2")).await.unwrap();

    assert_eq!(good.received().len(), 2);
    assert_eq!(bad.attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unregister_unknown_client_is_noop() {
    let hub = spawn_hub();
    let a = Tally::default();
    hub.register(client("a", &a)).await.unwrap();

    let stray = Client::new("ghost", "ghost", RecordingSink(Tally::default()));
    let stray_id = stray.id();
    drop(stray);
    hub.unregister(stray_id).await.unwrap();

    assert_eq!(hub.stats().await.unwrap().clients, 1);
    hub.broadcast_with_report(ChatMessage::new("still here"))
        .await
        .unwrap();
    assert_eq!(a.received().len(), 1);
}

#[tokio::test]
async fn unregister_after_eviction_closes_once() {
    let hub = spawn_hub();
    let a = Tally::default();
    a.fail.store(true, Ordering::SeqCst);
    let id = hub.register(client("a", &a)).await.unwrap();

    hub.broadcast_with_report(ChatMessage::new("x")).await.unwrap();
    hub.unregister(id).await.unwrap();
    hub.stats().await.unwrap();

    assert_eq!(a.closes(), 1);
}

#[tokio::test]
async fn unregister_closes_transport_and_stops_delivery() {
    let hub = spawn_hub();
    let a = Tally::default();
    let id = hub.register(client("a", &a)).await.unwrap();

    hub.unregister(id).await.unwrap();
    hub.broadcast_with_report(ChatMessage::new("late")).await.unwrap();

    assert_eq!(a.closes(), 1);
    assert!(a.received().is_empty());
}

#[tokio::test]
async fn same_user_twice_is_two_entries() {
    let hub = spawn_hub();
    let (tab1, tab2) = (Tally::default(), Tally::default());
    hub.register(client("alice", &tab1)).await.unwrap();
    hub.register(client("alice", &tab2)).await.unwrap();

    let report = hub.broadcast_with_report(ChatMessage::new("hey")).await.unwrap();
    assert_eq!(report.delivered, 2);
}

#[tokio::test]
async fn concurrent_broadcasts_share_one_order() {
    let hub = spawn_hub();
    let tallies: Vec<Tally> = (0..4).map(|_| Tally::default()).collect();
    for (i, p) in tallies.iter().enumerate() {
        hub.register(client(&format!("u{i}"), p)).await.unwrap();
    }

    let mut tasks = Vec::new();
    for i in 0..50 {
        let hub = hub.clone();
        tasks.push(tokio::spawn(async move {
            hub.broadcast(ChatMessage::new(format!("msg-{i}"))).await
        }));
    }
    for t in tasks {
        t.await.unwrap().unwrap();
    }
    // Stats sits behind every broadcast in the queue.
    hub.stats().await.unwrap();

    let reference = tallies[0].received();
    assert_eq!(reference.len(), 50);
    for p in &tallies[1..] {
        assert_eq!(p.received(), reference);
    }
}

#[tokio::test]
async fn registration_racing_broadcasts_is_never_half_applied() {
    let hub = spawn_hub();
    let early = Tally::default();
    hub.register(client("early", &early)).await.unwrap();

    let late = Tally::default();
    let mut tasks = Vec::new();
    for i in 0..20 {
        let hub = hub.clone();
        tasks.push(tokio::spawn(async move {
            hub.broadcast(ChatMessage::new(format!("{i}"))).await
        }));
    }
    let reg = {
        let hub = hub.clone();
        let c = client("late", &late);
        tokio::spawn(async move { hub.register(c).await })
    };
    for t in tasks {
        t.await.unwrap().unwrap();
    }
    reg.await.unwrap().unwrap();
    hub.stats().await.unwrap();

    // The late client sees exactly the suffix of the order after its join.
    let all = early.received();
    let seen = late.received();
    assert_eq!(all.len(), 20);
    assert!(all.ends_with(&seen));
}

#[tokio::test]
async fn stalled_sink_is_evicted_after_timeout() {
    let hub = spawn_hub_with(HubConfig {
        queue_capacity: 16,
        write_timeout_ms: 50,
    });
    let healthy = Tally::default();
    hub.register(Client::new("slow", "slow", StalledSink))
        .await
        .unwrap();
    hub.register(client("ok", &healthy)).await.unwrap();

    let report = tokio::time::timeout(
        Duration::from_secs(2),
        hub.broadcast_with_report(ChatMessage::new("ping")),
    )
    .await
    .expect("hub must not hang on a stalled sink")
    .unwrap();

    assert_eq!(report.delivered, 1);
    assert_eq!(report.evicted, 1);
    assert_eq!(hub.stats().await.unwrap().clients, 1);
}

#[tokio::test]
async fn dropping_every_handle_closes_remaining_clients() {
    let (hub, handle) = Hub::new(&HubConfig::default());
    let task = tokio::spawn(hub.run());
    let a = Tally::default();
    handle.register(client("a", &a)).await.unwrap();
    drop(handle);

    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("hub exits once handles are gone")
        .unwrap();
    assert_eq!(a.closes(), 1);
}

#[tokio::test]
async fn register_on_stopped_hub_closes_the_client() {
    let (hub, handle) = Hub::new(&HubConfig::default());
    drop(hub);

    let a = Tally::default();
    let err = handle.register(client("a", &a)).await.unwrap_err();
    assert!(matches!(err, HubError::Closed));
    assert_eq!(a.closes(), 1);
    assert!(handle.is_closed());
}
