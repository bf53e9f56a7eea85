//! End-to-end checks for the progress relay over real loopback sockets.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mangahub_core::config::SyncConfig;
use mangahub_core::types::ProgressUpdate;
use mangahub_sync::{send_progress, ProgressHandler, ProgressSyncServer};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

#[derive(Default)]
struct Recorder {
    seen: Mutex<Vec<ProgressUpdate>>,
}

impl Recorder {
    fn seen(&self) -> Vec<ProgressUpdate> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProgressHandler for Recorder {
    async fn on_progress(&self, update: ProgressUpdate) {
        self.seen.lock().unwrap().push(update);
    }
}

async fn start(read_timeout_secs: u64) -> (SocketAddr, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let config = SyncConfig {
        read_timeout_secs,
        ..SyncConfig::default()
    };
    let server = ProgressSyncServer::bind(
        "127.0.0.1:0".parse().unwrap(),
        &config,
        recorder.clone() as Arc<dyn ProgressHandler>,
    )
    .await
    .unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run());
    (addr, recorder)
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(150)).await;
}

#[tokio::test]
async fn one_update_is_handled_once() {
    let (addr, recorder) = start(5).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"{\"username\":\"bob\",\"manga_id\":\"1\",\"chapter\":\"5\"}\n")
        .await
        .unwrap();
    stream.shutdown().await.unwrap();
    settle().await;

    let seen = recorder.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].username, "bob");
    assert_eq!(seen[0].manga_id, "1");
    assert_eq!(seen[0].chapter, "5");
}

#[tokio::test]
async fn second_value_on_same_connection_is_ignored() {
    let (addr, recorder) = start(5).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(
            b"{\"username\":\"bob\",\"chapter\":\"5\"}\n{\"username\":\"eve\",\"chapter\":\"6\"}\n",
        )
        .await
        .unwrap();
    let _ = stream.shutdown().await;
    settle().await;

    let seen = recorder.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].username, "bob");
}

#[tokio::test]
async fn malformed_input_never_reaches_handler() {
    let (addr, recorder) = start(5).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(b"not json at all\n").await.unwrap();
    let _ = stream.shutdown().await;

    let empty = TcpStream::connect(addr).await.unwrap();
    drop(empty);
    settle().await;

    assert!(recorder.seen().is_empty());
}

#[tokio::test]
async fn idle_connection_is_dropped_after_timeout() {
    let (addr, recorder) = start(1).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(b"{\"username\":").await.unwrap();
    tokio::time::sleep(Duration::from_millis(1500)).await;

    // The relay has given up on this connection; finishing the value is too late.
    let _ = stream.write_all(b"\"late\"}\n").await;
    let _ = stream.shutdown().await;
    settle().await;

    assert!(recorder.seen().is_empty());
}

#[tokio::test]
async fn send_progress_round_trip() {
    let (addr, recorder) = start(5).await;

    let update = ProgressUpdate {
        username: "alice".into(),
        manga_id: "one-piece".into(),
        progress: "reading".into(),
        chapter: "1090".into(),
    };
    send_progress(addr, &update).await.unwrap();
    settle().await;

    assert_eq!(recorder.seen(), vec![update]);
}

#[tokio::test]
async fn bind_conflict_is_reported() {
    let (addr, _recorder) = start(5).await;
    let err = ProgressSyncServer::bind(
        addr,
        &SyncConfig::default(),
        Arc::new(mangahub_sync::LogProgressHandler),
    )
    .await
    .err()
    .unwrap();
    assert!(matches!(err, mangahub_sync::SyncError::Bind { .. }));
}
