use std::fmt;

use async_trait::async_trait;
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::error::SinkError;

/// Per-client handle. Random, never persisted, unique per connection, so two
/// sessions of the same user are two distinct registry entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(Uuid);

impl ClientId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outbound half of a client transport.
///
/// The hub calls `send` once per broadcast with the already-serialized frame
/// and `close` exactly once when the client leaves the registry.
#[async_trait]
pub trait Sink: Send {
    async fn send(&mut self, payload: &str) -> Result<(), SinkError>;

    async fn close(&mut self);
}

/// A connected broadcast sink plus the identity its session was opened with.
pub struct Client {
    id: ClientId,
    user_id: String,
    username: String,
    sink: Box<dyn Sink>,
    on_close: Option<oneshot::Sender<()>>,
}

impl Client {
    pub fn new(
        user_id: impl Into<String>,
        username: impl Into<String>,
        sink: impl Sink + 'static,
    ) -> Self {
        Self {
            id: ClientId::new(),
            user_id: user_id.into(),
            username: username.into(),
            sink: Box::new(sink),
            on_close: None,
        }
    }

    /// Resolves once the hub has closed this client, whether through
    /// unregister, eviction after a failed write, or hub shutdown. Also
    /// resolves (with an error) if the client is dropped without a close.
    ///
    /// The session owning the read half uses this to stop reading once its
    /// transport is gone. Calling it again replaces the earlier receiver.
    pub fn on_close(&mut self) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        self.on_close = Some(tx);
        rx
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) async fn send(&mut self, payload: &str) -> Result<(), SinkError> {
        self.sink.send(payload).await
    }

    pub(crate) async fn close(&mut self) {
        if let Some(tx) = self.on_close.take() {
            let _ = tx.send(());
        }
        self.sink.close().await;
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}
