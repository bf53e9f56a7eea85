use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{stream::SplitSink, SinkExt};
use mangahub_hub::{Sink, SinkError};

/// Write half of an upgraded WebSocket, owned by the hub once registered.
pub struct WsSink {
    tx: SplitSink<WebSocket, Message>,
}

impl WsSink {
    pub fn new(tx: SplitSink<WebSocket, Message>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Sink for WsSink {
    async fn send(&mut self, payload: &str) -> Result<(), SinkError> {
        self.tx
            .send(Message::Text(payload.into()))
            .await
            .map_err(|e| SinkError::Write(e.to_string()))
    }

    async fn close(&mut self) {
        let _ = self.tx.send(Message::Close(None)).await;
        let _ = self.tx.close().await;
    }
}
