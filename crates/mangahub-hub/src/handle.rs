use mangahub_core::types::ChatMessage;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

use crate::client::{Client, ClientId};
use crate::error::{HubError, Result};
use crate::hub::HubCommand;

/// Outcome of one fan-out pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    /// Clients that accepted the payload.
    pub delivered: usize,
    /// Clients whose write failed and were removed during this pass.
    pub evicted: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HubStats {
    pub clients: usize,
}

/// Producer side of the hub. Cheap to clone; one per adapter task.
///
/// Every method only enqueues a command, so callers never touch the
/// registry. Methods that return data wait for the hub to reach that
/// command in its total order.
#[derive(Clone)]
pub struct HubHandle {
    tx: mpsc::Sender<HubCommand>,
}

impl HubHandle {
    pub(crate) fn new(tx: mpsc::Sender<HubCommand>) -> Self {
        Self { tx }
    }

    /// Hand a client over to the hub. On failure the client is closed here.
    pub async fn register(&self, client: Client) -> Result<ClientId> {
        let id = client.id();
        if let Err(mpsc::error::SendError(cmd)) = self.tx.send(HubCommand::Register(client)).await {
            if let HubCommand::Register(mut client) = cmd {
                client.close().await;
            }
            return Err(HubError::Closed);
        }
        Ok(id)
    }

    /// Request removal. Removing an unknown or already-evicted id is a no-op.
    pub async fn unregister(&self, id: ClientId) -> Result<()> {
        self.send(HubCommand::Unregister(id)).await
    }

    /// Enqueue a broadcast without waiting for delivery.
    pub async fn broadcast(&self, message: ChatMessage) -> Result<()> {
        self.send(HubCommand::Broadcast {
            message,
            report: None,
        })
        .await
    }

    /// Enqueue a broadcast and wait until every client has been attempted.
    pub async fn broadcast_with_report(&self, message: ChatMessage) -> Result<DeliveryReport> {
        let (tx, rx) = oneshot::channel();
        self.send(HubCommand::Broadcast {
            message,
            report: Some(tx),
        })
        .await?;
        rx.await.map_err(|_| HubError::Closed)
    }

    pub async fn stats(&self) -> Result<HubStats> {
        let (tx, rx) = oneshot::channel();
        self.send(HubCommand::Stats(tx)).await?;
        rx.await.map_err(|_| HubError::Closed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    async fn send(&self, cmd: HubCommand) -> Result<()> {
        self.tx.send(cmd).await.map_err(|_| HubError::Closed)
    }
}
