use std::time::Duration;

use mangahub_core::{config::HubConfig, types::ChatMessage};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::client::{Client, ClientId};
use crate::error::SinkError;
use crate::handle::{DeliveryReport, HubHandle, HubStats};
use crate::registry::Registry;

/// Everything a producer can ask of the hub. All variants travel through the
/// same queue, which is what gives them a single total order.
pub(crate) enum HubCommand {
    Register(Client),
    Unregister(ClientId),
    Broadcast {
        message: ChatMessage,
        report: Option<oneshot::Sender<DeliveryReport>>,
    },
    Stats(oneshot::Sender<HubStats>),
}

/// Single-consumer coordinator that owns the registry.
pub struct Hub {
    receiver: mpsc::Receiver<HubCommand>,
    registry: Registry,
    write_timeout: Duration,
}

impl Hub {
    /// Build a hub and the handle producers use to reach it.
    /// Nothing is processed until [`Hub::run`] is spawned.
    pub fn new(config: &HubConfig) -> (Self, HubHandle) {
        let (tx, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let hub = Self {
            receiver,
            registry: Registry::new(),
            write_timeout: Duration::from_millis(config.write_timeout_ms),
        };
        (hub, HubHandle::new(tx))
    }

    /// Drain commands until every handle is dropped, then close whatever
    /// clients are still registered.
    pub async fn run(mut self) {
        info!("hub started");
        while let Some(command) = self.receiver.recv().await {
            match command {
                HubCommand::Register(client) => self.register(client).await,
                HubCommand::Unregister(id) => self.unregister(id).await,
                HubCommand::Broadcast { message, report } => {
                    let outcome = self.broadcast(&message).await;
                    if let Some(tx) = report {
                        let _ = tx.send(outcome);
                    }
                }
                HubCommand::Stats(tx) => {
                    let _ = tx.send(HubStats {
                        clients: self.registry.len(),
                    });
                }
            }
        }

        let remaining: Vec<Client> = self.registry.drain().collect();
        for mut client in remaining {
            Self::close(&mut client, self.write_timeout).await;
        }
        info!("hub stopped, all handles dropped");
    }

    async fn register(&mut self, client: Client) {
        let id = client.id();
        let username = client.username().to_string();
        match self.registry.insert(client) {
            Ok(()) => info!(
                client_id = %id,
                username = %username,
                clients = self.registry.len(),
                "client registered"
            ),
            Err(mut dup) => {
                warn!(client_id = %id, "duplicate registration rejected");
                Self::close(&mut dup, self.write_timeout).await;
            }
        }
    }

    async fn unregister(&mut self, id: ClientId) {
        match self.registry.remove(&id) {
            Some(mut client) => {
                Self::close(&mut client, self.write_timeout).await;
                info!(
                    client_id = %id,
                    clients = self.registry.len(),
                    "client unregistered"
                );
            }
            // Already evicted by a failed write.
            None => debug!(client_id = %id, "unregister for unknown client ignored"),
        }
    }

    async fn broadcast(&mut self, message: &ChatMessage) -> DeliveryReport {
        let payload = match serde_json::to_string(message) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "chat message serialization failed, dropped");
                return DeliveryReport::default();
            }
        };

        let limit = self.write_timeout;
        let mut delivered = 0;
        let mut failed = Vec::new();
        for client in self.registry.iter_mut() {
            match Self::write(client, &payload, limit).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(client_id = %client.id(), error = %e, "write failed, evicting client");
                    failed.push(client.id());
                }
            }
        }

        for id in &failed {
            if let Some(mut client) = self.registry.remove(id) {
                Self::close(&mut client, limit).await;
            }
        }

        debug!(
            from = %message.username,
            delivered,
            evicted = failed.len(),
            "broadcast complete"
        );
        DeliveryReport {
            delivered,
            evicted: failed.len(),
        }
    }

    async fn write(client: &mut Client, payload: &str, limit: Duration) -> Result<(), SinkError> {
        match tokio::time::timeout(limit, client.send(payload)).await {
            Ok(result) => result,
            Err(_) => Err(SinkError::Timeout {
                ms: limit.as_millis() as u64,
            }),
        }
    }

    async fn close(client: &mut Client, limit: Duration) {
        if tokio::time::timeout(limit, client.close()).await.is_err() {
            debug!(client_id = %client.id(), "close timed out, dropping transport");
        }
    }
}
