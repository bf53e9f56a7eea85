//! UDP notification port.
//!
//! Other processes (the gateway's admin routes, the `mangahub-notify` CLI)
//! fire plain-text datagrams at this port; each one becomes a chat broadcast
//! from `SYSTEM-BROADCAST`. One-way: nothing is ever sent back.

use std::net::SocketAddr;

use mangahub_core::types::ChatMessage;
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

use crate::error::{HubError, Result};
use crate::handle::HubHandle;

pub const ADMIN_NOTIFICATION_PREFIX: &str = "ADMIN NOTIFICATION: ";

/// Listener that turns datagrams into hub broadcasts.
pub struct UdpIngress {
    socket: UdpSocket,
    hub: HubHandle,
    buffer_bytes: usize,
}

impl UdpIngress {
    /// Bind the notification socket. Fails fast if the port is taken.
    pub async fn bind(addr: SocketAddr, hub: HubHandle, buffer_bytes: usize) -> Result<Self> {
        let socket = UdpSocket::bind(addr).await.map_err(|source| HubError::Bind {
            addr: addr.to_string(),
            source,
        })?;
        Ok(Self {
            socket,
            hub,
            buffer_bytes: buffer_bytes.max(1),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Receive loop. Read errors are logged and skipped; the loop ends only
    /// once the hub is gone.
    pub async fn run(self) {
        let addr = self
            .socket
            .local_addr()
            .map(|a| a.to_string())
            .unwrap_or_default();
        info!(addr = %addr, "UDP notification listener started");

        // Longer datagrams are cut to the buffer length by the kernel.
        let mut buf = vec![0u8; self.buffer_bytes];
        loop {
            let (n, peer) = match self.socket.recv_from(&mut buf).await {
                Ok(r) => r,
                Err(e) => {
                    warn!(error = %e, "UDP read error");
                    continue;
                }
            };

            let text = String::from_utf8_lossy(&buf[..n]).into_owned();
            debug!(peer = %peer, bytes = n, "UDP datagram received");

            if self.hub.broadcast(ChatMessage::system(text)).await.is_err() {
                info!("hub closed, UDP listener stopping");
                break;
            }
        }
    }
}

/// Sending side of the notification port. Fire and forget.
#[derive(Debug, Clone)]
pub struct UdpNotifier {
    target: SocketAddr,
}

impl UdpNotifier {
    pub fn new(target: SocketAddr) -> Self {
        Self { target }
    }

    /// Send `"ADMIN NOTIFICATION: <text>"`.
    pub async fn notify_admin(&self, text: &str) -> Result<()> {
        let line = format!("{ADMIN_NOTIFICATION_PREFIX}{text}");
        self.send_raw(&line).await
    }

    /// Send `text` verbatim as a single datagram.
    pub async fn send_raw(&self, text: &str) -> Result<()> {
        let local: SocketAddr = if self.target.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };
        let socket = UdpSocket::bind(local).await?;
        socket.send_to(text.as_bytes(), self.target).await?;
        debug!(target = %self.target, bytes = text.len(), "UDP notification sent");
        Ok(())
    }
}
