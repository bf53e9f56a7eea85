use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mangahub_core::config::SyncConfig;
use mangahub_core::types::ProgressUpdate;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::decode::read_one;
use crate::error::{Result, SyncError};
use crate::handler::ProgressHandler;

/// TCP accept loop for progress updates. One task per connection, one value
/// per task.
pub struct ProgressSyncServer {
    listener: TcpListener,
    handler: Arc<dyn ProgressHandler>,
    max_frame_bytes: usize,
    read_timeout: Duration,
}

impl ProgressSyncServer {
    pub async fn bind(
        addr: SocketAddr,
        config: &SyncConfig,
        handler: Arc<dyn ProgressHandler>,
    ) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| SyncError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        Ok(Self {
            listener,
            handler,
            max_frame_bytes: config.max_frame_bytes,
            read_timeout: Duration::from_secs(config.read_timeout_secs),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept forever. Accept errors are logged and skipped.
    pub async fn run(self) {
        let addr = self
            .listener
            .local_addr()
            .map(|a| a.to_string())
            .unwrap_or_default();
        info!(addr = %addr, "progress sync server listening");

        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(r) => r,
                Err(e) => {
                    warn!(error = %e, "accept failed");
                    continue;
                }
            };

            let handler = Arc::clone(&self.handler);
            let max = self.max_frame_bytes;
            let limit = self.read_timeout;
            tokio::spawn(async move {
                handle_sync(stream, peer, handler, max, limit).await;
            });
        }
    }
}

/// Read one update, run the handler, drop the connection. Nothing is
/// written back on any path, including failure.
async fn handle_sync(
    mut stream: TcpStream,
    peer: SocketAddr,
    handler: Arc<dyn ProgressHandler>,
    max_frame_bytes: usize,
    read_timeout: Duration,
) {
    let decoded = match tokio::time::timeout(
        read_timeout,
        read_one::<ProgressUpdate, _>(&mut stream, max_frame_bytes),
    )
    .await
    {
        Ok(r) => r,
        Err(_) => Err(SyncError::Timeout {
            secs: read_timeout.as_secs(),
        }),
    };

    match decoded {
        Ok(update) => handler.on_progress(update).await,
        Err(e) => debug!(peer = %peer, error = %e, "progress frame dropped"),
    }
}
