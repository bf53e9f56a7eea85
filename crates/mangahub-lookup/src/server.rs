use std::net::SocketAddr;
use std::sync::Arc;

use mangahub_catalog::CatalogStore;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tracing::info;

use crate::error::{LookupError, Result};
use crate::proto::manga_lookup_server::MangaLookupServer;
use crate::service::LookupService;

/// gRPC listener for [`LookupService`]. Binding is separate from serving so
/// callers learn about a taken port before spawning, and tests can read the
/// ephemeral port back.
pub struct LookupServer {
    listener: TcpListener,
    catalog: Arc<CatalogStore>,
}

impl LookupServer {
    pub async fn bind(addr: SocketAddr, catalog: Arc<CatalogStore>) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| LookupError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        Ok(Self { listener, catalog })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until the transport fails.
    pub async fn run(self) -> Result<()> {
        let addr = self.local_addr()?;
        info!(addr = %addr, "lookup service listening");
        tonic::transport::Server::builder()
            .add_service(MangaLookupServer::new(LookupService::new(self.catalog)))
            .serve_with_incoming(TcpListenerStream::new(self.listener))
            .await?;
        Ok(())
    }
}
