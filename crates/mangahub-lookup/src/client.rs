use std::net::SocketAddr;
use std::time::Duration;

use mangahub_catalog::Manga;
use tonic::transport::Channel;
use tonic::Code;

use crate::error::{LookupError, Result};
use crate::proto::{manga_lookup_client::MangaLookupClient, GetMangaRequest, SearchRequest};

/// Gateway-side handle to the lookup service. Cheap to clone; clones share
/// one HTTP/2 channel.
#[derive(Debug, Clone)]
pub struct LookupClient {
    inner: MangaLookupClient<Channel>,
}

impl LookupClient {
    /// Build a client without dialing. The channel connects on first use and
    /// reconnects after failures, so the service may start after the gateway.
    /// Every call is bounded by `timeout`. Needs a Tokio runtime.
    pub fn connect_lazy(addr: SocketAddr, timeout: Duration) -> Result<Self> {
        let channel = Channel::from_shared(format!("http://{addr}"))
            .map_err(|e| LookupError::InvalidTarget(e.to_string()))?
            .connect_timeout(timeout)
            .timeout(timeout)
            .connect_lazy();
        Ok(Self {
            inner: MangaLookupClient::new(channel),
        })
    }

    pub async fn get_manga(&self, id: &str) -> Result<Manga> {
        let request = GetMangaRequest { id: id.to_string() };
        let mut client = self.inner.clone();
        match client.get_manga(request).await {
            Ok(reply) => Ok(reply.into_inner().into()),
            Err(status) if status.code() == Code::NotFound => {
                Err(LookupError::NotFound(id.to_string()))
            }
            Err(status) => Err(status.into()),
        }
    }

    pub async fn search_manga(&self, query: &str) -> Result<Vec<Manga>> {
        let request = SearchRequest {
            query: query.to_string(),
        };
        let mut client = self.inner.clone();
        let reply = client.search_manga(request).await?.into_inner();
        Ok(reply.results.into_iter().map(Manga::from).collect())
    }
}
