use std::sync::Arc;

use mangahub_catalog::{CatalogError, CatalogStore};
use tonic::{Request, Response, Status};
use tracing::{debug, error};

use crate::proto::{
    manga_lookup_server::MangaLookup, GetMangaRequest, MangaRecord, SearchRequest, SearchResponse,
};

/// `MangaLookup` backed by the shared catalogue store.
pub struct LookupService {
    catalog: Arc<CatalogStore>,
}

impl LookupService {
    pub fn new(catalog: Arc<CatalogStore>) -> Self {
        Self { catalog }
    }
}

#[tonic::async_trait]
impl MangaLookup for LookupService {
    async fn get_manga(
        &self,
        request: Request<GetMangaRequest>,
    ) -> Result<Response<MangaRecord>, Status> {
        let id = request.into_inner().id;
        debug!(id = %id, "GetManga");
        let manga = self.catalog.get(&id).map_err(to_status)?;
        Ok(Response::new(manga.into()))
    }

    async fn search_manga(
        &self,
        request: Request<SearchRequest>,
    ) -> Result<Response<SearchResponse>, Status> {
        let query = request.into_inner().query;
        debug!(query = %query, "SearchManga");
        let found = self.catalog.search(&query).map_err(to_status)?;
        Ok(Response::new(SearchResponse {
            results: found.into_iter().map(MangaRecord::from).collect(),
        }))
    }
}

fn to_status(e: CatalogError) -> Status {
    match e {
        CatalogError::NotFound(_) => Status::not_found(e.to_string()),
        other => {
            error!(error = %other, "catalogue query failed");
            Status::internal("catalogue unavailable")
        }
    }
}
