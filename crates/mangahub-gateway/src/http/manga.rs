use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use mangahub_catalog::Manga;
use serde::Deserialize;

use crate::app::AppState;
use crate::http::{catalog_error, lookup_error, ApiError};

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// GET /manga/{id}: exact id, then fuzzy id/title match, via the lookup service.
pub async fn get_manga(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Manga>, ApiError> {
    state
        .lookup
        .get_manga(&id)
        .await
        .map(Json)
        .map_err(lookup_error)
}

/// GET /manga/search?q=
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Manga>>, ApiError> {
    state
        .lookup
        .search_manga(&query.q)
        .await
        .map(Json)
        .map_err(lookup_error)
}

/// GET /debug/ids: every catalogue id as a bare array.
pub async fn debug_ids(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>, ApiError> {
    state.catalog.list_ids().map(Json).map_err(catalog_error)
}
