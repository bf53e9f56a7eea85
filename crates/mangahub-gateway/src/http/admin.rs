use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use mangahub_catalog::NewManga;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::app::AppState;
use crate::auth::AdminUser;
use crate::http::{api_error, bad_body, catalog_error, ApiError};

/// POST /admin/add-manga: insert, then announce over the UDP port.
pub async fn add_manga(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    body: Result<Json<NewManga>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(manga) = body.map_err(bad_body)?;
    if manga.id.trim().is_empty() || manga.title.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "id and title are required"));
    }

    state.catalog.insert(&manga).map_err(catalog_error)?;
    info!(id = %manga.id, admin = %admin.username, "manga added");

    if let Err(e) = state
        .notifier
        .notify_admin(&format!("New Manga Added: {}", manga.title))
        .await
    {
        warn!(error = %e, "admin notification not sent");
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Manga added", "id": manga.id })),
    ))
}

/// DELETE /admin/manga/{id}
pub async fn delete_manga(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.catalog.delete(&id).map_err(catalog_error)?;
    info!(id = %id, admin = %admin.username, "manga deleted");
    Ok(Json(json!({ "message": "Manga deleted", "id": id })))
}
