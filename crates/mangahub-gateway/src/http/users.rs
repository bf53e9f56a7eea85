use std::sync::Arc;
use std::time::Duration;

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use mangahub_core::types::ProgressUpdate;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::app::AppState;
use crate::auth::AuthUser;
use crate::http::{bad_body, catalog_error, ApiError};

const PROGRESS_FORWARD_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Deserialize)]
pub struct LibraryRequest {
    pub manga_id: String,
    pub status: String,
}

/// POST /users/library
pub async fn add_to_library(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    body: Result<Json<LibraryRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = body.map_err(bad_body)?;
    let entry = state
        .catalog
        .upsert_library(&claims.user_id, &req.manga_id, &req.status)
        .map_err(catalog_error)?;
    Ok(Json(json!({ "message": "Library updated", "entry": entry })))
}

/// PUT /users/progress: relay to the sync server under the caller's name.
///
/// Forwarding is best effort; the request succeeds whether or not the
/// relay is reachable.
pub async fn update_progress(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    body: Result<Json<ProgressUpdate>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(mut update) = body.map_err(bad_body)?;
    update.username = claims.username;

    let sent = tokio::time::timeout(
        PROGRESS_FORWARD_TIMEOUT,
        mangahub_sync::send_progress(state.sync_target, &update),
    )
    .await;
    match sent {
        Ok(Ok(())) => debug!(username = %update.username, "progress forwarded"),
        Ok(Err(e)) => warn!(error = %e, target = %state.sync_target, "progress relay unreachable"),
        Err(_) => warn!(target = %state.sync_target, "progress relay timed out"),
    }

    Ok(Json(json!({ "message": "Chapter progress updated" })))
}
