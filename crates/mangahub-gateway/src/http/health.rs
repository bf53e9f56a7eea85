use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::app::AppState;

/// GET /health: liveness probe plus the hub's live client count.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let (status, clients) = match state.hub.stats().await {
        Ok(stats) => ("ok", stats.clients),
        Err(_) => ("degraded", 0),
    };
    Json(json!({
        "status": status,
        "version": env!("CARGO_PKG_VERSION"),
        "clients": clients,
    }))
}
