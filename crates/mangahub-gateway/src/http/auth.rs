//! POST /auth/register and POST /auth/login.

use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::app::AppState;
use crate::http::{bad_body, user_error, ApiError};

#[derive(Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(req) = body.map_err(bad_body)?;
    let user = state
        .users
        .register(&req.username, &req.password)
        .map_err(user_error)?;
    info!(username = %user.username, "user registered");

    if let Err(e) = state
        .notifier
        .send_raw(&format!("NEW USER: {}", user.username))
        .await
    {
        warn!(error = %e, "new-user notification not sent");
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully", "id": user.id })),
    ))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = body.map_err(bad_body)?;
    let user = state
        .users
        .authenticate(&req.username, &req.password)
        .map_err(user_error)?;
    let token = state.tokens.issue(&user).map_err(user_error)?;
    Ok(Json(json!({ "token": token })))
}
