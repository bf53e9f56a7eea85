//! REST handlers. Every failure is `(StatusCode, Json({"error": ...}))`.

pub mod admin;
pub mod auth;
pub mod health;
pub mod manga;
pub mod users;

use axum::{extract::rejection::JsonRejection, http::StatusCode, Json};
use mangahub_catalog::CatalogError;
use mangahub_lookup::LookupError;
use mangahub_users::UserError;
use serde_json::{json, Value};
use tracing::error;

pub type ApiError = (StatusCode, Json<Value>);

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": message.into() })))
}

/// Malformed or missing JSON bodies are a plain 400.
pub fn bad_body(rejection: JsonRejection) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, rejection.body_text())
}

pub fn user_error(e: UserError) -> ApiError {
    match e {
        UserError::InvalidInput(_) | UserError::AlreadyExists(_) => {
            api_error(StatusCode::BAD_REQUEST, e.to_string())
        }
        UserError::InvalidCredentials => {
            api_error(StatusCode::UNAUTHORIZED, e.to_string())
        }
        UserError::NotFound(_) => api_error(StatusCode::NOT_FOUND, e.to_string()),
        other => {
            error!(error = %other, "user store failure");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

pub fn catalog_error(e: CatalogError) -> ApiError {
    match e {
        CatalogError::NotFound(_) => api_error(StatusCode::NOT_FOUND, "Manga not found"),
        CatalogError::AlreadyExists(_) => api_error(StatusCode::CONFLICT, e.to_string()),
        other => {
            error!(error = %other, "catalog failure");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

/// `NotFound` is a 404; any other lookup failure is a 502.
pub fn lookup_error(e: LookupError) -> ApiError {
    match e {
        LookupError::NotFound(_) => api_error(StatusCode::NOT_FOUND, "Manga not found"),
        other => {
            error!(error = %other, "lookup service call failed");
            api_error(StatusCode::BAD_GATEWAY, "Lookup service unavailable")
        }
    }
}
