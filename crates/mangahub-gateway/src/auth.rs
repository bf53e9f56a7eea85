//! Bearer-token authentication for HTTP and WebSocket routes.
//!
//! The token comes from `Authorization: Bearer <jwt>`; when that header is
//! absent, a `?token=<jwt>` query parameter is accepted so browsers can
//! authenticate a WebSocket handshake. A present but malformed header is
//! rejected outright rather than falling back to the query.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Query},
    http::{request::Parts, HeaderMap, StatusCode, Uri},
};
use mangahub_users::Claims;
use serde::Deserialize;
use tracing::debug;

use crate::app::AppState;
use crate::http::{api_error, ApiError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenProblem {
    Missing,
    MalformedHeader,
}

impl TokenProblem {
    fn message(self) -> &'static str {
        match self {
            TokenProblem::Missing => "No token provided",
            TokenProblem::MalformedHeader => "Invalid Authorization header format",
        }
    }
}

#[derive(Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Pull the raw token out of a request, header first.
pub fn raw_token(headers: &HeaderMap, uri: &Uri) -> Result<String, TokenProblem> {
    if headers.contains_key("authorization") {
        return match extract_bearer(headers).map(str::trim) {
            Some(t) if !t.is_empty() => Ok(t.to_string()),
            _ => Err(TokenProblem::MalformedHeader),
        };
    }

    Query::<TokenQuery>::try_from_uri(uri)
        .ok()
        .and_then(|Query(q)| q.token)
        .filter(|t| !t.is_empty())
        .ok_or(TokenProblem::Missing)
}

/// Any authenticated user. Rejects with 401 before the handler runs.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = raw_token(&parts.headers, &parts.uri)
            .map_err(|p| api_error(StatusCode::UNAUTHORIZED, p.message()))?;

        state.tokens.validate(&token).map(AuthUser).map_err(|e| {
            debug!(error = %e, "token rejected");
            api_error(StatusCode::UNAUTHORIZED, "Invalid token")
        })
    }
}

/// An authenticated user holding the admin role; 403 for everyone else.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Claims);

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;
        if !claims.is_admin() {
            return Err(api_error(StatusCode::FORBIDDEN, "Admins only"));
        }
        Ok(AdminUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(auth: Option<&str>) -> HeaderMap {
        let mut h = HeaderMap::new();
        if let Some(v) = auth {
            h.insert("authorization", HeaderValue::from_str(v).unwrap());
        }
        h
    }

    #[test]
    fn bearer_header_wins() {
        let uri: Uri = "/ws/chat?token=from-query".parse().unwrap();
        assert_eq!(
            raw_token(&headers(Some("Bearer from-header")), &uri).unwrap(),
            "from-header"
        );
    }

    #[test]
    fn query_fallback_when_header_absent() {
        let uri: Uri = "/ws/chat?token=abc.def.ghi".parse().unwrap();
        assert_eq!(raw_token(&headers(None), &uri).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn malformed_header_does_not_fall_back() {
        let uri: Uri = "/ws/chat?token=abc".parse().unwrap();
        assert_eq!(
            raw_token(&headers(Some("Token abc")), &uri),
            Err(TokenProblem::MalformedHeader)
        );
        assert_eq!(
            raw_token(&headers(Some("Bearer ")), &uri),
            Err(TokenProblem::MalformedHeader)
        );
    }

    #[test]
    fn nothing_supplied() {
        let uri: Uri = "/ws/chat".parse().unwrap();
        assert_eq!(raw_token(&headers(None), &uri), Err(TokenProblem::Missing));
        let uri: Uri = "/ws/chat?token=".parse().unwrap();
        assert_eq!(raw_token(&headers(None), &uri), Err(TokenProblem::Missing));
    }
}
