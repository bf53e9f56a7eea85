//! `mangahub-gateway`: REST API and WebSocket chat front door.
//!
//! Owns no chat state itself: every WebSocket session is handed to the hub
//! through a [`mangahub_hub::HubHandle`] kept in [`app::AppState`].

pub mod app;
pub mod auth;
pub mod http;
pub mod ws;
