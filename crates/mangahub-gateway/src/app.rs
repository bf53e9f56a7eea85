use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use mangahub_catalog::CatalogStore;
use mangahub_core::config::MangahubConfig;
use mangahub_core::MangahubError;
use mangahub_hub::{HubHandle, UdpNotifier};
use mangahub_lookup::LookupClient;
use mangahub_users::{TokenService, UserStore};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Central shared state, passed as `Arc<AppState>` to all Axum handlers.
pub struct AppState {
    pub config: MangahubConfig,
    pub hub: HubHandle,
    pub users: UserStore,
    /// Admin writes, the library and `/debug/ids`. Reads go through `lookup`.
    pub catalog: Arc<CatalogStore>,
    pub lookup: LookupClient,
    /// Signs tokens at login and verifies them on every protected route.
    pub tokens: TokenService,
    pub notifier: UdpNotifier,
    pub sync_target: SocketAddr,
}

impl AppState {
    /// Must run inside a Tokio runtime: the lookup channel is created here.
    pub fn new(
        config: MangahubConfig,
        hub: HubHandle,
        users: UserStore,
        catalog: Arc<CatalogStore>,
    ) -> mangahub_core::Result<Self> {
        let tokens = TokenService::new(&config.auth.jwt_secret, config.auth.token_ttl_secs);
        let notifier = UdpNotifier::new(config.udp.notify_addr()?);
        let sync_target = config.sync.target_addr()?;
        let lookup = LookupClient::connect_lazy(
            config.lookup.target_addr()?,
            Duration::from_millis(config.lookup.timeout_ms),
        )
        .map_err(|e| MangahubError::InvalidAddress(e.to_string()))?;
        Ok(Self {
            config,
            hub,
            users,
            catalog,
            lookup,
            tokens,
            notifier,
            sync_target,
        })
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    use crate::http::{admin, auth, health, manga, users};
    use crate::ws::connection;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/manga/search", get(manga::search))
        .route("/manga/{id}", get(manga::get_manga))
        .route("/debug/ids", get(manga::debug_ids))
        .route("/users/library", post(users::add_to_library))
        .route("/users/progress", put(users::update_progress))
        .route("/admin/add-manga", post(admin::add_manga))
        .route("/admin/manga/{id}", delete(admin::delete_manga))
        .route("/ws/guest", get(connection::guest_handler))
        .route("/ws/chat", get(connection::chat_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
