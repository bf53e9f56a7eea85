use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use mangahub_catalog::CatalogStore;
use mangahub_core::config::MangahubConfig;
use mangahub_gateway::app;
use mangahub_hub::{Hub, UdpIngress};
use mangahub_lookup::LookupServer;
use mangahub_sync::{LogProgressHandler, ProgressSyncServer};
use mangahub_users::UserStore;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "mangahub-gateway", version, about = "MangaHub REST + chat gateway")]
struct Args {
    /// Path to mangahub.toml (falls back to MANGAHUB_CONFIG, then ./mangahub.toml).
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "mangahub_gateway=info,mangahub_hub=info,tower_http=debug".into()
            }),
        )
        .init();

    let args = Args::parse();
    let config_path = MangahubConfig::resolve_path(args.config);
    let config = MangahubConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        warn!(code = e.code(), "Config load failed ({}), using defaults", e);
        MangahubConfig::default()
    });

    // one SQLite file; each store opens its own connection with the pragmas applied
    let db_path = config.database.path.clone();
    ensure_parent_dir(&db_path);
    info!(path = %db_path, "opening SQLite database");
    let users = UserStore::open(&db_path)?;
    let catalog = Arc::new(CatalogStore::open(&db_path)?);
    info!("database migrations complete");

    if let (Some(name), Some(password)) = (
        config.auth.admin_username.as_deref(),
        config.auth.admin_password.as_deref(),
    ) {
        users.ensure_admin(name, password)?;
    }
    if config.auth.jwt_secret == "change-me" {
        warn!("auth.jwt_secret is the built-in default; set MANGAHUB_AUTH__JWT_SECRET");
    }

    let (hub, handle) = Hub::new(&config.hub);
    tokio::spawn(hub.run());

    // UDP notification port; the gateway still serves HTTP without it
    match UdpIngress::bind(config.udp.listen_addr()?, handle.clone(), config.udp.buffer_bytes).await
    {
        Ok(ingress) => {
            tokio::spawn(ingress.run());
        }
        Err(e) => error!(error = %e, "UDP notification listener not started"),
    }

    if config.sync.embedded {
        match ProgressSyncServer::bind(
            config.sync.listen_addr()?,
            &config.sync,
            Arc::new(LogProgressHandler),
        )
        .await
        {
            Ok(server) => {
                tokio::spawn(server.run());
            }
            Err(e) => error!(error = %e, "embedded progress relay not started"),
        }
    }

    if config.lookup.embedded {
        match LookupServer::bind(config.lookup.listen_addr()?, Arc::clone(&catalog)).await {
            Ok(server) => {
                tokio::spawn(async move {
                    if let Err(e) = server.run().await {
                        error!(error = %e, "embedded lookup service stopped");
                    }
                });
            }
            Err(e) => error!(error = %e, "embedded lookup service not started"),
        }
    }

    let addr = config.gateway.listen_addr()?;
    let state = Arc::new(app::AppState::new(config, handle, users, catalog)?);
    let router = app::build_router(state);

    info!("MangaHub gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

fn ensure_parent_dir(path: &str) {
    if let Some(parent) = Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}
