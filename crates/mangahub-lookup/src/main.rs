use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use mangahub_catalog::CatalogStore;
use mangahub_core::config::MangahubConfig;
use mangahub_lookup::LookupServer;
use tracing::{info, warn};

/// Standalone catalogue lookup service.
#[derive(Parser, Debug)]
#[command(name = "mangahub-lookup", version)]
struct Args {
    /// Path to mangahub.toml (falls back to MANGAHUB_CONFIG).
    #[arg(long)]
    config: Option<String>,

    /// Override the listen port from config.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mangahub_lookup=info".into()),
        )
        .init();

    let args = Args::parse();
    let config_path = MangahubConfig::resolve_path(args.config);
    let mut config = MangahubConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        warn!(code = e.code(), "Config load failed ({}), using defaults", e);
        MangahubConfig::default()
    });
    if let Some(port) = args.port {
        config.lookup.port = port;
    }

    let db_path = &config.database.path;
    if let Some(parent) = Path::new(db_path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    info!(path = %db_path, "opening catalogue database");
    let catalog = Arc::new(CatalogStore::open(db_path)?);

    let addr = config.lookup.listen_addr()?;
    let server = LookupServer::bind(addr, catalog).await?;
    info!("standalone lookup service on {}", addr);
    server.run().await?;
    Ok(())
}
