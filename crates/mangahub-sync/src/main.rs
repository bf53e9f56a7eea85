use std::sync::Arc;

use clap::Parser;
use mangahub_core::config::MangahubConfig;
use mangahub_sync::{LogProgressHandler, ProgressSyncServer};
use tracing::{info, warn};

/// Standalone reading-progress relay.
#[derive(Parser, Debug)]
#[command(name = "mangahub-sync", version)]
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
                .unwrap_or_else(|_| "mangahub_sync=info".into()),
        )
        .init();

    let args = Args::parse();
    let config_path = MangahubConfig::resolve_path(args.config);
    let mut config = MangahubConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        warn!(code = e.code(), "Config load failed ({}), using defaults", e);
        MangahubConfig::default()
    });
    if let Some(port) = args.port {
        config.sync.port = port;
    }

    let addr = config.sync.listen_addr()?;
    // A taken port ends this process; the gateway and hub are unaffected.
    let server =
        ProgressSyncServer::bind(addr, &config.sync, Arc::new(LogProgressHandler)).await?;
    info!("standalone progress sync relay on {}", addr);
    server.run().await;
    Ok(())
}
