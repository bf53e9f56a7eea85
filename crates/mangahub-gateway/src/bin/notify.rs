//! Fire one admin notification at the gateway's UDP port.
//!
//! ```text
//! mangahub-notify --target 127.0.0.1:12345 Berserk volume 42 is out
//! ```

use std::net::SocketAddr;

use clap::Parser;
use mangahub_hub::UdpNotifier;
use tracing::info;

const DEFAULT_TEXT: &str = "Admin added: Chainsaw Man Chapter 1";

#[derive(Parser, Debug)]
#[command(name = "mangahub-notify", version)]
struct Args {
    /// UDP notification port to send to.
    #[arg(long, default_value = "127.0.0.1:12345")]
    target: SocketAddr,

    /// Message text, joined with spaces. Sent verbatim.
    words: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mangahub_notify=info".into()),
        )
        .init();

    let args = Args::parse();
    let text = if args.words.is_empty() {
        DEFAULT_TEXT.to_string()
    } else {
        args.words.join(" ")
    };

    UdpNotifier::new(args.target).send_raw(&text).await?;
    info!(target = %args.target, "notification sent: {}", text);
    Ok(())
}
