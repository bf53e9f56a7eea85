use std::net::SocketAddr;

use mangahub_core::types::ProgressUpdate;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::error::Result;

/// Dial the relay, write one update, hang up. The relay never answers.
pub async fn send_progress(addr: SocketAddr, update: &ProgressUpdate) -> Result<()> {
    let mut stream = TcpStream::connect(addr).await?;
    let mut frame = serde_json::to_vec(update)?;
    frame.push(b'\n');
    stream.write_all(&frame).await?;
    stream.shutdown().await?;
    Ok(())
}
