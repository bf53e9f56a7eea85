use async_trait::async_trait;
use mangahub_core::types::ProgressUpdate;
use tracing::info;

/// Side effect run once per decoded update.
#[async_trait]
pub trait ProgressHandler: Send + Sync {
    async fn on_progress(&self, update: ProgressUpdate);
}

/// Default handler: log the update and forget it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgressHandler;

#[async_trait]
impl ProgressHandler for LogProgressHandler {
    async fn on_progress(&self, update: ProgressUpdate) {
        info!(
            username = %update.username,
            manga_id = %update.manga_id,
            chapter = %update.chapter,
            "user {} is on chapter {}",
            update.username,
            update.chapter
        );
    }
}
