use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed progress frame: {0}")]
    Decode(#[from] serde_json::Error),

    /// Peer closed the connection before sending anything.
    #[error("connection closed without a frame")]
    Empty,

    #[error("frame exceeds {max} bytes")]
    FrameTooLarge { max: usize },

    #[error("no complete frame after {secs}s")]
    Timeout { secs: u64 },
}

pub type Result<T> = std::result::Result<T, SyncError>;
