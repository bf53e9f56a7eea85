use thiserror::Error;

#[derive(Debug, Error)]
pub enum HubError {
    /// The coordinator task has stopped; nothing more can be submitted.
    #[error("hub is closed")]
    Closed,

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure reported by a [`Sink`](crate::Sink) write. Any variant evicts the client.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink is closed")]
    Closed,

    #[error("write failed: {0}")]
    Write(String),

    #[error("write timed out after {ms}ms")]
    Timeout { ms: u64 },
}

pub type Result<T> = std::result::Result<T, HubError>;
