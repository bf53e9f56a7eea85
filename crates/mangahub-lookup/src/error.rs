use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Manga not found: {0}")]
    NotFound(String),

    #[error("invalid lookup target: {0}")]
    InvalidTarget(String),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// Any non-`NOT_FOUND` status returned by the service.
    #[error("lookup call failed: {0}")]
    Status(#[from] tonic::Status),
}

pub type Result<T> = std::result::Result<T, LookupError>;
