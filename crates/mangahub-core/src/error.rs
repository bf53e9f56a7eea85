use thiserror::Error;

#[derive(Debug, Error)]
pub enum MangahubError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MangahubError {
    /// Short machine-readable code, used in logs and error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            MangahubError::Config(_) => "CONFIG_ERROR",
            MangahubError::Serialization(_) => "SERIALIZATION_ERROR",
            MangahubError::Io(_) => "IO_ERROR",
            MangahubError::InvalidAddress(_) => "INVALID_ADDRESS",
            MangahubError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, MangahubError>;
