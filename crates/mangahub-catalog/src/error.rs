use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Manga not found: {0}")]
    NotFound(String),

    #[error("Manga already exists: {0}")]
    AlreadyExists(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("catalog lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, CatalogError>;
