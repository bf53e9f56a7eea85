//! Shared building blocks for every MangaHub service: layered configuration,
//! the top-level error type, and the wire types that cross process
//! boundaries (chat frames, progress updates, user roles).

pub mod config;
pub mod error;
pub mod types;

pub use config::MangahubConfig;
pub use error::{MangahubError, Result};
pub use types::{ChatMessage, ProgressUpdate, UserRole};
