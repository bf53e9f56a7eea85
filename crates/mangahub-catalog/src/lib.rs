//! `mangahub-catalog`: the manga catalogue and per-user reading library.

pub mod db;
pub mod error;
pub mod store;
pub mod types;

pub use error::{CatalogError, Result};
pub use store::{CatalogStore, SEARCH_LIMIT};
pub use types::{LibraryEntry, Manga, NewManga};
