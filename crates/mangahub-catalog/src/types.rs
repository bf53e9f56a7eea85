use serde::{Deserialize, Serialize};

/// One catalogue entry. Every column but `id` may be NULL in storage and
/// scans to its empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manga {
    pub id: String,
    pub title: String,
    pub author: String,
    pub genres: Vec<String>,
    pub status: String,
    pub total_chapters: i64,
    pub chapter: i64,
    pub description: String,
}

/// Body of an admin insert.
#[derive(Debug, Clone, Deserialize)]
pub struct NewManga {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub author: String,
}

/// A user's relationship with one manga, keyed on `(user_id, manga_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryEntry {
    pub user_id: String,
    pub manga_id: String,
    pub current_chapter: i64,
    pub status: String,
}
