use std::path::Path;

use rusqlite::{Connection, Result};

use crate::types::{LibraryEntry, Manga};

pub(crate) const MANGA_COLUMNS: &str =
    "id, title, author, genres, status, total_chapters, chapter, description";

/// Map a row selected with [`MANGA_COLUMNS`].
///
/// `genres` is a JSON array in a TEXT column; anything unparsable becomes
/// an empty list.
pub(crate) fn row_to_manga(row: &rusqlite::Row<'_>) -> Result<Manga> {
    let genres: Option<String> = row.get(3)?;
    Ok(Manga {
        id: row.get(0)?,
        title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        author: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        genres: genres
            .and_then(|g| serde_json::from_str(&g).ok())
            .unwrap_or_default(),
        status: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        total_chapters: row.get::<_, Option<i64>>(5)?.unwrap_or_default(),
        chapter: row.get::<_, Option<i64>>(6)?.unwrap_or_default(),
        description: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
    })
}

pub(crate) fn row_to_entry(row: &rusqlite::Row<'_>) -> Result<LibraryEntry> {
    Ok(LibraryEntry {
        user_id: row.get(0)?,
        manga_id: row.get(1)?,
        current_chapter: row.get::<_, Option<i64>>(2)?.unwrap_or_default(),
        status: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
    })
}

/// Settings that SQLite keeps per connection. Every store connection to the
/// shared database file runs these on open.
pub const CONNECTION_PRAGMAS: &str =
    "PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON; PRAGMA busy_timeout=3000;";

/// Open the database file at `path` with [`CONNECTION_PRAGMAS`] applied.
pub fn open(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute_batch(CONNECTION_PRAGMAS)?;
    Ok(conn)
}

/// Create catalogue tables. Safe to call on every startup.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS manga (
            id             TEXT PRIMARY KEY NOT NULL,
            title          TEXT,
            author         TEXT,
            genres         TEXT,  -- JSON array
            status         TEXT,
            total_chapters INTEGER,
            chapter        INTEGER,
            description    TEXT
        );
        CREATE TABLE IF NOT EXISTS user_progress (
            user_id         TEXT NOT NULL,
            manga_id        TEXT NOT NULL,
            current_chapter INTEGER,
            status          TEXT,
            PRIMARY KEY (user_id, manga_id)
        );",
    )
}
