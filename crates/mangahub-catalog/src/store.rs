use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, ErrorCode, OptionalExtension};
use tracing::{debug, instrument};

use crate::db::{self, init_db, row_to_entry, row_to_manga, MANGA_COLUMNS};
use crate::error::{CatalogError, Result};
use crate::types::{LibraryEntry, Manga, NewManga};

pub const SEARCH_LIMIT: usize = 50;

/// Catalogue and library persistence over a single SQLite connection.
pub struct CatalogStore {
    db: Mutex<Connection>,
}

impl CatalogStore {
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    /// Open the shared database file with per-connection pragmas applied.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(db::open(path.as_ref())?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::new(Connection::open_in_memory()?)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.db.lock().map_err(|_| CatalogError::LockPoisoned)
    }

    /// Exact id first; otherwise the first fuzzy match on id or title.
    #[instrument(skip(self))]
    pub fn get(&self, id: &str) -> Result<Manga> {
        let db = self.conn()?;
        let exact = db
            .query_row(
                &format!("SELECT {MANGA_COLUMNS} FROM manga WHERE id = ?1"),
                [id],
                row_to_manga,
            )
            .optional()?;
        if let Some(manga) = exact {
            return Ok(manga);
        }

        debug!("no exact id match, trying fuzzy lookup");
        db.query_row(
            &format!(
                "SELECT {MANGA_COLUMNS} FROM manga
                 WHERE id LIKE ?1 OR title LIKE ?1
                 ORDER BY id LIMIT 1"
            ),
            [like_pattern(id)],
            row_to_manga,
        )
        .optional()?
        .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    /// Fuzzy search on id or title, at most [`SEARCH_LIMIT`] rows.
    #[instrument(skip(self))]
    pub fn search(&self, query: &str) -> Result<Vec<Manga>> {
        let db = self.conn()?;
        let mut stmt = db.prepare(&format!(
            "SELECT {MANGA_COLUMNS} FROM manga
             WHERE id LIKE ?1 OR title LIKE ?1
             ORDER BY id LIMIT ?2"
        ))?;
        let rows = stmt.query_map(
            rusqlite::params![like_pattern(query), SEARCH_LIMIT as i64],
            row_to_manga,
        )?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    #[instrument(skip(self), fields(id = %manga.id))]
    pub fn insert(&self, manga: &NewManga) -> Result<()> {
        let db = self.conn()?;
        match db.execute(
            "INSERT INTO manga (id, title, author) VALUES (?1, ?2, ?3)",
            rusqlite::params![manga.id, manga.title, manga.author],
        ) {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                Err(CatalogError::AlreadyExists(manga.id.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    pub fn delete(&self, id: &str) -> Result<()> {
        let db = self.conn()?;
        let removed = db.execute("DELETE FROM manga WHERE id = ?1", [id])?;
        if removed == 0 {
            return Err(CatalogError::NotFound(id.to_string()));
        }
        Ok(())
    }

    pub fn list_ids(&self) -> Result<Vec<String>> {
        let db = self.conn()?;
        let mut stmt = db.prepare("SELECT id FROM manga ORDER BY id")?;
        let ids = stmt.query_map([], |row| row.get::<_, String>(0))?;
        Ok(ids.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Add `manga_id` to the user's library at chapter 0, or update the
    /// status of an existing entry without touching its chapter.
    #[instrument(skip(self))]
    pub fn upsert_library(
        &self,
        user_id: &str,
        manga_id: &str,
        status: &str,
    ) -> Result<LibraryEntry> {
        let db = self.conn()?;
        db.execute(
            "INSERT INTO user_progress (user_id, manga_id, current_chapter, status)
             VALUES (?1, ?2, 0, ?3)
             ON CONFLICT(user_id, manga_id) DO UPDATE SET status = excluded.status",
            rusqlite::params![user_id, manga_id, status],
        )?;
        Ok(db.query_row(
            "SELECT user_id, manga_id, current_chapter, status
             FROM user_progress WHERE user_id = ?1 AND manga_id = ?2",
            rusqlite::params![user_id, manga_id],
            row_to_entry,
        )?)
    }
}

/// `one piece` becomes `%one%piece%`.
fn like_pattern(query: &str) -> String {
    format!("%{}%", query.trim().replace(' ', "%"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spaces_become_wildcards() {
        assert_eq!(like_pattern("one piece"), "%one%piece%");
        assert_eq!(like_pattern(" naruto "), "%naruto%");
    }

    #[test]
    fn file_store_connection_has_pragmas() {
        let path =
            std::env::temp_dir().join(format!("mangahub-catalog-{}.db", std::process::id()));
        let store = CatalogStore::open(&path).unwrap();
        {
            let db = store.conn().unwrap();
            let fk: i64 = db.query_row("PRAGMA foreign_keys", [], |r| r.get(0)).unwrap();
            let mode: String = db.query_row("PRAGMA journal_mode", [], |r| r.get(0)).unwrap();
            assert_eq!(fk, 1);
            assert_eq!(mode, "wal");
        }
        drop(store);
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
        }
    }
}
