use std::path::Path;
use std::str::FromStr;

use mangahub_core::types::UserRole;
use rusqlite::{Connection, Result};

use crate::types::User;

/// Column order every SELECT in this crate uses.
pub(crate) const USER_COLUMNS: &str = "id, username, password_hash, role, created_at";

/// Map a row selected with [`USER_COLUMNS`]. NULLs scan to empty strings.
pub(crate) fn row_to_user(row: &rusqlite::Row<'_>) -> Result<User> {
    let role: Option<String> = row.get(3)?;
    Ok(User {
        id: row.get(0)?,
        username: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        password_hash: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        role: role
            .as_deref()
            .map(UserRole::from_str)
            .and_then(|r| r.ok())
            .unwrap_or_default(),
        created_at: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
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

/// Create the users table. Idempotent; also upgrades tables created before
/// `created_at` existed.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id            TEXT PRIMARY KEY NOT NULL,
            username      TEXT UNIQUE,
            password_hash TEXT,
            role          TEXT NOT NULL DEFAULT 'user',
            created_at    TEXT
        );",
    )?;

    if !has_column(conn, "users", "created_at")? {
        conn.execute_batch("ALTER TABLE users ADD COLUMN created_at TEXT;")?;
    }
    Ok(())
}

fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
    for name in names {
        if name? == column {
            return Ok(true);
        }
    }
    Ok(false)
}
