use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use mangahub_core::types::UserRole;
use rusqlite::{Connection, ErrorCode, OptionalExtension};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::{self, init_db, row_to_user, USER_COLUMNS};
use crate::error::{Result, UserError};
use crate::password::PasswordHasher;
use crate::types::User;

pub const MIN_USERNAME_CHARS: usize = 3;
pub const MIN_PASSWORD_CHARS: usize = 6;

/// Account persistence over a single SQLite connection.
pub struct UserStore {
    db: Mutex<Connection>,
    hasher: PasswordHasher,
}

impl UserStore {
    /// Wrap an open connection, creating the table if needed.
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            db: Mutex::new(conn),
            hasher: PasswordHasher::new(),
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
        self.db.lock().map_err(|_| UserError::LockPoisoned)
    }

    /// Create a regular user. The username is trimmed before validation.
    #[instrument(skip(self, password))]
    pub fn register(&self, username: &str, password: &str) -> Result<User> {
        self.create(username, password, UserRole::User)
    }

    #[instrument(skip(self, password))]
    pub fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        let user = self
            .get_by_username(username.trim())?
            .ok_or(UserError::InvalidCredentials)?;
        if user.password_hash.is_empty() || !self.hasher.verify(password, &user.password_hash)? {
            return Err(UserError::InvalidCredentials);
        }
        Ok(user)
    }

    #[instrument(skip(self))]
    pub fn get_by_id(&self, id: &str) -> Result<Option<User>> {
        let db = self.conn()?;
        Ok(db
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                [id],
                row_to_user,
            )
            .optional()?)
    }

    #[instrument(skip(self))]
    pub fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let db = self.conn()?;
        Ok(db
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
                [username],
                row_to_user,
            )
            .optional()?)
    }

    /// Make sure `username` exists with the admin role. An existing account
    /// is promoted and keeps its password.
    #[instrument(skip(self, password))]
    pub fn ensure_admin(&self, username: &str, password: &str) -> Result<User> {
        if let Some(mut user) = self.get_by_username(username.trim())? {
            if !user.role.is_admin() {
                self.conn()?.execute(
                    "UPDATE users SET role = ?1 WHERE id = ?2",
                    rusqlite::params![UserRole::Admin.to_string(), user.id],
                )?;
                user.role = UserRole::Admin;
                info!(username = %user.username, "promoted existing user to admin");
            }
            return Ok(user);
        }
        let user = self.create(username, password, UserRole::Admin)?;
        info!(username = %user.username, "bootstrap admin created");
        Ok(user)
    }

    fn create(&self, username: &str, password: &str, role: UserRole) -> Result<User> {
        let username = username.trim();
        if username.chars().count() < MIN_USERNAME_CHARS {
            return Err(UserError::InvalidInput(format!(
                "username must be at least {MIN_USERNAME_CHARS} characters"
            )));
        }
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(UserError::InvalidInput(format!(
                "password must be at least {MIN_PASSWORD_CHARS} characters"
            )));
        }

        // Hash outside the lock.
        let password_hash = self.hasher.hash(password)?;
        let user = User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            password_hash,
            role,
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        let db = self.conn()?;
        let inserted = db.execute(
            "INSERT INTO users (id, username, password_hash, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                user.id,
                user.username,
                user.password_hash,
                user.role.to_string(),
                user.created_at
            ],
        );
        match inserted {
            Ok(_) => Ok(user),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                Err(UserError::AlreadyExists(user.username))
            }
            Err(e) => Err(UserError::Database(e)),
        }
    }
}
