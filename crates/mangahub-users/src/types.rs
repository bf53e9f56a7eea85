use mangahub_core::types::UserRole;
use serde::{Deserialize, Serialize};

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// UUID v4, stored as text.
    pub id: String,
    pub username: String,
    /// argon2 PHC string. Never leaves the process.
    #[serde(skip)]
    pub password_hash: String,
    pub role: UserRole,
    /// RFC 3339. Empty for rows written before the column existed.
    pub created_at: String,
}
