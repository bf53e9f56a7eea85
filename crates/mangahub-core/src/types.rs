use serde::{Deserialize, Serialize};
use std::fmt;

/// Sender name stamped on every message that enters through the UDP port.
pub const SYSTEM_BROADCAST_USERNAME: &str = "SYSTEM-BROADCAST";

/// Identity assigned to unauthenticated WebSocket sessions.
pub const GUEST_USER_ID: &str = "GUEST";
pub const GUEST_USERNAME: &str = "Guest_Viewer";

/// One chat frame as it travels over WebSocket.
///
/// Wire: `{ "user_id": "...", "username": "...", "message": "...", "timestamp": 0 }`
///
/// Every field is optional on decode; inbound clients usually send only
/// `message`. The identity fields are always overwritten server-side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub timestamp: i64,
}

impl ChatMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// A message originating from the notification port.
    pub fn system(message: impl Into<String>) -> Self {
        Self {
            username: SYSTEM_BROADCAST_USERNAME.to_string(),
            message: message.into(),
            ..Self::default()
        }
    }

    /// Replace whatever identity the client claimed with the session's own.
    pub fn stamped(mut self, user_id: &str, username: &str) -> Self {
        self.user_id = user_id.to_string();
        self.username = username.to_string();
        self
    }
}

/// Reading-progress snapshot sent to the sync relay, one per connection.
///
/// Wire: `{ "username": "bob", "manga_id": "1", "progress": "", "chapter": "5" }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub manga_id: String,
    #[serde(default)]
    pub progress: String,
    #[serde(default)]
    pub chapter: String,
}

/// User role carried in session tokens: admin > user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    User,
}

impl UserRole {
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::User => write!(f, "user"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "user" => Ok(UserRole::User),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}
