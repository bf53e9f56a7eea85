//! `mangahub-users`: accounts, password hashing and session tokens.
//!
//! | Piece | Role |
//! |---|---|
//! | [`UserStore`] | SQLite-backed register / authenticate / lookup |
//! | [`PasswordHasher`] | argon2 PHC hashing and verification |
//! | [`TokenService`] | HS256 JWT issue + validate into typed [`Claims`] |

pub mod db;
pub mod error;
pub mod password;
pub mod store;
pub mod token;
pub mod types;

pub use error::{Result, UserError};
pub use password::PasswordHasher;
pub use store::UserStore;
pub use token::{Claims, TokenService};
pub use types::User;
