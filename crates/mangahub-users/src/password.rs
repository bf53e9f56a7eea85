use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Argon2,
};

use crate::error::{Result, UserError};

/// argon2id with the crate's default parameters.
#[derive(Default, Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash with a fresh random salt; returns the PHC string.
    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| UserError::PasswordHash(e.to_string()))
    }

    /// `Ok(false)` on mismatch; `Err` only when the stored hash is unreadable.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;
        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(UserError::PasswordHash(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn right_password_verifies() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash("hunter22").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(hasher.verify("hunter22", &hash).unwrap());
    }

    #[test]
    fn wrong_password_is_rejected() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash("hunter22").unwrap();
        assert!(!hasher.verify("hunter23", &hash).unwrap());
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let hasher = PasswordHasher::new();
        assert_ne!(hasher.hash("pw1234").unwrap(), hasher.hash("pw1234").unwrap());
    }

    #[test]
    fn garbage_hash_is_an_error() {
        let hasher = PasswordHasher::new();
        assert!(matches!(
            hasher.verify("pw", "not-a-phc-string"),
            Err(UserError::PasswordHash(_))
        ));
    }
}
