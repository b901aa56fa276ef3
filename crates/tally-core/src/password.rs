//! Password validation and hashing for user accounts.
//!
//! `ValidatedPassword` holds a plain-text password that passed the length rule.
//! `PasswordHash` is the salted bcrypt hash that gets stored.

use std::fmt::Display;

use crate::error::{Error, Result};

/// Shortest password accepted at registration
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// A password that has been validated, but not yet hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// Validate a raw password.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] if the password is shorter than
    /// [`MIN_PASSWORD_LENGTH`] characters.
    pub fn new(raw: &str) -> Result<Self> {
        if raw.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(Error::InvalidData(format!(
                "Password must be at least {} characters long",
                MIN_PASSWORD_LENGTH
            )));
        }
        Ok(Self(raw.to_string()))
    }
}

impl Display for ValidatedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", "*".repeat(8))
    }
}

/// A salted and hashed password.
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordHash(String);

impl PasswordHash {
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash a validated password with the given bcrypt `cost`.
    pub fn new(password: ValidatedPassword, cost: u32) -> Result<Self> {
        bcrypt::hash(&password.0, cost)
            .map(Self)
            .map_err(|e| Error::Password(e.to_string()))
    }

    /// Validate and hash in one step.
    pub fn from_raw_password(raw: &str, cost: u32) -> Result<Self> {
        Self::new(ValidatedPassword::new(raw)?, cost)
    }

    /// Wrap a hash loaded from the database.
    pub fn new_unchecked(raw_hash: &str) -> Self {
        Self(raw_hash.to_string())
    }

    /// Check `raw` against this hash.
    ///
    /// A malformed stored hash is an error, not a mismatch.
    pub fn verify(&self, raw: &str) -> Result<bool> {
        bcrypt::verify(raw, &self.0).map_err(|e| Error::Password(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    #[test]
    fn test_rejects_short_password() {
        assert!(matches!(
            ValidatedPassword::new("12345"),
            Err(Error::InvalidData(_))
        ));
        assert!(ValidatedPassword::new("123456").is_ok());
    }

    #[test]
    fn test_display_hides_password() {
        let password = ValidatedPassword::new("hunter22").unwrap();
        assert_eq!(password.to_string(), "********");
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = PasswordHash::from_raw_password("correct horse", TEST_COST).unwrap();
        assert!(hash.verify("correct horse").unwrap());
        assert!(!hash.verify("wrong horse").unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = PasswordHash::from_raw_password("samepass", TEST_COST).unwrap();
        let b = PasswordHash::from_raw_password("samepass", TEST_COST).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_malformed_hash_errors() {
        let hash = PasswordHash::new_unchecked("not-a-bcrypt-hash");
        assert!(hash.verify("whatever").is_err());
    }
}
