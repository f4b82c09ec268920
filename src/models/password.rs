//! Newtypes that keep raw passwords and password hashes from being mixed up.

use std::fmt::Display;

use bcrypt::{hash, verify, BcryptError, DEFAULT_COST};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The minimum number of characters a password must have.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// A password that has been validated, but not yet hashed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPassword(String);

impl RawPassword {
    /// Create a new password from a string.
    ///
    /// # Errors
    /// Returns [Error::InvalidPassword] if the password is shorter than
    /// [MIN_PASSWORD_LENGTH] characters.
    pub fn new(raw_password_string: String) -> Result<Self, Error> {
        if raw_password_string.chars().count() < MIN_PASSWORD_LENGTH {
            Err(Error::InvalidPassword)
        } else {
            Ok(Self(raw_password_string))
        }
    }
}

impl AsRef<str> for RawPassword {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<[u8]> for RawPassword {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// A bcrypt hash of a user's password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hash a validated password.
    ///
    /// # Errors
    /// Returns an error if the underlying hashing library fails.
    pub fn new(raw_password: &RawPassword) -> Result<Self, BcryptError> {
        hash(raw_password, DEFAULT_COST).map(Self)
    }

    /// Create a `PasswordHash` without hashing or validation.
    ///
    /// This is intended for valid hashes coming out of a trusted source such as the
    /// application's database.
    pub fn new_unchecked(password_hash: String) -> Self {
        Self(password_hash)
    }

    /// Check that `raw_password` matches the hashed password.
    pub fn verify(&self, raw_password: &RawPassword) -> Result<bool, BcryptError> {
        verify(raw_password, &self.0)
    }
}

impl Display for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
