//! Defines a user of the application and its supporting types.

use std::fmt::Display;

use email_address::EmailAddress;
use serde::{Deserialize, Serialize};

use crate::models::PasswordHash;

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile
/// time errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserID(i64);

impl UserID {
    /// Create a user ID from a raw integer.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// The ID as an integer, e.g. for use in SQL queries.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: UserID,
    email: EmailAddress,
    username: String,
    password_hash: PasswordHash,
}

impl User {
    /// Create a new `User`.
    ///
    /// Note that this does *not* add the user to the application database.
    pub fn new(
        id: UserID,
        email: EmailAddress,
        username: String,
        password_hash: PasswordHash,
    ) -> Self {
        Self {
            id,
            email,
            username,
            password_hash,
        }
    }

    /// The ID of the user.
    pub fn id(&self) -> UserID {
        self.id
    }

    /// The email address the user registered with.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// The display name the user registered with.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The hash of the user's password.
    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }
}

/// The data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// The email address the user is registering with.
    pub email: EmailAddress,
    /// The display name of the user.
    pub username: String,
    /// The hash of the user's password.
    pub password_hash: PasswordHash,
}
