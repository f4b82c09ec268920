//! Defines the user store trait.

use email_address::EmailAddress;

use crate::{
    models::{NewUser, User, UserID},
    Error,
};

/// Handles the creation and retrieval of users.
pub trait UserStore {
    /// Create a new user in the store.
    ///
    /// # Errors
    /// Returns [Error::DuplicateEmail] if a user with the same email already exists.
    fn create(&mut self, new_user: NewUser) -> Result<User, Error>;

    /// Retrieve a user by their ID.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no user has the given ID.
    fn get(&self, id: UserID) -> Result<User, Error>;

    /// Retrieve a user by their email address.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no user registered with the given email.
    fn get_by_email(&self, email: &EmailAddress) -> Result<User, Error>;
}
