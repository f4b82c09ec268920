//! Implements a SQLite backed user store.

use std::sync::{Arc, Mutex};

use email_address::EmailAddress;
use rusqlite::{Connection, Row};

use crate::{
    db::{CreateTable, MapRow},
    models::{NewUser, PasswordHash, User, UserID},
    stores::UserStore,
    Error,
};

/// Stores users in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteUserStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteUserStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl UserStore for SQLiteUserStore {
    /// Create a new user in the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DuplicateEmail] if the email is already registered,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn create(&mut self, new_user: NewUser) -> Result<User, Error> {
        let connection = self.connection.lock().unwrap();

        connection.execute(
            "INSERT INTO user (email, username, password) VALUES (?1, ?2, ?3)",
            (
                new_user.email.to_string(),
                &new_user.username,
                new_user.password_hash.to_string(),
            ),
        )?;

        let id = UserID::new(connection.last_insert_rowid());

        Ok(User::new(
            id,
            new_user.email,
            new_user.username,
            new_user.password_hash,
        ))
    }

    /// Retrieve a user in the database by their `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid user,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, id: UserID) -> Result<User, Error> {
        let user = self
            .connection
            .lock()
            .unwrap()
            .prepare("SELECT id, email, username, password FROM user WHERE id = :id")?
            .query_row(&[(":id", &id.as_i64())], Self::map_row)?;

        Ok(user)
    }

    /// Retrieve a user in the database by their `email` address.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if no user registered with `email`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get_by_email(&self, email: &EmailAddress) -> Result<User, Error> {
        let user = self
            .connection
            .lock()
            .unwrap()
            .prepare("SELECT id, email, username, password FROM user WHERE email = :email")?
            .query_row(&[(":email", &email.to_string())], Self::map_row)?;

        Ok(user)
    }
}

impl CreateTable for SQLiteUserStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS user (
                    id INTEGER PRIMARY KEY,
                    email TEXT UNIQUE NOT NULL,
                    username TEXT NOT NULL,
                    password TEXT NOT NULL
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteUserStore {
    type ReturnType = User;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = UserID::new(row.get(offset)?);

        let raw_email: String = row.get(offset + 1)?;
        let email = EmailAddress::new_unchecked(raw_email);

        let username = row.get(offset + 2)?;
        let password_hash = PasswordHash::new_unchecked(row.get(offset + 3)?);

        Ok(User::new(id, email, username, password_hash))
    }
}

#[cfg(test)]
mod sqlite_user_store_tests {
    use std::str::FromStr;
    use std::sync::{Arc, Mutex};

    use email_address::EmailAddress;
    use rusqlite::Connection;

    use crate::{
        db::initialize,
        models::{NewUser, PasswordHash, UserID},
        stores::UserStore,
        Error,
    };

    use super::SQLiteUserStore;

    fn get_store() -> SQLiteUserStore {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        SQLiteUserStore::new(Arc::new(Mutex::new(connection)))
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: EmailAddress::from_str(email).unwrap(),
            username: "tester".to_string(),
            password_hash: PasswordHash::new_unchecked("definitelyahash".to_string()),
        }
    }

    #[test]
    fn create_user_succeeds() {
        let mut store = get_store();

        let user = store.create(new_user("hello@world.com")).unwrap();

        assert!(user.id().as_i64() > 0);
        assert_eq!(user.email().to_string(), "hello@world.com");
        assert_eq!(user.username(), "tester");
    }

    #[test]
    fn create_user_fails_on_duplicate_email() {
        let mut store = get_store();
        store.create(new_user("hello@world.com")).unwrap();

        let duplicate = store.create(new_user("hello@world.com"));

        assert_eq!(duplicate, Err(Error::DuplicateEmail));
    }

    #[test]
    fn get_user_by_id_succeeds() {
        let mut store = get_store();
        let inserted = store.create(new_user("foo@bar.baz")).unwrap();

        let selected = store.get(inserted.id()).unwrap();

        assert_eq!(selected, inserted);
    }

    #[test]
    fn get_user_fails_on_invalid_id() {
        let store = get_store();

        assert_eq!(store.get(UserID::new(42)), Err(Error::NotFound));
    }

    #[test]
    fn get_user_by_email_succeeds() {
        let mut store = get_store();
        let inserted = store.create(new_user("foo@bar.baz")).unwrap();

        let selected = store.get_by_email(inserted.email()).unwrap();

        assert_eq!(selected, inserted);
    }

    #[test]
    fn get_user_by_email_fails_on_unknown_email() {
        let store = get_store();
        let email = EmailAddress::from_str("nobody@nowhere.com").unwrap();

        assert_eq!(store.get_by_email(&email), Err(Error::NotFound));
    }
}
