//! Implements the struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{DecodingKey, EncodingKey};
use rusqlite::Connection;

use crate::{
    auth::AuthError,
    db,
    stores::sqlite::{
        SQLiteMonthlyDataStore, SQLiteNotificationStore, SQLiteTargetStore,
        SQLiteTransactionStore, SQLiteUserStore,
    },
    Error,
};

#[derive(Clone)]
struct JwtKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

/// The state of the REST server: the keys for signing bearer tokens and the stores for
/// the domain models, all sharing one SQLite connection.
#[derive(Clone)]
pub struct AppConfig {
    jwt_keys: JwtKeys,
    /// The store for registered users.
    pub user_store: SQLiteUserStore,
    /// The store for logged transactions.
    pub transaction_store: SQLiteTransactionStore,
    /// The store for budget targets.
    pub target_store: SQLiteTargetStore,
    /// The store for per-month aggregate figures.
    pub monthly_data_store: SQLiteMonthlyDataStore,
    /// The store for notifications.
    pub notification_store: SQLiteNotificationStore,
}

impl AppConfig {
    /// Create a new [AppConfig] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain
    /// models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_connection: Connection, jwt_secret: &str) -> Result<Self, Error> {
        db::initialize(&db_connection)?;

        let connection = Arc::new(Mutex::new(db_connection));

        Ok(Self {
            jwt_keys: JwtKeys {
                encoding_key: EncodingKey::from_secret(jwt_secret.as_ref()),
                decoding_key: DecodingKey::from_secret(jwt_secret.as_ref()),
            },
            user_store: SQLiteUserStore::new(connection.clone()),
            transaction_store: SQLiteTransactionStore::new(connection.clone()),
            target_store: SQLiteTargetStore::new(connection.clone()),
            monthly_data_store: SQLiteMonthlyDataStore::new(connection.clone()),
            notification_store: SQLiteNotificationStore::new(connection),
        })
    }

    /// The encoding key for JWTs.
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.jwt_keys.encoding_key
    }

    /// The decoding key for JWTs.
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.jwt_keys.decoding_key
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AppConfig
where
    Self: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(_: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_ref(state))
    }
}
