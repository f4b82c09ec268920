//! Defines the app level error type and its conversion to JSON error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde_json::json;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A zero, negative, or unrepresentable monetary amount was provided.
    /// The client should try again with a positive amount with at most two
    /// decimal places.
    #[error("{0} is not a valid monetary amount")]
    InvalidAmount(Decimal),

    /// A required text field was missing or empty.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// A month number outside 1-12 was provided.
    #[error("{0} is not a valid month number")]
    InvalidMonth(u32),

    /// The password provided during registration is too short.
    #[error("passwords must be at least 8 characters long")]
    InvalidPassword,

    /// The email address is already registered. The client should try again
    /// with a different email address or log in instead.
    #[error("a user with this email already exists")]
    DuplicateEmail,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    /// Resources owned by another user also produce this error so that
    /// clients cannot probe for other users' data.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// An unexpected error occurred while issuing an auth token.
    #[error("could not create an auth token")]
    TokenCreation,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => Error::SqlError(error),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self {
            Error::InvalidAmount(_)
            | Error::EmptyField(_)
            | Error::InvalidMonth(_)
            | Error::InvalidPassword
            | Error::DuplicateEmail => StatusCode::BAD_REQUEST,
            Error::NotFound => StatusCode::NOT_FOUND,
            // Errors that are not the client's fault are not shown to the client.
            Error::HashingError(_) | Error::TokenCreation | Error::SqlError(_) => {
                tracing::error!("An unexpected error occurred: {}", self);

                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "Internal server error"})),
                )
                    .into_response();
            }
        };

        (status, Json(json!({"error": self.to_string()}))).into_response()
    }
}
