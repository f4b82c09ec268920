//! Defines the data structures, extractors, and response handlers for registering and
//! authenticating users with bearer tokens.

use axum::{
    async_trait,
    body::Body,
    extract::{FromRef, FromRequestParts, Json, State},
    http::{request::Parts, Response, StatusCode},
    response::IntoResponse,
    RequestPartsExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use chrono::{Duration, Utc};
use email_address::EmailAddress;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    config::AppConfig,
    models::{NewUser, PasswordHash, RawPassword, User, UserID},
    stores::UserStore,
    Error,
};

// Code in this module is adapted from
// https://github.com/tokio-rs/axum/blob/main/examples/jwt/src/main.rs

/// How long issued tokens stay valid.
const TOKEN_DURATION_HOURS: i64 = 1;

/// The contents of a JSON Web Token.
#[derive(Serialize, Deserialize)]
pub struct Claims {
    /// The expiry time of the token.
    pub exp: usize,
    /// The time the token was issued.
    pub iat: usize,
    /// The ID of the authenticated user.
    pub sub: UserID,
}

#[async_trait]
impl<S> FromRequestParts<S> for Claims
where
    AppConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AuthError::InvalidToken)?;

        let app_config = parts
            .extract_with_state::<AppConfig, _>(state)
            .await
            .map_err(|_| AuthError::InvalidToken)?;

        let token_data = decode_jwt(bearer.token(), app_config.decoding_key())?;

        Ok(token_data.claims)
    }
}

/// Credentials entered during log-in.
#[derive(Deserialize)]
pub struct Credentials {
    /// Email entered during log-in.
    pub email: EmailAddress,
    /// Password entered during log-in.
    pub password: RawPassword,
}

/// The data entered during registration.
#[derive(Deserialize)]
pub struct RegisterUser {
    /// The email address to register with.
    pub email: EmailAddress,
    /// The display name of the new user.
    pub username: String,
    /// The password to register with.
    pub password: String,
}

/// The public fields of a user, as returned by the API.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// The ID of the user.
    pub id: UserID,
    /// The email address the user registered with.
    pub email: EmailAddress,
    /// The display name of the user.
    pub username: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            email: user.email().clone(),
            username: user.username().to_string(),
        }
    }
}

/// The response to a successful registration or log-in.
#[derive(Serialize, Deserialize)]
pub struct AuthResponse {
    /// A bearer token for authenticating subsequent requests.
    pub token: String,
    /// The registered or logged-in user.
    pub user: UserProfile,
}

/// The errors that may occur while authenticating a user.
#[derive(Debug)]
pub enum AuthError {
    /// The email or password was incorrect.
    WrongCredentials,
    /// The bearer token could not be created.
    TokenCreation,
    /// The bearer token was missing, malformed, or expired.
    InvalidToken,
    /// An unexpected internal error occurred.
    InternalError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response<Body> {
        let (status, error_message) = match self {
            AuthError::WrongCredentials => (StatusCode::UNAUTHORIZED, "Invalid credentials"),
            AuthError::TokenCreation => (StatusCode::INTERNAL_SERVER_ERROR, "Token creation error"),
            AuthError::InvalidToken => (StatusCode::BAD_REQUEST, "Invalid token"),
            AuthError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Handler for registration requests.
///
/// # Errors
///
/// This function will return an error in a few situations.
/// - The username is empty.
/// - The password is too short.
/// - The email is already registered.
pub async fn register(
    State(mut state): State<AppConfig>,
    Json(user_data): Json<RegisterUser>,
) -> Result<(StatusCode, Json<AuthResponse>), Error> {
    let username = user_data.username.trim().to_string();
    if username.is_empty() {
        return Err(Error::EmptyField("username"));
    }

    let password = RawPassword::new(user_data.password)?;
    let password_hash =
        PasswordHash::new(&password).map_err(|error| Error::HashingError(error.to_string()))?;

    let user = state.user_store.create(NewUser {
        email: user_data.email,
        username,
        password_hash,
    })?;

    let token =
        encode_jwt(user.id(), state.encoding_key()).map_err(|_| Error::TokenCreation)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: UserProfile::from(&user),
        }),
    ))
}

/// Handler for log-in requests.
///
/// # Errors
///
/// This function will return an error in a few situations.
/// - The email does not belong to a registered user.
/// - The password is not correct.
/// - An internal error occurred when verifying the password.
pub async fn log_in(
    State(state): State<AppConfig>,
    Json(user_data): Json<Credentials>,
) -> Result<Json<AuthResponse>, AuthError> {
    let user = state
        .user_store
        .get_by_email(&user_data.email)
        .map_err(|error| match error {
            Error::NotFound => AuthError::WrongCredentials,
            _ => {
                tracing::error!("Error matching user: {error}");
                AuthError::InternalError
            }
        })?;

    user.password_hash()
        .verify(&user_data.password)
        .map_err(|error| {
            tracing::error!("Error verifying password: {error}");
            AuthError::InternalError
        })
        .and_then(|password_is_correct| {
            if password_is_correct {
                let token = encode_jwt(user.id(), state.encoding_key())?;

                Ok(Json(AuthResponse {
                    token,
                    user: UserProfile::from(&user),
                }))
            } else {
                Err(AuthError::WrongCredentials)
            }
        })
}

/// Handler for requests for the authenticated user's profile.
///
/// # Errors
///
/// This function will return the status code 404 if the user no longer exists.
pub async fn get_profile(
    State(state): State<AppConfig>,
    claims: Claims,
) -> Result<Json<UserProfile>, Error> {
    let user = state.user_store.get(claims.sub)?;

    Ok(Json(UserProfile::from(&user)))
}

fn encode_jwt(user_id: UserID, encoding_key: &EncodingKey) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = (now + Duration::hours(TOKEN_DURATION_HOURS)).timestamp() as usize;
    let iat = now.timestamp() as usize;
    let claims = Claims {
        exp,
        iat,
        sub: user_id,
    };

    encode(&Header::default(), &claims, encoding_key).map_err(|_| AuthError::TokenCreation)
}

fn decode_jwt(token: &str, decoding_key: &DecodingKey) -> Result<TokenData<Claims>, AuthError> {
    decode(token, decoding_key, &Validation::default()).map_err(|_| AuthError::InvalidToken)
}
