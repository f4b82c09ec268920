//! Coinkeep is a personal finance tracking backend.
//!
//! This library provides a JSON REST API for registering and authenticating users,
//! logging income and expense transactions, setting per-category budget targets, and
//! viewing monthly aggregates and notifications.
//!
//! Budget targets track a progress counter against the user's transactions; the rules
//! that keep the two consistent live in the [reconcile] module.

use std::{env, env::VarError, time::Duration};

use axum_server::Handle;
use tokio::signal;

pub mod auth;
mod config;
mod db;
mod error;
pub mod models;
pub mod reconcile;
mod routes;
pub mod stores;

pub use config::AppConfig;
pub use error::Error;
pub use routes::build_router;

/// Get a port number from the environment variable `env_key` if set, otherwise return
/// `default_port`.
///
/// # Panics
/// This function may panic if the environment variable `env_key` is not valid unicode
/// or cannot be parsed as an integer.
pub fn parse_port_or_default(env_key: &str, default_port: u16) -> u16 {
    let port_string = match env::var(env_key) {
        Ok(string) => string,
        Err(VarError::NotPresent) => {
            tracing::debug!(
                "The environment variable '{}' was not set, using the default port {}.",
                env_key,
                default_port
            );
            return default_port;
        }
        Err(e) => {
            tracing::error!(
                "An error occurred retrieving the environment variable '{}': {}",
                env_key,
                e
            );
            panic!();
        }
    };

    match port_string.parse() {
        Ok(port_number) => port_number,
        Err(e) => {
            tracing::error!(
                "An error occurred parsing the port number '{}' from the environment variable '{}': {}",
                port_string,
                env_key,
                e
            );
            panic!();
        }
    }
}

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes
/// first, and then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
