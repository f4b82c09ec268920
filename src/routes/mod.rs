//! Application router configuration and the JSON route handlers.

pub mod endpoints;

mod monthly_data;
mod notification;
mod target;
mod transaction;

use axum::{
    http::StatusCode,
    routing::{get, patch, post},
    Router,
};

use crate::{auth, AppConfig, Error};

/// Return a router with all the app's routes.
pub fn build_router() -> Router<AppConfig> {
    Router::new()
        .route("/", get(|| async { StatusCode::IM_A_TEAPOT }))
        .route(endpoints::SIGN_UP, post(auth::register))
        .route(endpoints::LOG_IN, post(auth::log_in))
        .route(endpoints::PROFILE, get(auth::get_profile))
        .route(
            endpoints::TRANSACTIONS,
            get(transaction::get_transactions).post(transaction::create_transaction),
        )
        .route(
            endpoints::TRANSACTION,
            get(transaction::get_transaction)
                .put(transaction::update_transaction)
                .delete(transaction::delete_transaction),
        )
        .route(
            endpoints::TARGETS,
            get(target::get_targets).post(target::create_target),
        )
        .route(
            endpoints::TARGET,
            get(target::get_target)
                .put(target::update_target)
                .delete(target::delete_target),
        )
        .route(
            endpoints::MONTHLY_DATA,
            get(monthly_data::get_monthly_data).post(monthly_data::upsert_monthly_data),
        )
        .route(
            endpoints::MONTHLY_SUMMARY,
            get(monthly_data::get_monthly_summary),
        )
        .route(endpoints::YEAR_SUMMARY, get(monthly_data::get_year_summary))
        .route(endpoints::MONTHLY_DATA_MONTH, get(monthly_data::get_month))
        .route(
            endpoints::NOTIFICATIONS,
            get(notification::get_notifications).post(notification::create_notification),
        )
        .route(
            endpoints::NOTIFICATION,
            get(notification::get_notification).delete(notification::delete_notification),
        )
        .route(
            endpoints::NOTIFICATION_READ,
            patch(notification::mark_notification_read),
        )
}

/// Check that a free-form text field is non-empty after trimming surrounding
/// whitespace.
fn non_empty(value: String, field: &'static str) -> Result<String, Error> {
    let value = value.trim().to_string();

    if value.is_empty() {
        Err(Error::EmptyField(field))
    } else {
        Ok(value)
    }
}

/// Check that a month number is within 1-12.
fn validate_month(month: u32) -> Result<u32, Error> {
    if (1..=12).contains(&month) {
        Ok(month)
    } else {
        Err(Error::InvalidMonth(month))
    }
}
