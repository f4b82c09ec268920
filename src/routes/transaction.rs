//! The route handlers for logging and managing transactions.
//!
//! Every transaction mutation triggers exactly one progress reconciliation against the
//! matching budget target. Reconciliation is best-effort: its failures are logged and
//! never fail or roll back the transaction write itself.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    auth::Claims,
    models::{
        derive_month_year, Amount, DatabaseID, NewTransaction, Transaction, TransactionKind,
    },
    reconcile::{self, TargetEvent, TransactionSnapshot},
    routes::{non_empty, validate_month},
    stores::{sqlite::SQLiteTargetStore, TargetStore, TransactionQuery, TransactionStore},
    AppConfig, Error,
};

/// The body of a request to create a transaction.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransaction {
    /// Whether the transaction is an income or an expense.
    #[serde(rename = "type")]
    kind: TransactionKind,
    /// The amount of money spent or earned.
    amount: Decimal,
    /// The category label to file the transaction under.
    category: String,
    /// The date the transaction occurred.
    date: NaiveDate,
    /// A free-form description of the transaction.
    #[serde(default)]
    description: Option<String>,
    /// Overrides the month derived from the date. Only applied together with `year`.
    #[serde(default)]
    month: Option<u32>,
    /// Overrides the year derived from the date. Only applied together with `month`.
    #[serde(default)]
    year: Option<i32>,
}

/// Optional filters for listing transactions.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionFilter {
    /// Include only transactions filed under this calendar month (1-12).
    #[serde(default)]
    month: Option<u32>,
    /// Include only transactions filed under this calendar year.
    #[serde(default)]
    year: Option<i32>,
}

/// The body of a request to update a transaction. Unset fields keep their values.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransaction {
    /// Whether the transaction is an income or an expense.
    #[serde(rename = "type", default)]
    kind: Option<TransactionKind>,
    /// The amount of money spent or earned.
    #[serde(default)]
    amount: Option<Decimal>,
    /// The category label to file the transaction under.
    #[serde(default)]
    category: Option<String>,
    /// The date the transaction occurred.
    #[serde(default)]
    date: Option<NaiveDate>,
    /// A free-form description of the transaction.
    #[serde(default)]
    description: Option<String>,
    /// The calendar month (1-12) to file the transaction under.
    #[serde(default)]
    month: Option<u32>,
    /// The calendar year to file the transaction under.
    #[serde(default)]
    year: Option<i32>,
}

/// A route handler for creating a new transaction.
pub async fn create_transaction(
    State(mut state): State<AppConfig>,
    claims: Claims,
    Json(request): Json<CreateTransaction>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let amount = Amount::new(request.amount)?;
    let category = non_empty(request.category, "category")?;

    // A partial month/year override falls back to deriving both from the date.
    let (month, year) = match (request.month, request.year) {
        (Some(month), Some(year)) => (month, year),
        _ => derive_month_year(request.date),
    };
    let month = validate_month(month)?;

    let target_id = state
        .target_store
        .find_target(claims.sub, &category, request.kind)?
        .map(|target| target.id());

    let transaction = state.transaction_store.create(NewTransaction {
        user_id: claims.sub,
        kind: request.kind,
        amount,
        category,
        description: request.description.unwrap_or_default(),
        date: request.date,
        month,
        year,
        target_id,
    })?;

    apply_target_event(
        &mut state.target_store,
        &TargetEvent::Created(TransactionSnapshot::from(&transaction)),
    );

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// A route handler for listing the authenticated user's transactions, most recent
/// first, optionally filtered by month and year.
pub async fn get_transactions(
    State(state): State<AppConfig>,
    claims: Claims,
    Query(filter): Query<TransactionFilter>,
) -> Result<Json<Vec<Transaction>>, Error> {
    if let Some(month) = filter.month {
        validate_month(month)?;
    }

    let transactions = state.transaction_store.get_by_user(
        claims.sub,
        TransactionQuery {
            month: filter.month,
            year: filter.year,
        },
    )?;

    Ok(Json(transactions))
}

/// A route handler for getting a transaction by its database ID.
///
/// This function will return the status code 404 if the transaction does not exist or
/// belongs to another user.
pub async fn get_transaction(
    State(state): State<AppConfig>,
    claims: Claims,
    Path(transaction_id): Path<DatabaseID>,
) -> Result<Json<Transaction>, Error> {
    let transaction = state.transaction_store.get(transaction_id, claims.sub)?;

    Ok(Json(transaction))
}

/// A route handler for updating a transaction.
///
/// The previous transaction fields are snapshotted before the write so that the
/// reconciler can undo their effect on the previously matching target.
pub async fn update_transaction(
    State(mut state): State<AppConfig>,
    claims: Claims,
    Path(transaction_id): Path<DatabaseID>,
    Json(request): Json<UpdateTransaction>,
) -> Result<Json<Transaction>, Error> {
    let existing = state.transaction_store.get(transaction_id, claims.sub)?;
    let previous = TransactionSnapshot::from(&existing);

    let kind = request.kind.unwrap_or(existing.kind());
    let amount = match request.amount {
        Some(amount) => Amount::new(amount)?,
        None => existing.amount(),
    };
    let category = match request.category {
        Some(category) => non_empty(category, "category")?,
        None => existing.category().to_string(),
    };
    let date = request.date.unwrap_or(existing.date());

    // A changed date re-derives the month and year unless both are explicitly given.
    let (month, year) = match (request.date, request.month, request.year) {
        (Some(date), month, year) if month.is_none() || year.is_none() => derive_month_year(date),
        (_, month, year) => (
            month.unwrap_or(existing.month()),
            year.unwrap_or(existing.year()),
        ),
    };
    let month = validate_month(month)?;

    let description = request
        .description
        .unwrap_or_else(|| existing.description().to_string());

    // The stored target reference is re-resolved against the new (category, type)
    // bucket at every write.
    let target_id = state
        .target_store
        .find_target(claims.sub, &category, kind)?
        .map(|target| target.id());

    let updated = state.transaction_store.update(
        transaction_id,
        claims.sub,
        NewTransaction {
            user_id: claims.sub,
            kind,
            amount,
            category,
            description,
            date,
            month,
            year,
            target_id,
        },
    )?;

    apply_target_event(
        &mut state.target_store,
        &TargetEvent::Updated {
            current: TransactionSnapshot::from(&updated),
            previous,
        },
    );

    Ok(Json(updated))
}

/// A route handler for deleting a transaction.
pub async fn delete_transaction(
    State(mut state): State<AppConfig>,
    claims: Claims,
    Path(transaction_id): Path<DatabaseID>,
) -> Result<StatusCode, Error> {
    let deleted = state.transaction_store.delete(transaction_id, claims.sub)?;

    apply_target_event(
        &mut state.target_store,
        &TargetEvent::Deleted(TransactionSnapshot::from(&deleted)),
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Apply a reconciliation event and log failures.
///
/// Keeping a target's progress in sync is a best-effort secondary effect: an error here
/// must not fail or roll back the transaction mutation that triggered it.
fn apply_target_event(store: &mut SQLiteTargetStore, event: &TargetEvent) {
    if let Err(error) = reconcile::apply(store, event) {
        tracing::error!("{error}");
    }
}
