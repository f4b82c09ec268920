//! The route handlers for managing budget targets.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    auth::Claims,
    models::{Amount, DatabaseID, NewTarget, Target, TargetUpdate, TransactionKind},
    routes::non_empty,
    stores::TargetStore,
    AppConfig, Error,
};

/// The body of a request to create a budget target.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTarget {
    /// The category label to track.
    category: String,
    /// Whether to track income or expenses.
    #[serde(rename = "type")]
    kind: TransactionKind,
    /// The budgeted ceiling.
    target_amount: Decimal,
}

/// The body of a request to update a budget target. Unset fields keep their values.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTarget {
    /// The category label to track.
    #[serde(default)]
    category: Option<String>,
    /// Whether to track income or expenses.
    #[serde(rename = "type", default)]
    kind: Option<TransactionKind>,
    /// The budgeted ceiling.
    #[serde(default)]
    target_amount: Option<Decimal>,
}

/// A route handler for creating a new budget target.
///
/// The progress counter starts at zero; transactions logged before the target was
/// created do not count towards it.
pub async fn create_target(
    State(mut state): State<AppConfig>,
    claims: Claims,
    Json(request): Json<CreateTarget>,
) -> Result<(StatusCode, Json<Target>), Error> {
    let target_amount = Amount::new(request.target_amount)?;
    let category = non_empty(request.category, "category")?;

    let target = state.target_store.create(NewTarget {
        user_id: claims.sub,
        category,
        kind: request.kind,
        target_amount,
    })?;

    Ok((StatusCode::CREATED, Json(target)))
}

/// A route handler for listing the authenticated user's budget targets.
pub async fn get_targets(
    State(state): State<AppConfig>,
    claims: Claims,
) -> Result<Json<Vec<Target>>, Error> {
    let targets = state.target_store.get_by_user(claims.sub)?;

    Ok(Json(targets))
}

/// A route handler for getting a budget target by its database ID.
///
/// This function will return the status code 404 if the target does not exist or
/// belongs to another user.
pub async fn get_target(
    State(state): State<AppConfig>,
    claims: Claims,
    Path(target_id): Path<DatabaseID>,
) -> Result<Json<Target>, Error> {
    let target = state.target_store.get(target_id, claims.sub)?;

    Ok(Json(target))
}

/// A route handler for updating a budget target.
///
/// When the ceiling or the (category, type) bucket changes, the progress counter is
/// recomputed from the transaction table so it reflects the transactions that now
/// match the target.
pub async fn update_target(
    State(mut state): State<AppConfig>,
    claims: Claims,
    Path(target_id): Path<DatabaseID>,
    Json(request): Json<UpdateTarget>,
) -> Result<Json<Target>, Error> {
    let existing = state.target_store.get(target_id, claims.sub)?;

    let category = match request.category {
        Some(category) => non_empty(category, "category")?,
        None => existing.category().to_string(),
    };
    let kind = request.kind.unwrap_or(existing.kind());
    let target_amount = match request.target_amount {
        Some(target_amount) => Amount::new(target_amount)?,
        None => existing.target_amount(),
    };

    let bucket_changed = category != existing.category() || kind != existing.kind();
    let ceiling_changed = target_amount != existing.target_amount();

    let mut updated = state.target_store.update(
        target_id,
        claims.sub,
        TargetUpdate {
            category,
            kind,
            target_amount,
        },
    )?;

    if bucket_changed || ceiling_changed {
        updated = state.target_store.recompute_progress(target_id, claims.sub)?;
    }

    Ok(Json(updated))
}

/// A route handler for deleting a budget target.
///
/// Deleting a target does not delete the transactions that counted towards it.
pub async fn delete_target(
    State(mut state): State<AppConfig>,
    claims: Claims,
    Path(target_id): Path<DatabaseID>,
) -> Result<StatusCode, Error> {
    state.target_store.delete(target_id, claims.sub)?;

    Ok(StatusCode::NO_CONTENT)
}
