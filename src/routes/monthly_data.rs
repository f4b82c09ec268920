//! The route handlers for monthly aggregate figures and the dashboard summaries.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    auth::Claims,
    models::{MonthlyData, MonthlyDataInput},
    routes::validate_month,
    stores::MonthlyDataStore,
    AppConfig, Error,
};

/// The figures for one month, without a database identity.
///
/// Used for responses that zero-fill months which have no stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthTotals {
    /// The calendar month (1-12) the figures cover.
    pub month: u32,
    /// The calendar year the figures cover.
    pub year: i32,
    /// The total income for the month.
    pub total_income: Decimal,
    /// The total expenses for the month.
    pub total_expenses: Decimal,
    /// The balance available at the end of the month.
    pub available_balance: Decimal,
    /// The user's net worth at the end of the month.
    pub net_worth: Decimal,
}

impl MonthTotals {
    fn empty(month: u32, year: i32) -> Self {
        Self {
            month,
            year,
            total_income: Decimal::ZERO,
            total_expenses: Decimal::ZERO,
            available_balance: Decimal::ZERO,
            net_worth: Decimal::ZERO,
        }
    }
}

impl From<&MonthlyData> for MonthTotals {
    fn from(record: &MonthlyData) -> Self {
        Self {
            month: record.month(),
            year: record.year(),
            total_income: record.total_income(),
            total_expenses: record.total_expenses(),
            available_balance: record.available_balance(),
            net_worth: record.net_worth(),
        }
    }
}

/// The percentage changes between two consecutive months.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryChanges {
    /// The percentage change in total income.
    pub income_change: Decimal,
    /// The percentage change in total expenses.
    pub expenses_change: Decimal,
    /// The percentage change in available balance.
    pub balance_change: Decimal,
}

/// The dashboard summary of the current month against the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    /// The figures for the current calendar month.
    pub current_month: MonthTotals,
    /// The figures for the previous calendar month.
    pub previous_month: MonthTotals,
    /// The percentage changes between the two months.
    pub changes: SummaryChanges,
}

/// A route handler for listing all of the authenticated user's monthly records, most
/// recent month first.
pub async fn get_monthly_data(
    State(state): State<AppConfig>,
    claims: Claims,
) -> Result<Json<Vec<MonthlyData>>, Error> {
    let records = state.monthly_data_store.get_by_user(claims.sub)?;

    Ok(Json(records))
}

/// A route handler for getting the figures for a specific month.
///
/// A month with no stored record produces zero totals rather than a 404, so clients
/// can render any month without special cases.
pub async fn get_month(
    State(state): State<AppConfig>,
    claims: Claims,
    Path((month, year)): Path<(u32, i32)>,
) -> Result<Json<MonthTotals>, Error> {
    let month = validate_month(month)?;

    let totals = state
        .monthly_data_store
        .find(claims.sub, month, year)?
        .map(|record| MonthTotals::from(&record))
        .unwrap_or_else(|| MonthTotals::empty(month, year));

    Ok(Json(totals))
}

/// A route handler for creating or updating the figures for a month.
///
/// Responds with 201 when a new record was created and 200 when an existing one was
/// updated.
pub async fn upsert_monthly_data(
    State(mut state): State<AppConfig>,
    claims: Claims,
    Json(input): Json<MonthlyDataInput>,
) -> Result<(StatusCode, Json<MonthlyData>), Error> {
    validate_month(input.month)?;

    let (record, created) = state.monthly_data_store.upsert(claims.sub, input)?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(record)))
}

/// A route handler for the dashboard summary comparing the current calendar month to
/// the previous one.
pub async fn get_monthly_summary(
    State(state): State<AppConfig>,
    claims: Claims,
) -> Result<Json<MonthlySummary>, Error> {
    let today = Utc::now().date_naive();
    let (current_month, current_year) = (today.month(), today.year());

    let (previous_month, previous_year) = if current_month == 1 {
        (12, current_year - 1)
    } else {
        (current_month - 1, current_year)
    };

    let current = month_totals(&state, &claims, current_month, current_year)?;
    let previous = month_totals(&state, &claims, previous_month, previous_year)?;

    let changes = SummaryChanges {
        income_change: percentage_change(current.total_income, previous.total_income),
        expenses_change: percentage_change(current.total_expenses, previous.total_expenses),
        balance_change: percentage_change(current.available_balance, previous.available_balance),
    };

    Ok(Json(MonthlySummary {
        current_month: current,
        previous_month: previous,
        changes,
    }))
}

/// A route handler for a full year of figures, zero-filling the months that have no
/// stored record.
pub async fn get_year_summary(
    State(state): State<AppConfig>,
    claims: Claims,
    Path(year): Path<i32>,
) -> Result<Json<Vec<MonthTotals>>, Error> {
    let records = state.monthly_data_store.get_year(claims.sub, year)?;

    let full_year = (1..=12)
        .map(|month| {
            records
                .iter()
                .find(|record| record.month() == month)
                .map(MonthTotals::from)
                .unwrap_or_else(|| MonthTotals::empty(month, year))
        })
        .collect();

    Ok(Json(full_year))
}

fn month_totals(
    state: &AppConfig,
    claims: &Claims,
    month: u32,
    year: i32,
) -> Result<MonthTotals, Error> {
    Ok(state
        .monthly_data_store
        .find(claims.sub, month, year)?
        .map(|record| MonthTotals::from(&record))
        .unwrap_or_else(|| MonthTotals::empty(month, year)))
}

/// The percentage change from `previous` to `current`, rounded to two decimal places.
///
/// A zero previous value yields a zero change instead of a division by zero.
fn percentage_change(current: Decimal, previous: Decimal) -> Decimal {
    if previous == Decimal::ZERO {
        return Decimal::ZERO;
    }

    ((current - previous) / previous * Decimal::ONE_HUNDRED).round_dp(2)
}
