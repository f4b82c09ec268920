//! Per-month financial aggregates maintained by the user.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{DatabaseID, UserID};

/// A user's aggregate figures for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyData {
    id: DatabaseID,
    user_id: UserID,
    month: u32,
    year: i32,
    total_income: Decimal,
    total_expenses: Decimal,
    available_balance: Decimal,
    net_worth: Decimal,
}

impl MonthlyData {
    /// Create a new `MonthlyData`.
    ///
    /// Note that this does *not* add the record to the application database.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: DatabaseID,
        user_id: UserID,
        month: u32,
        year: i32,
        total_income: Decimal,
        total_expenses: Decimal,
        available_balance: Decimal,
        net_worth: Decimal,
    ) -> Self {
        Self {
            id,
            user_id,
            month,
            year,
            total_income,
            total_expenses,
            available_balance,
            net_worth,
        }
    }

    /// The ID of the record.
    pub fn id(&self) -> DatabaseID {
        self.id
    }

    /// The ID of the user the figures belong to.
    pub fn user_id(&self) -> UserID {
        self.user_id
    }

    /// The calendar month (1-12) the figures cover.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// The calendar year the figures cover.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The total income for the month.
    pub fn total_income(&self) -> Decimal {
        self.total_income
    }

    /// The total expenses for the month.
    pub fn total_expenses(&self) -> Decimal {
        self.total_expenses
    }

    /// The balance available at the end of the month.
    pub fn available_balance(&self) -> Decimal {
        self.available_balance
    }

    /// The user's net worth at the end of the month.
    pub fn net_worth(&self) -> Decimal {
        self.net_worth
    }
}

/// The data for creating or updating a month's figures.
///
/// Fields left unset keep their existing value on update and default to zero on create.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyDataInput {
    /// The calendar month (1-12) the figures cover.
    pub month: u32,
    /// The calendar year the figures cover.
    pub year: i32,
    /// The total income for the month.
    #[serde(default)]
    pub total_income: Option<Decimal>,
    /// The total expenses for the month.
    #[serde(default)]
    pub total_expenses: Option<Decimal>,
    /// The balance available at the end of the month.
    #[serde(default)]
    pub available_balance: Option<Decimal>,
    /// The user's net worth at the end of the month.
    #[serde(default)]
    pub net_worth: Option<Decimal>,
}
