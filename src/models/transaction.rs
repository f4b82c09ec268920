//! An expense or income, i.e. an event where money was either spent or earned.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{Amount, DatabaseID, UserID};

/// Whether a transaction or budget target concerns money coming in or going out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money was earned.
    Income,
    /// Money was spent.
    Expense,
}

impl TransactionKind {
    /// The kind as the lowercase string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The error returned when a string is not `income` or `expense`.
#[derive(Debug, thiserror::Error)]
#[error("{0} is not a valid transaction type")]
pub struct ParseTransactionKindError(String);

impl FromStr for TransactionKind {
    type Err = ParseTransactionKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(ParseTransactionKindError(other.to_string())),
        }
    }
}

/// An expense or income logged by a user.
///
/// The month and year columns are denormalized from the date so that monthly listings can
/// filter on integer columns. The target ID records which budget target, if any, matched
/// the transaction's (user, category, type) tuple when it was last written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    id: DatabaseID,
    user_id: UserID,
    #[serde(rename = "type")]
    kind: TransactionKind,
    amount: Amount,
    category: String,
    description: String,
    date: NaiveDate,
    month: u32,
    year: i32,
    target_id: Option<DatabaseID>,
}

impl Transaction {
    /// Create a new `Transaction`.
    ///
    /// Note that this does *not* add the transaction to the application database.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: DatabaseID,
        user_id: UserID,
        kind: TransactionKind,
        amount: Amount,
        category: String,
        description: String,
        date: NaiveDate,
        month: u32,
        year: i32,
        target_id: Option<DatabaseID>,
    ) -> Self {
        Self {
            id,
            user_id,
            kind,
            amount,
            category,
            description,
            date,
            month,
            year,
            target_id,
        }
    }

    /// The ID of the transaction.
    pub fn id(&self) -> DatabaseID {
        self.id
    }

    /// The ID of the user that logged the transaction.
    pub fn user_id(&self) -> UserID {
        self.user_id
    }

    /// Whether the transaction is an income or an expense.
    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    /// The amount of money spent or earned.
    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// The category label the user filed the transaction under.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// A free-form description of the transaction.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The date the transaction occurred.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The calendar month (1-12) the transaction is filed under.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// The calendar year the transaction is filed under.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The budget target the transaction matched when it was last written, if any.
    pub fn target_id(&self) -> Option<DatabaseID> {
        self.target_id
    }
}

/// The data for creating a transaction or overwriting an existing one.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    /// The ID of the user logging the transaction.
    pub user_id: UserID,
    /// Whether the transaction is an income or an expense.
    pub kind: TransactionKind,
    /// The amount of money spent or earned.
    pub amount: Amount,
    /// The category label to file the transaction under.
    pub category: String,
    /// A free-form description of the transaction.
    pub description: String,
    /// The date the transaction occurred.
    pub date: NaiveDate,
    /// The calendar month (1-12) to file the transaction under.
    pub month: u32,
    /// The calendar year to file the transaction under.
    pub year: i32,
    /// The budget target matching the transaction's (user, category, type) tuple, if any.
    pub target_id: Option<DatabaseID>,
}

/// The month (1-12) and year a date falls in.
pub fn derive_month_year(date: NaiveDate) -> (u32, i32) {
    (date.month(), date.year())
}
