//! A per-user budget goal for a (category, type) pair.

use serde::{Deserialize, Serialize};

use crate::models::{Amount, DatabaseID, TransactionKind, UserID};

/// A budget target tracking a progress counter against a ceiling.
///
/// A target matches the transactions that share its owning user, category, and type.
/// The current amount is kept within `[0, target_amount]` by the progress reconciler;
/// exceeding the ceiling saturates rather than erroring.
///
/// At most one target per (user, category, type) tuple is intended, but this is not
/// enforced by the store; callers are responsible for not creating duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    id: DatabaseID,
    user_id: UserID,
    category: String,
    #[serde(rename = "type")]
    kind: TransactionKind,
    target_amount: Amount,
    current_amount: Amount,
}

impl Target {
    /// Create a new `Target`.
    ///
    /// Note that this does *not* add the target to the application database.
    pub fn new(
        id: DatabaseID,
        user_id: UserID,
        category: String,
        kind: TransactionKind,
        target_amount: Amount,
        current_amount: Amount,
    ) -> Self {
        Self {
            id,
            user_id,
            category,
            kind,
            target_amount,
            current_amount,
        }
    }

    /// The ID of the target.
    pub fn id(&self) -> DatabaseID {
        self.id
    }

    /// The ID of the user that set the target.
    pub fn user_id(&self) -> UserID {
        self.user_id
    }

    /// The category label the target tracks.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Whether the target tracks income or expenses.
    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    /// The budgeted ceiling.
    pub fn target_amount(&self) -> Amount {
        self.target_amount
    }

    /// The tracked progress towards the ceiling.
    pub fn current_amount(&self) -> Amount {
        self.current_amount
    }
}

/// The data for creating a new target.
///
/// The progress counter of a new target always starts at zero.
#[derive(Debug, Clone)]
pub struct NewTarget {
    /// The ID of the user setting the target.
    pub user_id: UserID,
    /// The category label to track.
    pub category: String,
    /// Whether to track income or expenses.
    pub kind: TransactionKind,
    /// The budgeted ceiling.
    pub target_amount: Amount,
}

/// The user-editable fields of a target.
#[derive(Debug, Clone)]
pub struct TargetUpdate {
    /// The category label to track.
    pub category: String,
    /// Whether to track income or expenses.
    pub kind: TransactionKind,
    /// The budgeted ceiling.
    pub target_amount: Amount,
}
