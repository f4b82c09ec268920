//! Keeps each budget target's progress counter in step with the user's transactions.
//!
//! Every transaction mutation produces exactly one [TargetEvent], which is applied to
//! the target matching the transaction's (user, category, type) tuple. Updating a
//! target is a best-effort secondary effect: the transaction write it follows is never
//! rolled back when reconciliation fails, and callers receive a typed error they can
//! log, surface, or retry.

use rust_decimal::Decimal;

use crate::{
    models::{Transaction, TransactionKind, UserID},
    stores::TargetStore,
    Error,
};

/// The transaction fields that determine which target is affected and by how much.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionSnapshot {
    /// The ID of the user that owns the transaction.
    pub user_id: UserID,
    /// The category label the transaction is filed under.
    pub category: String,
    /// Whether the transaction is an income or an expense.
    pub kind: TransactionKind,
    /// The transaction amount.
    pub amount: Decimal,
}

impl From<&Transaction> for TransactionSnapshot {
    fn from(transaction: &Transaction) -> Self {
        Self {
            user_id: transaction.user_id(),
            category: transaction.category().to_owned(),
            kind: transaction.kind(),
            amount: transaction.amount().as_decimal(),
        }
    }
}

/// A transaction lifecycle event to reconcile target progress against.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetEvent {
    /// A transaction was created.
    Created(TransactionSnapshot),
    /// A transaction was updated. `previous` holds the fields as they were before the
    /// update.
    Updated {
        /// The transaction fields after the update.
        current: TransactionSnapshot,
        /// The transaction fields before the update.
        previous: TransactionSnapshot,
    },
    /// A transaction was deleted.
    Deleted(TransactionSnapshot),
}

/// An error that occurred while updating a target's progress counter.
#[derive(Debug, thiserror::Error, PartialEq)]
#[error("could not update progress for the {kind} target in category {category:?}: {source}")]
pub struct ReconcileError {
    /// The category of the target that could not be updated.
    pub category: String,
    /// Whether the target tracks income or expenses.
    pub kind: TransactionKind,
    /// The underlying store error.
    #[source]
    pub source: Error,
}

/// Apply a transaction lifecycle event to the matching target's progress counter.
///
/// A transaction only affects the target sharing its (user, category, type) tuple. If
/// no such target exists, the event is a no-op: the amount is simply not tracked
/// against any budget. Targets are never created implicitly.
///
/// The counter saturates instead of erroring: it is capped at the target amount and
/// floored at zero. Note that decrements use the transaction's raw amount, so progress
/// that was capped on the way up is not restored to its exact prior value on the way
/// down; [TargetStore::recompute_progress] rebuilds the counter from the transaction
/// table when an authoritative value is needed.
pub fn apply<S>(store: &mut S, event: &TargetEvent) -> Result<(), ReconcileError>
where
    S: TargetStore,
{
    match event {
        TargetEvent::Created(transaction) => apply_delta(store, transaction, transaction.amount),
        TargetEvent::Deleted(transaction) => apply_delta(store, transaction, -transaction.amount),
        TargetEvent::Updated { current, previous } => {
            if current.category == previous.category && current.kind == previous.kind {
                // A single combined delta so the clamp applies exactly once.
                apply_delta(store, current, current.amount - previous.amount)
            } else {
                // Moving a transaction between buckets is a delete from the old
                // target followed by a create against the new one.
                apply_delta(store, previous, -previous.amount)?;
                apply_delta(store, current, current.amount)
            }
        }
    }
}

fn apply_delta<S>(
    store: &mut S,
    transaction: &TransactionSnapshot,
    delta: Decimal,
) -> Result<(), ReconcileError>
where
    S: TargetStore,
{
    let result = store.apply_progress_delta(
        transaction.user_id,
        &transaction.category,
        transaction.kind,
        delta,
    );

    match result {
        Ok(Some(target)) => {
            tracing::debug!(
                "target {} progress is now {} of {}",
                target.id(),
                target.current_amount().as_decimal(),
                target.target_amount().as_decimal(),
            );
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(source) => Err(ReconcileError {
            category: transaction.category.clone(),
            kind: transaction.kind,
            source,
        }),
    }
}

#[cfg(test)]
mod reconcile_tests {
    use std::str::FromStr;
    use std::sync::{Arc, Mutex};

    use email_address::EmailAddress;
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::{
        db::initialize,
        models::{Amount, NewTarget, NewUser, PasswordHash, TransactionKind, UserID},
        stores::{
            sqlite::{SQLiteTargetStore, SQLiteUserStore},
            TargetStore, UserStore,
        },
    };

    use super::{apply, TargetEvent, TransactionSnapshot};

    fn get_store() -> (SQLiteTargetStore, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let connection = Arc::new(Mutex::new(connection));

        let user = SQLiteUserStore::new(connection.clone())
            .create(NewUser {
                email: EmailAddress::from_str("foo@bar.baz").unwrap(),
                username: "tester".to_string(),
                password_hash: PasswordHash::new_unchecked("definitelyahash".to_string()),
            })
            .unwrap();

        (SQLiteTargetStore::new(connection), user.id())
    }

    fn create_target(
        store: &mut SQLiteTargetStore,
        user_id: UserID,
        category: &str,
        target_amount: Decimal,
    ) -> i64 {
        store
            .create(NewTarget {
                user_id,
                category: category.to_string(),
                kind: TransactionKind::Expense,
                target_amount: Amount::new(target_amount).unwrap(),
            })
            .unwrap()
            .id()
    }

    fn snapshot(user_id: UserID, category: &str, amount: Decimal) -> TransactionSnapshot {
        TransactionSnapshot {
            user_id,
            category: category.to_string(),
            kind: TransactionKind::Expense,
            amount,
        }
    }

    fn progress(store: &SQLiteTargetStore, id: i64, user_id: UserID) -> Decimal {
        store
            .get(id, user_id)
            .unwrap()
            .current_amount()
            .as_decimal()
    }

    #[test]
    fn creates_accumulate_capped_at_target_amount() {
        let (mut store, user_id) = get_store();
        let target_id = create_target(&mut store, user_id, "Food", dec!(200));

        // After each create, the progress equals min(target, sum of amounts so far).
        let amounts_and_expected = [
            (dec!(49.99), dec!(49.99)),
            (dec!(100.01), dec!(150.00)),
            (dec!(75.00), dec!(200.00)),
        ];

        for (amount, expected) in amounts_and_expected {
            apply(
                &mut store,
                &TargetEvent::Created(snapshot(user_id, "Food", amount)),
            )
            .unwrap();

            assert_eq!(progress(&store, target_id, user_id), expected);
        }
    }

    #[test]
    fn create_without_matching_target_is_a_no_op() {
        let (mut store, user_id) = get_store();
        let target_id = create_target(&mut store, user_id, "Food", dec!(200));

        // No target exists for the Rent category, and none is created implicitly.
        apply(
            &mut store,
            &TargetEvent::Created(snapshot(user_id, "Rent", dec!(950))),
        )
        .unwrap();

        assert_eq!(progress(&store, target_id, user_id), Decimal::ZERO);
        assert_eq!(
            store
                .find_target(user_id, "Rent", TransactionKind::Expense)
                .unwrap(),
            None
        );
    }

    #[test]
    fn create_ignores_other_users_targets() {
        let (mut store, user_id) = get_store();
        let target_id = create_target(&mut store, user_id, "Food", dec!(200));

        apply(
            &mut store,
            &TargetEvent::Created(snapshot(UserID::new(user_id.as_i64() + 1), "Food", dec!(50))),
        )
        .unwrap();

        assert_eq!(progress(&store, target_id, user_id), Decimal::ZERO);
    }

    #[test]
    fn delete_decrements_by_raw_amount_floored_at_zero() {
        let (mut store, user_id) = get_store();
        let target_id = create_target(&mut store, user_id, "Food", dec!(200));

        apply(
            &mut store,
            &TargetEvent::Created(snapshot(user_id, "Food", dec!(30))),
        )
        .unwrap();
        apply(
            &mut store,
            &TargetEvent::Deleted(snapshot(user_id, "Food", dec!(70))),
        )
        .unwrap();

        assert_eq!(progress(&store, target_id, user_id), Decimal::ZERO);
    }

    #[test]
    fn deleting_all_transactions_returns_progress_to_zero() {
        let (mut store, user_id) = get_store();
        let target_id = create_target(&mut store, user_id, "Food", dec!(500));
        let amounts = [dec!(120.50), dec!(30), dec!(75.25)];

        for amount in amounts {
            apply(
                &mut store,
                &TargetEvent::Created(snapshot(user_id, "Food", amount)),
            )
            .unwrap();
        }
        for amount in amounts {
            apply(
                &mut store,
                &TargetEvent::Deleted(snapshot(user_id, "Food", amount)),
            )
            .unwrap();
        }

        assert_eq!(progress(&store, target_id, user_id), Decimal::ZERO);
    }

    #[test]
    fn capped_progress_decrements_by_raw_amount() {
        // Worked example: a 70.00 transaction saturates progress at the 200.00 ceiling,
        // and deleting it takes off the full 70.00 rather than the 50.00 that was
        // actually added by the cap.
        let (mut store, user_id) = get_store();
        let target_id = create_target(&mut store, user_id, "Food", dec!(200));

        apply(
            &mut store,
            &TargetEvent::Created(snapshot(user_id, "Food", dec!(150))),
        )
        .unwrap();
        apply(
            &mut store,
            &TargetEvent::Created(snapshot(user_id, "Food", dec!(70))),
        )
        .unwrap();

        assert_eq!(progress(&store, target_id, user_id), dec!(200.00));

        apply(
            &mut store,
            &TargetEvent::Deleted(snapshot(user_id, "Food", dec!(70))),
        )
        .unwrap();

        assert_eq!(progress(&store, target_id, user_id), dec!(130.00));
    }

    #[test]
    fn update_with_same_bucket_applies_the_amount_difference() {
        let (mut store, user_id) = get_store();
        let target_id = create_target(&mut store, user_id, "Food", dec!(200));

        apply(
            &mut store,
            &TargetEvent::Created(snapshot(user_id, "Food", dec!(80))),
        )
        .unwrap();
        apply(
            &mut store,
            &TargetEvent::Updated {
                current: snapshot(user_id, "Food", dec!(55.50)),
                previous: snapshot(user_id, "Food", dec!(80)),
            },
        )
        .unwrap();

        assert_eq!(progress(&store, target_id, user_id), dec!(55.50));
    }

    #[test]
    fn update_with_same_bucket_clamps_the_combined_delta_once() {
        let (mut store, user_id) = get_store();
        let target_id = create_target(&mut store, user_id, "Food", dec!(200));

        // Progress (10) is less than the transaction's previous amount (70), so the
        // combined delta would take the counter below zero. Applying the decrement and
        // increment separately would instead leave the counter at the new amount.
        apply(
            &mut store,
            &TargetEvent::Created(snapshot(user_id, "Food", dec!(10))),
        )
        .unwrap();
        apply(
            &mut store,
            &TargetEvent::Updated {
                current: snapshot(user_id, "Food", dec!(5)),
                previous: snapshot(user_id, "Food", dec!(70)),
            },
        )
        .unwrap();

        assert_eq!(progress(&store, target_id, user_id), Decimal::ZERO);
    }

    #[test]
    fn update_that_changes_bucket_moves_progress_between_targets() {
        let (mut store, user_id) = get_store();
        let food_target = create_target(&mut store, user_id, "Food", dec!(200));
        let rent_target = create_target(&mut store, user_id, "Rent", dec!(1000));

        apply(
            &mut store,
            &TargetEvent::Created(snapshot(user_id, "Food", dec!(80))),
        )
        .unwrap();
        apply(
            &mut store,
            &TargetEvent::Updated {
                current: snapshot(user_id, "Rent", dec!(80)),
                previous: snapshot(user_id, "Food", dec!(80)),
            },
        )
        .unwrap();

        assert_eq!(progress(&store, food_target, user_id), Decimal::ZERO);
        assert_eq!(progress(&store, rent_target, user_id), dec!(80));
    }

    #[test]
    fn update_to_untracked_bucket_only_decrements_the_old_target() {
        let (mut store, user_id) = get_store();
        let food_target = create_target(&mut store, user_id, "Food", dec!(200));

        apply(
            &mut store,
            &TargetEvent::Created(snapshot(user_id, "Food", dec!(80))),
        )
        .unwrap();
        // There is no target for the new bucket; the increment step is a no-op.
        apply(
            &mut store,
            &TargetEvent::Updated {
                current: snapshot(user_id, "Travel", dec!(80)),
                previous: snapshot(user_id, "Food", dec!(80)),
            },
        )
        .unwrap();

        assert_eq!(progress(&store, food_target, user_id), Decimal::ZERO);
    }

    #[test]
    fn update_from_untracked_bucket_only_increments_the_new_target() {
        let (mut store, user_id) = get_store();
        let food_target = create_target(&mut store, user_id, "Food", dec!(200));

        apply(
            &mut store,
            &TargetEvent::Updated {
                current: snapshot(user_id, "Food", dec!(25)),
                previous: snapshot(user_id, "Travel", dec!(25)),
            },
        )
        .unwrap();

        assert_eq!(progress(&store, food_target, user_id), dec!(25));
    }

    #[test]
    fn update_between_kinds_is_a_bucket_change() {
        let (mut store, user_id) = get_store();
        let expense_target = create_target(&mut store, user_id, "Side gig", dec!(200));
        let income_target = store
            .create(NewTarget {
                user_id,
                category: "Side gig".to_string(),
                kind: TransactionKind::Income,
                target_amount: Amount::new(dec!(400)).unwrap(),
            })
            .unwrap()
            .id();

        apply(
            &mut store,
            &TargetEvent::Created(snapshot(user_id, "Side gig", dec!(60))),
        )
        .unwrap();
        apply(
            &mut store,
            &TargetEvent::Updated {
                current: TransactionSnapshot {
                    kind: TransactionKind::Income,
                    ..snapshot(user_id, "Side gig", dec!(60))
                },
                previous: snapshot(user_id, "Side gig", dec!(60)),
            },
        )
        .unwrap();

        assert_eq!(progress(&store, expense_target, user_id), Decimal::ZERO);
        assert_eq!(progress(&store, income_target, user_id), dec!(60));
    }
}
