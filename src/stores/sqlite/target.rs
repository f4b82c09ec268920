//! Implements a SQLite backed target store.

use std::sync::{Arc, Mutex};

use rusqlite::{named_params, Connection, Row};
use rust_decimal::Decimal;

use crate::{
    db::{CreateTable, MapRow},
    models::{
        decimal_to_cents, Amount, DatabaseID, NewTarget, Target, TargetUpdate, TransactionKind,
        UserID,
    },
    stores::TargetStore,
    Error,
};

const TARGET_COLUMNS: &str = "id, user_id, category, kind, target_amount, current_amount";

/// Stores budget targets in a SQLite database.
///
/// Amounts are stored as integer cents so that the progress arithmetic below stays
/// exact.
#[derive(Debug, Clone)]
pub struct SQLiteTargetStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTargetStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl TargetStore for SQLiteTargetStore {
    /// Create a new target in the database with a progress counter of zero.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::EmptyField] if the category is empty,
    /// - or [Error::SqlError] if there is some SQL error.
    fn create(&mut self, new_target: NewTarget) -> Result<Target, Error> {
        if new_target.category.trim().is_empty() {
            return Err(Error::EmptyField("category"));
        }

        let connection = self.connection.lock().unwrap();

        connection.execute(
            "INSERT INTO target (user_id, category, kind, target_amount, current_amount)
             VALUES (?1, ?2, ?3, ?4, 0)",
            (
                new_target.user_id.as_i64(),
                &new_target.category,
                new_target.kind.as_str(),
                new_target.target_amount.as_cents(),
            ),
        )?;

        let id = connection.last_insert_rowid();

        Ok(Target::new(
            id,
            new_target.user_id,
            new_target.category,
            new_target.kind,
            new_target.target_amount,
            Amount::ZERO,
        ))
    }

    /// Retrieve the target with `id` belonging to `user_id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if the target does not exist or belongs to another user,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, id: DatabaseID, user_id: UserID) -> Result<Target, Error> {
        let target = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {TARGET_COLUMNS} FROM target WHERE id = :id AND user_id = :user_id"
            ))?
            .query_row(
                named_params! {":id": id, ":user_id": user_id.as_i64()},
                Self::map_row,
            )?;

        Ok(target)
    }

    /// Retrieve all targets belonging to `user_id`.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL error.
    fn get_by_user(&self, user_id: UserID) -> Result<Vec<Target>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {TARGET_COLUMNS} FROM target WHERE user_id = :user_id ORDER BY id"
            ))?
            .query_map(&[(":user_id", &user_id.as_i64())], Self::map_row)?
            .map(|maybe_target| maybe_target.map_err(Error::SqlError))
            .collect()
    }

    /// Find the target matching a transaction's (user, category, type) tuple.
    ///
    /// Ties between duplicate targets are resolved by picking the lowest ID.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL error.
    fn find_target(
        &self,
        user_id: UserID,
        category: &str,
        kind: TransactionKind,
    ) -> Result<Option<Target>, Error> {
        let result = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {TARGET_COLUMNS} FROM target
                 WHERE user_id = :user_id AND category = :category AND kind = :kind
                 ORDER BY id LIMIT 1"
            ))?
            .query_row(
                named_params! {
                    ":user_id": user_id.as_i64(),
                    ":category": category,
                    ":kind": kind.as_str(),
                },
                Self::map_row,
            );

        match result {
            Ok(target) => Ok(Some(target)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    /// Overwrite the user-editable fields of the target with `id` belonging to
    /// `user_id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::EmptyField] if the category is empty,
    /// - [Error::NotFound] if the target does not exist or belongs to another user,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update(
        &mut self,
        id: DatabaseID,
        user_id: UserID,
        fields: TargetUpdate,
    ) -> Result<Target, Error> {
        if fields.category.trim().is_empty() {
            return Err(Error::EmptyField("category"));
        }

        let target = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "UPDATE target
                 SET category = :category, kind = :kind, target_amount = :target_amount
                 WHERE id = :id AND user_id = :user_id
                 RETURNING {TARGET_COLUMNS}"
            ))?
            .query_row(
                named_params! {
                    ":category": fields.category,
                    ":kind": fields.kind.as_str(),
                    ":target_amount": fields.target_amount.as_cents(),
                    ":id": id,
                    ":user_id": user_id.as_i64(),
                },
                Self::map_row,
            )?;

        Ok(target)
    }

    /// Delete the target with `id` belonging to `user_id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if the target does not exist or belongs to another user,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&mut self, id: DatabaseID, user_id: UserID) -> Result<(), Error> {
        let rows_deleted = self.connection.lock().unwrap().execute(
            "DELETE FROM target WHERE id = ?1 AND user_id = ?2",
            (id, user_id.as_i64()),
        )?;

        if rows_deleted == 0 {
            Err(Error::NotFound)
        } else {
            Ok(())
        }
    }

    /// Add a signed delta to the progress counter of the matching target, saturating
    /// at zero and at the target amount.
    ///
    /// The arithmetic and the clamp happen inside a single UPDATE statement scoped to
    /// one row, so concurrent updates cannot interleave between a read and a write.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL error.
    fn apply_progress_delta(
        &mut self,
        user_id: UserID,
        category: &str,
        kind: TransactionKind,
        delta: Decimal,
    ) -> Result<Option<Target>, Error> {
        let result = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "UPDATE target
                 SET current_amount = MIN(MAX(current_amount + :delta, 0), target_amount)
                 WHERE id = (
                     SELECT id FROM target
                     WHERE user_id = :user_id AND category = :category AND kind = :kind
                     ORDER BY id LIMIT 1)
                 RETURNING {TARGET_COLUMNS}"
            ))?
            .query_row(
                named_params! {
                    ":delta": decimal_to_cents(delta),
                    ":user_id": user_id.as_i64(),
                    ":category": category,
                    ":kind": kind.as_str(),
                },
                Self::map_row,
            );

        match result {
            Ok(target) => Ok(Some(target)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    /// Reset the progress counter of the target with `id` to the sum of the matching
    /// transactions' amounts, capped at the target amount.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if the target does not exist or belongs to another user,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn recompute_progress(&mut self, id: DatabaseID, user_id: UserID) -> Result<Target, Error> {
        let target = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "UPDATE target
                 SET current_amount = MIN(target_amount, (
                     SELECT COALESCE(SUM(t.amount), 0) FROM \"transaction\" t
                     WHERE t.user_id = target.user_id
                       AND t.category = target.category
                       AND t.kind = target.kind))
                 WHERE id = :id AND user_id = :user_id
                 RETURNING {TARGET_COLUMNS}"
            ))?
            .query_row(
                named_params! {":id": id, ":user_id": user_id.as_i64()},
                Self::map_row,
            )?;

        Ok(target)
    }
}

impl CreateTable for SQLiteTargetStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        // No UNIQUE constraint on (user_id, category, kind): the caller is responsible
        // for not creating duplicate targets.
        connection.execute(
            "CREATE TABLE IF NOT EXISTS target (
                    id INTEGER PRIMARY KEY,
                    user_id INTEGER NOT NULL,
                    category TEXT NOT NULL,
                    kind TEXT NOT NULL,
                    target_amount INTEGER NOT NULL,
                    current_amount INTEGER NOT NULL DEFAULT 0,
                    FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteTargetStore {
    type ReturnType = Target;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let user_id = UserID::new(row.get(offset + 1)?);
        let category: String = row.get(offset + 2)?;

        let raw_kind: String = row.get(offset + 3)?;
        let kind = raw_kind.parse().map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(
                offset + 3,
                rusqlite::types::Type::Text,
                Box::new(error),
            )
        })?;

        let target_amount = Amount::from_cents(row.get(offset + 4)?);
        let current_amount = Amount::from_cents(row.get(offset + 5)?);

        Ok(Target::new(
            id,
            user_id,
            category,
            kind,
            target_amount,
            current_amount,
        ))
    }
}

#[cfg(test)]
mod sqlite_target_store_tests {
    use std::str::FromStr;
    use std::sync::{Arc, Mutex};

    use chrono::NaiveDate;
    use email_address::EmailAddress;
    use rusqlite::Connection;
    use rust_decimal_macros::dec;

    use crate::{
        db::initialize,
        models::{
            Amount, NewTarget, NewTransaction, NewUser, PasswordHash, TargetUpdate,
            TransactionKind, UserID,
        },
        stores::{
            sqlite::{SQLiteTransactionStore, SQLiteUserStore},
            TargetStore, TransactionStore, UserStore,
        },
        Error,
    };

    use super::SQLiteTargetStore;

    fn get_stores() -> (SQLiteTargetStore, SQLiteTransactionStore, UserID) {
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

        (
            SQLiteTargetStore::new(connection.clone()),
            SQLiteTransactionStore::new(connection),
            user.id(),
        )
    }

    fn new_target(user_id: UserID, category: &str, target_amount: Amount) -> NewTarget {
        NewTarget {
            user_id,
            category: category.to_string(),
            kind: TransactionKind::Expense,
            target_amount,
        }
    }

    fn new_transaction(user_id: UserID, category: &str, amount: Amount) -> NewTransaction {
        NewTransaction {
            user_id,
            kind: TransactionKind::Expense,
            amount,
            category: category.to_string(),
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2024, 8, 7).unwrap(),
            month: 8,
            year: 2024,
            target_id: None,
        }
    }

    #[test]
    fn create_initializes_progress_to_zero() {
        let (mut store, _, user_id) = get_stores();

        let target = store
            .create(new_target(user_id, "Food", Amount::new(dec!(200)).unwrap()))
            .unwrap();

        assert!(target.id() > 0);
        assert_eq!(target.current_amount(), Amount::ZERO);
        assert_eq!(target.target_amount().as_decimal(), dec!(200));
    }

    #[test]
    fn create_fails_on_empty_category() {
        let (mut store, _, user_id) = get_stores();

        let result = store.create(new_target(user_id, "  ", Amount::new(dec!(200)).unwrap()));

        assert_eq!(result, Err(Error::EmptyField("category")));
    }

    #[test]
    fn find_target_matches_exact_tuple() {
        let (mut store, _, user_id) = get_stores();
        let target = store
            .create(new_target(user_id, "Food", Amount::new(dec!(200)).unwrap()))
            .unwrap();

        let found = store
            .find_target(user_id, "Food", TransactionKind::Expense)
            .unwrap();

        assert_eq!(found, Some(target));
    }

    #[test]
    fn find_target_is_absent_for_other_tuples() {
        let (mut store, _, user_id) = get_stores();
        store
            .create(new_target(user_id, "Food", Amount::new(dec!(200)).unwrap()))
            .unwrap();

        let wrong_category = store
            .find_target(user_id, "Rent", TransactionKind::Expense)
            .unwrap();
        let wrong_kind = store
            .find_target(user_id, "Food", TransactionKind::Income)
            .unwrap();
        let wrong_user = store
            .find_target(UserID::new(user_id.as_i64() + 1), "Food", TransactionKind::Expense)
            .unwrap();

        assert_eq!(wrong_category, None);
        assert_eq!(wrong_kind, None);
        assert_eq!(wrong_user, None);
    }

    #[test]
    fn find_target_prefers_lowest_id_among_duplicates() {
        let (mut store, _, user_id) = get_stores();
        let first = store
            .create(new_target(user_id, "Food", Amount::new(dec!(200)).unwrap()))
            .unwrap();
        store
            .create(new_target(user_id, "Food", Amount::new(dec!(300)).unwrap()))
            .unwrap();

        let found = store
            .find_target(user_id, "Food", TransactionKind::Expense)
            .unwrap();

        assert_eq!(found, Some(first));
    }

    #[test]
    fn get_fails_on_wrong_user() {
        let (mut store, _, user_id) = get_stores();
        let target = store
            .create(new_target(user_id, "Food", Amount::new(dec!(200)).unwrap()))
            .unwrap();

        let result = store.get(target.id(), UserID::new(user_id.as_i64() + 1));

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn update_overwrites_fields() {
        let (mut store, _, user_id) = get_stores();
        let target = store
            .create(new_target(user_id, "Food", Amount::new(dec!(200)).unwrap()))
            .unwrap();

        let updated = store
            .update(
                target.id(),
                user_id,
                TargetUpdate {
                    category: "Groceries".to_string(),
                    kind: TransactionKind::Expense,
                    target_amount: Amount::new(dec!(250)).unwrap(),
                },
            )
            .unwrap();

        assert_eq!(updated.category(), "Groceries");
        assert_eq!(updated.target_amount().as_decimal(), dec!(250));
    }

    #[test]
    fn update_fails_on_wrong_user() {
        let (mut store, _, user_id) = get_stores();
        let target = store
            .create(new_target(user_id, "Food", Amount::new(dec!(200)).unwrap()))
            .unwrap();

        let result = store.update(
            target.id(),
            UserID::new(user_id.as_i64() + 1),
            TargetUpdate {
                category: "Groceries".to_string(),
                kind: TransactionKind::Expense,
                target_amount: Amount::new(dec!(250)).unwrap(),
            },
        );

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn delete_fails_on_wrong_user() {
        let (mut store, _, user_id) = get_stores();
        let target = store
            .create(new_target(user_id, "Food", Amount::new(dec!(200)).unwrap()))
            .unwrap();

        let result = store.delete(target.id(), UserID::new(user_id.as_i64() + 1));

        assert_eq!(result, Err(Error::NotFound));
        assert!(store.get(target.id(), user_id).is_ok());
    }

    #[test]
    fn delete_removes_target() {
        let (mut store, _, user_id) = get_stores();
        let target = store
            .create(new_target(user_id, "Food", Amount::new(dec!(200)).unwrap()))
            .unwrap();

        store.delete(target.id(), user_id).unwrap();

        assert_eq!(store.get(target.id(), user_id), Err(Error::NotFound));
    }

    #[test]
    fn apply_progress_delta_accumulates() {
        let (mut store, _, user_id) = get_stores();
        store
            .create(new_target(user_id, "Food", Amount::new(dec!(200)).unwrap()))
            .unwrap();

        let target = store
            .apply_progress_delta(user_id, "Food", TransactionKind::Expense, dec!(49.99))
            .unwrap()
            .unwrap();

        assert_eq!(target.current_amount().as_decimal(), dec!(49.99));
    }

    #[test]
    fn apply_progress_delta_saturates_at_target_amount() {
        let (mut store, _, user_id) = get_stores();
        store
            .create(new_target(user_id, "Food", Amount::new(dec!(200)).unwrap()))
            .unwrap();

        store
            .apply_progress_delta(user_id, "Food", TransactionKind::Expense, dec!(150))
            .unwrap();
        let target = store
            .apply_progress_delta(user_id, "Food", TransactionKind::Expense, dec!(70))
            .unwrap()
            .unwrap();

        assert_eq!(target.current_amount().as_decimal(), dec!(200));
    }

    #[test]
    fn apply_progress_delta_floors_at_zero() {
        let (mut store, _, user_id) = get_stores();
        store
            .create(new_target(user_id, "Food", Amount::new(dec!(200)).unwrap()))
            .unwrap();

        store
            .apply_progress_delta(user_id, "Food", TransactionKind::Expense, dec!(30))
            .unwrap();
        let target = store
            .apply_progress_delta(user_id, "Food", TransactionKind::Expense, dec!(-70))
            .unwrap()
            .unwrap();

        assert_eq!(target.current_amount(), Amount::ZERO);
    }

    #[test]
    fn apply_progress_delta_without_target_is_no_op() {
        let (mut store, _, user_id) = get_stores();

        let result = store
            .apply_progress_delta(user_id, "Food", TransactionKind::Expense, dec!(10))
            .unwrap();

        assert_eq!(result, None);
    }

    #[test]
    fn recompute_progress_rebuilds_from_transactions() {
        let (mut store, mut transaction_store, user_id) = get_stores();
        let target = store
            .create(new_target(user_id, "Food", Amount::new(dec!(200)).unwrap()))
            .unwrap();

        transaction_store
            .create(new_transaction(user_id, "Food", Amount::new(dec!(120.50)).unwrap()))
            .unwrap();
        transaction_store
            .create(new_transaction(user_id, "Food", Amount::new(dec!(30)).unwrap()))
            .unwrap();
        // A transaction in another bucket should not count.
        transaction_store
            .create(new_transaction(user_id, "Rent", Amount::new(dec!(500)).unwrap()))
            .unwrap();

        let recomputed = store.recompute_progress(target.id(), user_id).unwrap();

        assert_eq!(recomputed.current_amount().as_decimal(), dec!(150.50));
    }

    #[test]
    fn recompute_progress_caps_at_target_amount() {
        let (mut store, mut transaction_store, user_id) = get_stores();
        let target = store
            .create(new_target(user_id, "Food", Amount::new(dec!(200)).unwrap()))
            .unwrap();

        transaction_store
            .create(new_transaction(user_id, "Food", Amount::new(dec!(350)).unwrap()))
            .unwrap();

        let recomputed = store.recompute_progress(target.id(), user_id).unwrap();

        assert_eq!(recomputed.current_amount().as_decimal(), dec!(200));
    }
}
