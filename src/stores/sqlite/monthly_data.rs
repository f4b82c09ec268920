//! Implements a SQLite backed monthly data store.

use std::sync::{Arc, Mutex};

use rusqlite::{named_params, Connection, Row};
use rust_decimal::Decimal;

use crate::{
    db::{CreateTable, MapRow},
    models::{cents_to_decimal, decimal_to_cents, MonthlyData, MonthlyDataInput, UserID},
    stores::MonthlyDataStore,
    Error,
};

const MONTHLY_DATA_COLUMNS: &str =
    "id, user_id, month, year, total_income, total_expenses, available_balance, net_worth";

/// Stores per-month aggregate figures in a SQLite database.
///
/// Amounts are stored as integer cents.
#[derive(Debug, Clone)]
pub struct SQLiteMonthlyDataStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteMonthlyDataStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl MonthlyDataStore for SQLiteMonthlyDataStore {
    /// Retrieve all monthly records belonging to `user_id`, most recent month first.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL error.
    fn get_by_user(&self, user_id: UserID) -> Result<Vec<MonthlyData>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {MONTHLY_DATA_COLUMNS} FROM monthly_data
                 WHERE user_id = :user_id ORDER BY year DESC, month DESC"
            ))?
            .query_map(&[(":user_id", &user_id.as_i64())], Self::map_row)?
            .map(|maybe_record| maybe_record.map_err(Error::SqlError))
            .collect()
    }

    /// Find the record for a specific month and year, if one exists.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL error.
    fn find(&self, user_id: UserID, month: u32, year: i32) -> Result<Option<MonthlyData>, Error> {
        let result = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {MONTHLY_DATA_COLUMNS} FROM monthly_data
                 WHERE user_id = :user_id AND month = :month AND year = :year"
            ))?
            .query_row(
                named_params! {
                    ":user_id": user_id.as_i64(),
                    ":month": month,
                    ":year": year,
                },
                Self::map_row,
            );

        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    /// Retrieve the records for a calendar year in month order.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL error.
    fn get_year(&self, user_id: UserID, year: i32) -> Result<Vec<MonthlyData>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {MONTHLY_DATA_COLUMNS} FROM monthly_data
                 WHERE user_id = :user_id AND year = :year ORDER BY month ASC"
            ))?
            .query_map(
                named_params! {":user_id": user_id.as_i64(), ":year": year},
                Self::map_row,
            )?
            .map(|maybe_record| maybe_record.map_err(Error::SqlError))
            .collect()
    }

    /// Create or update the record for the month named by `input`.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL error.
    fn upsert(
        &mut self,
        user_id: UserID,
        input: MonthlyDataInput,
    ) -> Result<(MonthlyData, bool), Error> {
        if let Some(existing) = self.find(user_id, input.month, input.year)? {
            let updated = MonthlyData::new(
                existing.id(),
                user_id,
                existing.month(),
                existing.year(),
                input.total_income.unwrap_or(existing.total_income()),
                input.total_expenses.unwrap_or(existing.total_expenses()),
                input
                    .available_balance
                    .unwrap_or(existing.available_balance()),
                input.net_worth.unwrap_or(existing.net_worth()),
            );

            self.connection.lock().unwrap().execute(
                "UPDATE monthly_data
                 SET total_income = ?1, total_expenses = ?2, available_balance = ?3,
                     net_worth = ?4
                 WHERE id = ?5",
                (
                    decimal_to_cents(updated.total_income()),
                    decimal_to_cents(updated.total_expenses()),
                    decimal_to_cents(updated.available_balance()),
                    decimal_to_cents(updated.net_worth()),
                    updated.id(),
                ),
            )?;

            return Ok((updated, false));
        }

        let total_income = input.total_income.unwrap_or(Decimal::ZERO);
        let total_expenses = input.total_expenses.unwrap_or(Decimal::ZERO);
        let available_balance = input.available_balance.unwrap_or(Decimal::ZERO);
        let net_worth = input.net_worth.unwrap_or(Decimal::ZERO);

        let connection = self.connection.lock().unwrap();
        connection.execute(
            "INSERT INTO monthly_data
                (user_id, month, year, total_income, total_expenses, available_balance, net_worth)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            (
                user_id.as_i64(),
                input.month,
                input.year,
                decimal_to_cents(total_income),
                decimal_to_cents(total_expenses),
                decimal_to_cents(available_balance),
                decimal_to_cents(net_worth),
            ),
        )?;

        let record = MonthlyData::new(
            connection.last_insert_rowid(),
            user_id,
            input.month,
            input.year,
            total_income,
            total_expenses,
            available_balance,
            net_worth,
        );

        Ok((record, true))
    }
}

impl CreateTable for SQLiteMonthlyDataStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS monthly_data (
                    id INTEGER PRIMARY KEY,
                    user_id INTEGER NOT NULL,
                    month INTEGER NOT NULL,
                    year INTEGER NOT NULL,
                    total_income INTEGER NOT NULL DEFAULT 0,
                    total_expenses INTEGER NOT NULL DEFAULT 0,
                    available_balance INTEGER NOT NULL DEFAULT 0,
                    net_worth INTEGER NOT NULL DEFAULT 0,
                    UNIQUE(user_id, month, year),
                    FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteMonthlyDataStore {
    type ReturnType = MonthlyData;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        Ok(MonthlyData::new(
            row.get(offset)?,
            UserID::new(row.get(offset + 1)?),
            row.get(offset + 2)?,
            row.get(offset + 3)?,
            cents_to_decimal(row.get(offset + 4)?),
            cents_to_decimal(row.get(offset + 5)?),
            cents_to_decimal(row.get(offset + 6)?),
            cents_to_decimal(row.get(offset + 7)?),
        ))
    }
}

#[cfg(test)]
mod sqlite_monthly_data_store_tests {
    use std::str::FromStr;
    use std::sync::{Arc, Mutex};

    use email_address::EmailAddress;
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::{
        db::initialize,
        models::{MonthlyDataInput, NewUser, PasswordHash, UserID},
        stores::{sqlite::SQLiteUserStore, MonthlyDataStore, UserStore},
    };

    use super::SQLiteMonthlyDataStore;

    fn get_store() -> (SQLiteMonthlyDataStore, UserID) {
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

        (SQLiteMonthlyDataStore::new(connection), user.id())
    }

    fn input(month: u32, year: i32, total_income: Decimal) -> MonthlyDataInput {
        MonthlyDataInput {
            month,
            year,
            total_income: Some(total_income),
            total_expenses: Some(dec!(100)),
            available_balance: None,
            net_worth: None,
        }
    }

    #[test]
    fn upsert_creates_record_with_zero_defaults() {
        let (mut store, user_id) = get_store();

        let (record, created) = store.upsert(user_id, input(8, 2024, dec!(1000))).unwrap();

        assert!(created);
        assert_eq!(record.total_income(), dec!(1000));
        assert_eq!(record.total_expenses(), dec!(100));
        assert_eq!(record.available_balance(), Decimal::ZERO);
        assert_eq!(record.net_worth(), Decimal::ZERO);
    }

    #[test]
    fn upsert_updates_existing_record_and_keeps_unset_fields() {
        let (mut store, user_id) = get_store();
        store.upsert(user_id, input(8, 2024, dec!(1000))).unwrap();

        let (record, created) = store
            .upsert(
                user_id,
                MonthlyDataInput {
                    month: 8,
                    year: 2024,
                    total_income: Some(dec!(1500)),
                    total_expenses: None,
                    available_balance: None,
                    net_worth: None,
                },
            )
            .unwrap();

        assert!(!created);
        assert_eq!(record.total_income(), dec!(1500));
        // Unset fields keep their previous values.
        assert_eq!(record.total_expenses(), dec!(100));
    }

    #[test]
    fn find_returns_none_for_missing_month() {
        let (store, user_id) = get_store();

        assert_eq!(store.find(user_id, 1, 2024).unwrap(), None);
    }

    #[test]
    fn get_by_user_orders_most_recent_first() {
        let (mut store, user_id) = get_store();
        store.upsert(user_id, input(1, 2024, dec!(1))).unwrap();
        store.upsert(user_id, input(12, 2023, dec!(2))).unwrap();
        store.upsert(user_id, input(3, 2024, dec!(3))).unwrap();

        let records = store.get_by_user(user_id).unwrap();
        let months: Vec<(i32, u32)> = records
            .iter()
            .map(|record| (record.year(), record.month()))
            .collect();

        assert_eq!(months, vec![(2024, 3), (2024, 1), (2023, 12)]);
    }

    #[test]
    fn get_year_returns_months_in_order() {
        let (mut store, user_id) = get_store();
        store.upsert(user_id, input(3, 2024, dec!(3))).unwrap();
        store.upsert(user_id, input(1, 2024, dec!(1))).unwrap();
        store.upsert(user_id, input(1, 2023, dec!(9))).unwrap();

        let records = store.get_year(user_id, 2024).unwrap();
        let months: Vec<u32> = records.iter().map(|record| record.month()).collect();

        assert_eq!(months, vec![1, 3]);
    }
}
