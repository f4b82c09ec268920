//! Implements a SQLite backed transaction store.

use std::sync::{Arc, Mutex};

use rusqlite::{named_params, params_from_iter, types::Value, Connection, Row};

use crate::{
    db::{CreateTable, MapRow},
    models::{Amount, DatabaseID, NewTransaction, Transaction, UserID},
    stores::{TransactionQuery, TransactionStore},
    Error,
};

const TRANSACTION_COLUMNS: &str =
    "id, user_id, kind, amount, category, description, date, month, year, target_id";

/// Stores transactions in a SQLite database.
///
/// Note that because a transaction references the [User](crate::models::User) and
/// [Target](crate::models::Target) models, their tables must be set up in the database.
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl TransactionStore for SQLiteTransactionStore {
    /// Create a new transaction in the database.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL error, e.g. the
    /// target ID does not refer to a valid target.
    fn create(&mut self, new_transaction: NewTransaction) -> Result<Transaction, Error> {
        let connection = self.connection.lock().unwrap();

        connection.execute(
            "INSERT INTO \"transaction\"
                (user_id, kind, amount, category, description, date, month, year, target_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            (
                new_transaction.user_id.as_i64(),
                new_transaction.kind.as_str(),
                new_transaction.amount.as_cents(),
                &new_transaction.category,
                &new_transaction.description,
                new_transaction.date,
                new_transaction.month,
                new_transaction.year,
                new_transaction.target_id,
            ),
        )?;

        let id = connection.last_insert_rowid();

        Ok(Transaction::new(
            id,
            new_transaction.user_id,
            new_transaction.kind,
            new_transaction.amount,
            new_transaction.category,
            new_transaction.description,
            new_transaction.date,
            new_transaction.month,
            new_transaction.year,
            new_transaction.target_id,
        ))
    }

    /// Retrieve the transaction with `id` belonging to `user_id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if the transaction does not exist or belongs to another user,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, id: DatabaseID, user_id: UserID) -> Result<Transaction, Error> {
        let transaction = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\"
                 WHERE id = :id AND user_id = :user_id"
            ))?
            .query_row(
                named_params! {":id": id, ":user_id": user_id.as_i64()},
                Self::map_row,
            )?;

        Ok(transaction)
    }

    /// Query for the transactions belonging to `user_id`, most recent first.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL error.
    fn get_by_user(
        &self,
        user_id: UserID,
        query: TransactionQuery,
    ) -> Result<Vec<Transaction>, Error> {
        let mut sql = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE user_id = ?1"
        );
        let mut query_parameters = vec![Value::Integer(user_id.as_i64())];

        if let Some(month) = query.month {
            query_parameters.push(Value::Integer(month as i64));
            sql.push_str(&format!(" AND month = ?{}", query_parameters.len()));
        }

        if let Some(year) = query.year {
            query_parameters.push(Value::Integer(year as i64));
            sql.push_str(&format!(" AND year = ?{}", query_parameters.len()));
        }

        sql.push_str(" ORDER BY date DESC, id DESC");

        self.connection
            .lock()
            .unwrap()
            .prepare(&sql)?
            .query_map(params_from_iter(query_parameters.iter()), Self::map_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::SqlError))
            .collect()
    }

    /// Overwrite the mutable fields of the transaction with `id` belonging to
    /// `user_id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if the transaction does not exist or belongs to another user,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update(
        &mut self,
        id: DatabaseID,
        user_id: UserID,
        fields: NewTransaction,
    ) -> Result<Transaction, Error> {
        let rows_updated = self.connection.lock().unwrap().execute(
            "UPDATE \"transaction\"
             SET kind = ?1, amount = ?2, category = ?3, description = ?4, date = ?5,
                 month = ?6, year = ?7, target_id = ?8
             WHERE id = ?9 AND user_id = ?10",
            (
                fields.kind.as_str(),
                fields.amount.as_cents(),
                &fields.category,
                &fields.description,
                fields.date,
                fields.month,
                fields.year,
                fields.target_id,
                id,
                user_id.as_i64(),
            ),
        )?;

        if rows_updated == 0 {
            return Err(Error::NotFound);
        }

        Ok(Transaction::new(
            id,
            user_id,
            fields.kind,
            fields.amount,
            fields.category,
            fields.description,
            fields.date,
            fields.month,
            fields.year,
            fields.target_id,
        ))
    }

    /// Delete the transaction with `id` belonging to `user_id`, returning the deleted
    /// row.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if the transaction does not exist or belongs to another user,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&mut self, id: DatabaseID, user_id: UserID) -> Result<Transaction, Error> {
        let transaction = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "DELETE FROM \"transaction\" WHERE id = :id AND user_id = :user_id
                 RETURNING {TRANSACTION_COLUMNS}"
            ))?
            .query_row(
                named_params! {":id": id, ":user_id": user_id.as_i64()},
                Self::map_row,
            )?;

        Ok(transaction)
    }
}

impl CreateTable for SQLiteTransactionStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS \"transaction\" (
                    id INTEGER PRIMARY KEY,
                    user_id INTEGER NOT NULL,
                    kind TEXT NOT NULL,
                    amount INTEGER NOT NULL,
                    category TEXT NOT NULL,
                    description TEXT NOT NULL,
                    date TEXT NOT NULL,
                    month INTEGER NOT NULL,
                    year INTEGER NOT NULL,
                    target_id INTEGER,
                    FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                    FOREIGN KEY(target_id) REFERENCES target(id) ON UPDATE CASCADE ON DELETE SET NULL
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteTransactionStore {
    type ReturnType = Transaction;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let user_id = UserID::new(row.get(offset + 1)?);

        let raw_kind: String = row.get(offset + 2)?;
        let kind = raw_kind.parse().map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(
                offset + 2,
                rusqlite::types::Type::Text,
                Box::new(error),
            )
        })?;

        let amount = Amount::from_cents(row.get(offset + 3)?);
        let category = row.get(offset + 4)?;
        let description = row.get(offset + 5)?;
        let date = row.get(offset + 6)?;
        let month = row.get(offset + 7)?;
        let year = row.get(offset + 8)?;
        let target_id = row.get(offset + 9)?;

        Ok(Transaction::new(
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
        ))
    }
}
