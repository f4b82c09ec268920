//! Defines and implements traits for interacting with the application's database.

use rusqlite::{Connection, Row, Transaction as SqlTransaction};

use crate::{
    stores::sqlite::{
        SQLiteMonthlyDataStore, SQLiteNotificationStore, SQLiteTargetStore,
        SQLiteTransactionStore, SQLiteUserStore,
    },
    Error,
};

/// A trait for adding an object schema to a database.
pub trait CreateTable {
    /// Create a table for the model.
    ///
    /// # Errors
    /// Returns an error if the table already exists or if there is an SQL error.
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error>;
}

/// A trait for mapping a `rusqlite::Row` from a SQLite database to a concrete rust type.
pub trait MapRow {
    /// The type that the row is converted into.
    type ReturnType;

    /// Convert a row into a concrete type.
    ///
    /// **Note:** This function expects that the row object contains all the table columns
    /// in the order they were defined.
    ///
    /// # Errors
    /// Returns an error if a row item cannot be converted into the corresponding rust
    /// type, or if an invalid column index was used.
    fn map_row(row: &Row) -> Result<Self::ReturnType, rusqlite::Error> {
        Self::map_row_with_offset(row, 0)
    }

    /// Convert a row into a concrete type.
    ///
    /// The `offset` indicates which column the row should be read from. This is useful in
    /// cases where tables have been joined and you want to construct two different types
    /// from the one query.
    ///
    /// # Errors
    /// Returns an error if a row item cannot be converted into the corresponding rust
    /// type, or if an invalid column index was used.
    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error>;
}

/// Create the tables for all of the application's models.
///
/// # Errors
/// Returns an error if any of the tables could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    SQLiteUserStore::create_table(&transaction)?;
    SQLiteTargetStore::create_table(&transaction)?;
    SQLiteTransactionStore::create_table(&transaction)?;
    SQLiteMonthlyDataStore::create_table(&transaction)?;
    SQLiteNotificationStore::create_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
