//! Defines the transaction store trait.

use crate::{
    models::{DatabaseID, NewTransaction, Transaction, UserID},
    Error,
};

/// Handles the creation and retrieval of transactions.
///
/// All lookups and mutations are scoped to the owning user: operating on another user's
/// transaction produces [Error::NotFound] so that clients cannot probe for other users'
/// data.
pub trait TransactionStore {
    /// Create a new transaction in the store.
    fn create(&mut self, new_transaction: NewTransaction) -> Result<Transaction, Error>;

    /// Retrieve the transaction with `id` belonging to `user_id`.
    fn get(&self, id: DatabaseID, user_id: UserID) -> Result<Transaction, Error>;

    /// Retrieve the transactions belonging to `user_id` in the way defined by `query`,
    /// most recent first.
    fn get_by_user(
        &self,
        user_id: UserID,
        query: TransactionQuery,
    ) -> Result<Vec<Transaction>, Error>;

    /// Overwrite the mutable fields of the transaction with `id` belonging to `user_id`.
    fn update(
        &mut self,
        id: DatabaseID,
        user_id: UserID,
        fields: NewTransaction,
    ) -> Result<Transaction, Error>;

    /// Delete the transaction with `id` belonging to `user_id`, returning the deleted
    /// transaction so that its fields can be reconciled against budget targets.
    fn delete(&mut self, id: DatabaseID, user_id: UserID) -> Result<Transaction, Error>;
}

/// Defines how transactions should be fetched from [TransactionStore::get_by_user].
#[derive(Debug, Default, Clone, Copy)]
pub struct TransactionQuery {
    /// Include only transactions filed under this calendar month (1-12).
    pub month: Option<u32>,
    /// Include only transactions filed under this calendar year.
    pub year: Option<i32>,
}
