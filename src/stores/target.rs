//! Defines the target store trait.

use rust_decimal::Decimal;

use crate::{
    models::{DatabaseID, NewTarget, Target, TargetUpdate, TransactionKind, UserID},
    Error,
};

/// Handles the creation, retrieval, and progress tracking of budget targets.
///
/// Lookups and mutations by ID are scoped to the owning user: operating on another
/// user's target produces [Error::NotFound].
///
/// The store does not enforce uniqueness of the (user, category, type) tuple; when
/// duplicates exist, matching operations deterministically pick the target with the
/// lowest ID.
pub trait TargetStore {
    /// Create a new target in the store with a progress counter of zero.
    ///
    /// # Errors
    /// Returns [Error::EmptyField] if the category is empty. The target amount is
    /// validated to be positive by construction of [crate::models::Amount].
    fn create(&mut self, new_target: NewTarget) -> Result<Target, Error>;

    /// Retrieve the target with `id` belonging to `user_id`.
    fn get(&self, id: DatabaseID, user_id: UserID) -> Result<Target, Error>;

    /// Retrieve all targets belonging to `user_id`.
    fn get_by_user(&self, user_id: UserID) -> Result<Vec<Target>, Error>;

    /// Find the target matching a transaction's (user, category, type) tuple.
    ///
    /// An absent target is not an error, it means no budget has been set for this
    /// bucket.
    fn find_target(
        &self,
        user_id: UserID,
        category: &str,
        kind: TransactionKind,
    ) -> Result<Option<Target>, Error>;

    /// Overwrite the user-editable fields of the target with `id` belonging to
    /// `user_id`.
    ///
    /// The progress counter is left untouched; callers that change the ceiling or the
    /// (category, type) bucket should follow up with [TargetStore::recompute_progress]
    /// to restore the counter's invariants.
    fn update(
        &mut self,
        id: DatabaseID,
        user_id: UserID,
        fields: TargetUpdate,
    ) -> Result<Target, Error>;

    /// Delete the target with `id` belonging to `user_id`.
    ///
    /// Deleting a target does not cascade to transactions; transactions that referenced
    /// it keep existing with their target reference cleared.
    fn delete(&mut self, id: DatabaseID, user_id: UserID) -> Result<(), Error>;

    /// Add a signed delta to the progress counter of the target matching
    /// (`user_id`, `category`, `kind`), saturating at zero and at the target amount.
    ///
    /// The read and write happen in a single conditional SQL statement, so two
    /// concurrent updates to the same counter cannot lose one another's effect.
    ///
    /// Returns the updated target, or `None` (a no-op) when no target matches.
    fn apply_progress_delta(
        &mut self,
        user_id: UserID,
        category: &str,
        kind: TransactionKind,
        delta: Decimal,
    ) -> Result<Option<Target>, Error>;

    /// Reset the progress counter of the target with `id` belonging to `user_id` to
    /// the sum of the matching transactions' amounts, capped at the target amount.
    ///
    /// Recomputing from the transaction table is idempotent, which makes this the safe
    /// replay path when an earlier incremental update may not have been applied.
    fn recompute_progress(&mut self, id: DatabaseID, user_id: UserID) -> Result<Target, Error>;
}
