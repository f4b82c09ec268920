//! Defines the monthly data store trait.

use crate::{
    models::{MonthlyData, MonthlyDataInput, UserID},
    Error,
};

/// Handles the storage of per-month aggregate figures.
pub trait MonthlyDataStore {
    /// Retrieve all monthly records belonging to `user_id`, most recent month first.
    fn get_by_user(&self, user_id: UserID) -> Result<Vec<MonthlyData>, Error>;

    /// Find the record for a specific month and year, if one exists.
    fn find(&self, user_id: UserID, month: u32, year: i32) -> Result<Option<MonthlyData>, Error>;

    /// Retrieve the records for a calendar year in month order.
    fn get_year(&self, user_id: UserID, year: i32) -> Result<Vec<MonthlyData>, Error>;

    /// Create or update the record for the month named by `input`.
    ///
    /// Fields left unset in `input` keep their existing value, or default to zero when
    /// the record is being created. The returned flag is true when a new record was
    /// created.
    fn upsert(
        &mut self,
        user_id: UserID,
        input: MonthlyDataInput,
    ) -> Result<(MonthlyData, bool), Error>;
}
