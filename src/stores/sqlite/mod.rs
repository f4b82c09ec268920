//! SQLite backed implementations of the store traits.

mod monthly_data;
mod notification;
mod target;
mod transaction;
mod user;

pub use monthly_data::SQLiteMonthlyDataStore;
pub use notification::SQLiteNotificationStore;
pub use target::SQLiteTargetStore;
pub use transaction::SQLiteTransactionStore;
pub use user::SQLiteUserStore;
