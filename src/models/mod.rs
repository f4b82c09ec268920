//! The domain models for the application and their supporting types.

mod amount;
mod monthly_data;
mod notification;
mod password;
mod target;
mod transaction;
mod user;

pub use amount::Amount;
pub(crate) use amount::{cents_to_decimal, decimal_to_cents};
pub use monthly_data::{MonthlyData, MonthlyDataInput};
pub use notification::{NewNotification, Notification, NotificationKind, ParseNotificationKindError};
pub use password::{PasswordHash, RawPassword, MIN_PASSWORD_LENGTH};
pub use target::{NewTarget, Target, TargetUpdate};
pub use transaction::{
    derive_month_year, NewTransaction, ParseTransactionKindError, Transaction, TransactionKind,
};
pub use user::{NewUser, User, UserID};

/// An alias for the integer type used for database primary keys.
pub type DatabaseID = i64;
