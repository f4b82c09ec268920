//! Contains traits and implementations for objects that store the domain
//! [models](crate::models).

mod monthly_data;
mod notification;
mod target;
mod transaction;
mod user;

pub mod sqlite;

pub use monthly_data::MonthlyDataStore;
pub use notification::NotificationStore;
pub use target::TargetStore;
pub use transaction::{TransactionQuery, TransactionStore};
pub use user::UserStore;
