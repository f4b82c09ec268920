//! The paths for the API's routes.

/// Register a new user.
pub const SIGN_UP: &str = "/api/signup";
/// Exchange credentials for a bearer token.
pub const LOG_IN: &str = "/api/login";
/// The authenticated user's profile.
pub const PROFILE: &str = "/api/protected";

/// List or create transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// Get, update, or delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/:transaction_id";

/// List or create budget targets.
pub const TARGETS: &str = "/api/targets";
/// Get, update, or delete a single budget target.
pub const TARGET: &str = "/api/targets/:target_id";

/// List or upsert monthly aggregate figures.
pub const MONTHLY_DATA: &str = "/api/monthly-data";
/// The dashboard summary of the current and previous months.
pub const MONTHLY_SUMMARY: &str = "/api/monthly-data/summary";
/// The zero-filled twelve month view of a year.
pub const YEAR_SUMMARY: &str = "/api/monthly-data/year-summary/:year";
/// The figures for a specific month.
pub const MONTHLY_DATA_MONTH: &str = "/api/monthly-data/:month/:year";

/// List or create notifications.
pub const NOTIFICATIONS: &str = "/api/notifications";
/// Get or delete a single notification.
pub const NOTIFICATION: &str = "/api/notifications/:notification_id";
/// Mark a notification as read.
pub const NOTIFICATION_READ: &str = "/api/notifications/:notification_id/read";
