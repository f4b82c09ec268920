//! Defines the notification store trait.

use crate::{
    models::{DatabaseID, NewNotification, Notification, UserID},
    Error,
};

/// Handles the creation and retrieval of notifications.
///
/// All lookups and mutations are scoped to the owning user: operating on another user's
/// notification produces [Error::NotFound].
pub trait NotificationStore {
    /// Create a new, unread notification in the store.
    fn create(&mut self, new_notification: NewNotification) -> Result<Notification, Error>;

    /// Retrieve the notification with `id` belonging to `user_id`.
    fn get(&self, id: DatabaseID, user_id: UserID) -> Result<Notification, Error>;

    /// Retrieve the notifications belonging to `user_id`, newest first.
    fn get_by_user(&self, user_id: UserID) -> Result<Vec<Notification>, Error>;

    /// Mark the notification with `id` belonging to `user_id` as read.
    fn mark_read(&mut self, id: DatabaseID, user_id: UserID) -> Result<Notification, Error>;

    /// Delete the notification with `id` belonging to `user_id`.
    fn delete(&mut self, id: DatabaseID, user_id: UserID) -> Result<(), Error>;
}
