//! Implements a SQLite backed notification store.

use std::sync::{Arc, Mutex};

use rusqlite::{named_params, Connection, Row};

use crate::{
    db::{CreateTable, MapRow},
    models::{DatabaseID, NewNotification, Notification, UserID},
    stores::NotificationStore,
    Error,
};

const NOTIFICATION_COLUMNS: &str = "id, user_id, title, message, kind, is_read, created_at";

/// Stores notifications in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteNotificationStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteNotificationStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl NotificationStore for SQLiteNotificationStore {
    /// Create a new, unread notification in the database.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL error.
    fn create(&mut self, new_notification: NewNotification) -> Result<Notification, Error> {
        let notification = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "INSERT INTO notification (user_id, title, message, kind)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING {NOTIFICATION_COLUMNS}"
            ))?
            .query_row(
                (
                    new_notification.user_id.as_i64(),
                    &new_notification.title,
                    &new_notification.message,
                    new_notification.kind.as_str(),
                ),
                Self::map_row,
            )?;

        Ok(notification)
    }

    /// Retrieve the notification with `id` belonging to `user_id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if the notification does not exist or belongs to another
    ///   user,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, id: DatabaseID, user_id: UserID) -> Result<Notification, Error> {
        let notification = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {NOTIFICATION_COLUMNS} FROM notification
                 WHERE id = :id AND user_id = :user_id"
            ))?
            .query_row(
                named_params! {":id": id, ":user_id": user_id.as_i64()},
                Self::map_row,
            )?;

        Ok(notification)
    }

    /// Retrieve the notifications belonging to `user_id`, newest first.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL error.
    fn get_by_user(&self, user_id: UserID) -> Result<Vec<Notification>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {NOTIFICATION_COLUMNS} FROM notification
                 WHERE user_id = :user_id ORDER BY created_at DESC, id DESC"
            ))?
            .query_map(&[(":user_id", &user_id.as_i64())], Self::map_row)?
            .map(|maybe_notification| maybe_notification.map_err(Error::SqlError))
            .collect()
    }

    /// Mark the notification with `id` belonging to `user_id` as read.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if the notification does not exist or belongs to another
    ///   user,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn mark_read(&mut self, id: DatabaseID, user_id: UserID) -> Result<Notification, Error> {
        let notification = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "UPDATE notification SET is_read = 1
                 WHERE id = :id AND user_id = :user_id
                 RETURNING {NOTIFICATION_COLUMNS}"
            ))?
            .query_row(
                named_params! {":id": id, ":user_id": user_id.as_i64()},
                Self::map_row,
            )?;

        Ok(notification)
    }

    /// Delete the notification with `id` belonging to `user_id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if the notification does not exist or belongs to another
    ///   user,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&mut self, id: DatabaseID, user_id: UserID) -> Result<(), Error> {
        let rows_deleted = self.connection.lock().unwrap().execute(
            "DELETE FROM notification WHERE id = ?1 AND user_id = ?2",
            (id, user_id.as_i64()),
        )?;

        if rows_deleted == 0 {
            Err(Error::NotFound)
        } else {
            Ok(())
        }
    }
}

impl CreateTable for SQLiteNotificationStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS notification (
                    id INTEGER PRIMARY KEY,
                    user_id INTEGER NOT NULL,
                    title TEXT NOT NULL,
                    message TEXT NOT NULL,
                    kind TEXT NOT NULL DEFAULT 'info',
                    is_read INTEGER NOT NULL DEFAULT 0,
                    created_at TEXT NOT NULL DEFAULT (datetime('now')),
                    FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteNotificationStore {
    type ReturnType = Notification;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let user_id = UserID::new(row.get(offset + 1)?);
        let title = row.get(offset + 2)?;
        let message = row.get(offset + 3)?;

        let raw_kind: String = row.get(offset + 4)?;
        let kind = raw_kind.parse().map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(
                offset + 4,
                rusqlite::types::Type::Text,
                Box::new(error),
            )
        })?;

        let is_read = row.get(offset + 5)?;
        let created_at = row.get(offset + 6)?;

        Ok(Notification::new(
            id, user_id, title, message, kind, is_read, created_at,
        ))
    }
}
