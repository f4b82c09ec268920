//! In-app notifications shown to the user.

use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::{DatabaseID, UserID};

/// The severity of a notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// General information.
    #[default]
    Info,
    /// Something went well.
    Success,
    /// Something needs the user's attention.
    Warning,
    /// Something went wrong.
    Error,
}

impl NotificationKind {
    /// The kind as the lowercase string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Info => "info",
            NotificationKind::Success => "success",
            NotificationKind::Warning => "warning",
            NotificationKind::Error => "error",
        }
    }
}

/// The error returned when a string does not name a notification kind.
#[derive(Debug, thiserror::Error)]
#[error("{0} is not a valid notification type")]
pub struct ParseNotificationKindError(String);

impl FromStr for NotificationKind {
    type Err = ParseNotificationKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(NotificationKind::Info),
            "success" => Ok(NotificationKind::Success),
            "warning" => Ok(NotificationKind::Warning),
            "error" => Ok(NotificationKind::Error),
            other => Err(ParseNotificationKindError(other.to_string())),
        }
    }
}

/// A notification delivered to a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    id: DatabaseID,
    user_id: UserID,
    title: String,
    message: String,
    #[serde(rename = "type")]
    kind: NotificationKind,
    is_read: bool,
    created_at: NaiveDateTime,
}

impl Notification {
    /// Create a new `Notification`.
    ///
    /// Note that this does *not* add the notification to the application database.
    pub fn new(
        id: DatabaseID,
        user_id: UserID,
        title: String,
        message: String,
        kind: NotificationKind,
        is_read: bool,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            user_id,
            title,
            message,
            kind,
            is_read,
            created_at,
        }
    }

    /// The ID of the notification.
    pub fn id(&self) -> DatabaseID {
        self.id
    }

    /// The ID of the user the notification was delivered to.
    pub fn user_id(&self) -> UserID {
        self.user_id
    }

    /// The headline of the notification.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The body of the notification.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The severity of the notification.
    pub fn kind(&self) -> NotificationKind {
        self.kind
    }

    /// Whether the user has read the notification.
    pub fn is_read(&self) -> bool {
        self.is_read
    }

    /// When the notification was created.
    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }
}

/// The data for creating a new notification.
#[derive(Debug, Clone)]
pub struct NewNotification {
    /// The ID of the user to notify.
    pub user_id: UserID,
    /// The headline of the notification.
    pub title: String,
    /// The body of the notification.
    pub message: String,
    /// The severity of the notification.
    pub kind: NotificationKind,
}
