//! The route handlers for notifications.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::{
    auth::Claims,
    models::{DatabaseID, NewNotification, Notification, NotificationKind},
    routes::non_empty,
    stores::NotificationStore,
    AppConfig, Error,
};

/// The body of a request to create a notification.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotification {
    /// The headline of the notification.
    title: String,
    /// The body of the notification.
    message: String,
    /// The severity of the notification. Defaults to `info`.
    #[serde(rename = "type", default)]
    kind: NotificationKind,
}

/// A route handler for creating a new notification.
pub async fn create_notification(
    State(mut state): State<AppConfig>,
    claims: Claims,
    Json(request): Json<CreateNotification>,
) -> Result<(StatusCode, Json<Notification>), Error> {
    let title = non_empty(request.title, "title")?;
    let message = non_empty(request.message, "message")?;

    let notification = state.notification_store.create(NewNotification {
        user_id: claims.sub,
        title,
        message,
        kind: request.kind,
    })?;

    Ok((StatusCode::CREATED, Json(notification)))
}

/// A route handler for listing the authenticated user's notifications, newest first.
pub async fn get_notifications(
    State(state): State<AppConfig>,
    claims: Claims,
) -> Result<Json<Vec<Notification>>, Error> {
    let notifications = state.notification_store.get_by_user(claims.sub)?;

    Ok(Json(notifications))
}

/// A route handler for getting a notification by its database ID.
///
/// This function will return the status code 404 if the notification does not exist
/// or belongs to another user.
pub async fn get_notification(
    State(state): State<AppConfig>,
    claims: Claims,
    Path(notification_id): Path<DatabaseID>,
) -> Result<Json<Notification>, Error> {
    let notification = state.notification_store.get(notification_id, claims.sub)?;

    Ok(Json(notification))
}

/// A route handler for marking a notification as read.
pub async fn mark_notification_read(
    State(mut state): State<AppConfig>,
    claims: Claims,
    Path(notification_id): Path<DatabaseID>,
) -> Result<Json<Notification>, Error> {
    let notification = state
        .notification_store
        .mark_read(notification_id, claims.sub)?;

    Ok(Json(notification))
}

/// A route handler for deleting a notification.
pub async fn delete_notification(
    State(mut state): State<AppConfig>,
    claims: Claims,
    Path(notification_id): Path<DatabaseID>,
) -> Result<StatusCode, Error> {
    state
        .notification_store
        .delete(notification_id, claims.sub)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod notification_route_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::json;

    use crate::{
        auth::AuthResponse,
        build_router,
        models::{Notification, NotificationKind},
        routes::endpoints,
        AppConfig,
    };

    fn get_test_app_config() -> AppConfig {
        let db_connection =
            Connection::open_in_memory().expect("Could not open database in memory.");

        AppConfig::new(db_connection, "42").expect("Could not create app config.")
    }

    async fn create_app_with_user() -> (TestServer, AuthResponse) {
        let app = build_router().with_state(get_test_app_config());
        let server = TestServer::new(app).expect("Could not create test server.");

        let response = server
            .post(endpoints::SIGN_UP)
            .content_type("application/json")
            .json(&json!({
                "email": "test@test.com",
                "username": "test",
                "password": "averysafepassword",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let auth = response.json::<AuthResponse>();

        (server, auth)
    }

    async fn create_notification(server: &TestServer, token: &str) -> Notification {
        let response = server
            .post(endpoints::NOTIFICATIONS)
            .authorization_bearer(token)
            .content_type("application/json")
            .json(&json!({
                "title": "Over budget",
                "message": "You have exceeded your Food budget.",
                "type": "warning",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);

        response.json::<Notification>()
    }

    #[tokio::test]
    async fn create_notification_defaults_to_info_and_unread() {
        let (server, auth) = create_app_with_user().await;

        let response = server
            .post(endpoints::NOTIFICATIONS)
            .authorization_bearer(&auth.token)
            .content_type("application/json")
            .json(&json!({
                "title": "Hello",
                "message": "Welcome aboard.",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let notification = response.json::<Notification>();

        assert_eq!(notification.kind(), NotificationKind::Info);
        assert!(!notification.is_read());
    }

    #[tokio::test]
    async fn create_notification_fails_on_empty_title() {
        let (server, auth) = create_app_with_user().await;

        server
            .post(endpoints::NOTIFICATIONS)
            .authorization_bearer(&auth.token)
            .content_type("application/json")
            .json(&json!({
                "title": " ",
                "message": "Welcome aboard.",
            }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn mark_notification_read_flips_flag() {
        let (server, auth) = create_app_with_user().await;
        let notification = create_notification(&server, &auth.token).await;

        let response = server
            .patch(&format!(
                "{}/{}/read",
                endpoints::NOTIFICATIONS,
                notification.id()
            ))
            .authorization_bearer(&auth.token)
            .await;

        response.assert_status_ok();
        assert!(response.json::<Notification>().is_read());
    }

    #[tokio::test]
    async fn get_notification_fails_on_wrong_user() {
        let (server, auth) = create_app_with_user().await;
        let notification = create_notification(&server, &auth.token).await;

        let response = server
            .post(endpoints::SIGN_UP)
            .content_type("application/json")
            .json(&json!({
                "email": "test2@test.com",
                "username": "test2",
                "password": "anothersafepassword",
            }))
            .await;
        let other_user = response.json::<AuthResponse>();

        server
            .get(&format!(
                "{}/{}",
                endpoints::NOTIFICATIONS,
                notification.id()
            ))
            .authorization_bearer(other_user.token)
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn delete_notification_removes_it() {
        let (server, auth) = create_app_with_user().await;
        let notification = create_notification(&server, &auth.token).await;

        server
            .delete(&format!(
                "{}/{}",
                endpoints::NOTIFICATIONS,
                notification.id()
            ))
            .authorization_bearer(&auth.token)
            .await
            .assert_status(StatusCode::NO_CONTENT);

        server
            .get(&format!(
                "{}/{}",
                endpoints::NOTIFICATIONS,
                notification.id()
            ))
            .authorization_bearer(&auth.token)
            .await
            .assert_status_not_found();
    }
}
