//! Notification endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::notification::{Notification, NotificationQuery},
};

use super::AuthenticatedUser;

/// List the calling user's notifications
#[utoipa::path(
    get,
    path = "/notifications",
    tag = "notifications",
    security(("bearer_auth" = [])),
    params(NotificationQuery),
    responses(
        (status = 200, description = "Notifications, newest first", body = Vec<Notification>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_notifications(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<NotificationQuery>,
) -> AppResult<Json<Vec<Notification>>> {
    let notifications = state
        .services
        .notifications
        .list(
            &claims.sub,
            query.unread_only.unwrap_or(true),
            query.limit.unwrap_or(10),
        )
        .await?;
    Ok(Json(notifications))
}

/// Mark one of the calling user's notifications as read
#[utoipa::path(
    put,
    path = "/notifications/{id}/read",
    tag = "notifications",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification marked read", body = Notification),
        (status = 404, description = "No unread notification with this ID belongs to the caller")
    )
)]
pub async fn mark_notification_read(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Notification>> {
    let notification = state.services.notifications.mark_read(id, &claims.sub).await?;
    Ok(Json(notification))
}
