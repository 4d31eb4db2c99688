//! Notification service

use crate::{
    error::AppResult,
    models::notification::Notification,
    repository::Repository,
};

#[derive(Clone)]
pub struct NotificationsService {
    repository: Repository,
}

impl NotificationsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Record a notification for a user
    pub async fn notify(&self, user_id: &str, message: &str, link: Option<&str>) -> AppResult<Notification> {
        self.repository.notifications.create(user_id, message, link).await
    }

    /// Notifications for the calling user, newest first
    pub async fn list(&self, user_id: &str, unread_only: bool, limit: i64) -> AppResult<Vec<Notification>> {
        self.repository.notifications.list_for_user(user_id, unread_only, limit).await
    }

    /// Mark one of the calling user's unread notifications as read
    pub async fn mark_read(&self, id: i32, user_id: &str) -> AppResult<Notification> {
        self.repository.notifications.mark_read(id, user_id).await
    }
}
