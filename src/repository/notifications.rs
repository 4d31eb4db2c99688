//! Notifications repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::notification::Notification,
};

#[derive(Clone)]
pub struct NotificationsRepository {
    pool: Pool<Postgres>,
}

impl NotificationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Create a notification for a user
    pub async fn create(
        &self,
        user_id: &str,
        message: &str,
        link: Option<&str>,
    ) -> AppResult<Notification> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (user_id, message, link)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(message)
        .bind(link)
        .fetch_one(&self.pool)
        .await?;
        Ok(notification)
    }

    /// Notifications for a user, newest first
    pub async fn list_for_user(
        &self,
        user_id: &str,
        unread_only: bool,
        limit: i64,
    ) -> AppResult<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE user_id = $1 AND (NOT $2 OR read = FALSE)
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(unread_only)
        .bind(limit.clamp(1, 100))
        .fetch_all(&self.pool)
        .await?;
        Ok(notifications)
    }

    /// Mark a notification read.
    ///
    /// The update only matches when the notification exists, belongs to the
    /// caller AND is still unread; all three failures collapse into the same
    /// NotFoundOrForbidden so ownership cannot be probed.
    pub async fn mark_read(&self, id: i32, user_id: &str) -> AppResult<Notification> {
        sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications SET read = TRUE
            WHERE id = $1 AND user_id = $2 AND read = FALSE
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            AppError::NotFoundOrForbidden(format!("Notification {} not found", id))
        })
    }
}
