//! In-app notification model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// Notification record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Notification {
    pub id: i32,
    /// Recipient's identity-provider user id
    pub user_id: String,
    pub message: String,
    /// Optional in-app navigation target
    pub link: Option<String>,
    /// Never reset to false once set
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Notification listing filter
#[derive(Debug, Deserialize, IntoParams)]
pub struct NotificationQuery {
    /// Only unread notifications (default: true)
    pub unread_only: Option<bool>,
    /// Maximum number returned (default: 10)
    pub limit: Option<i64>,
}
