//! Notification model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::{NotificationId, NotificationKind, OrderId, UserId};

/// A notification shown to a user.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Notification {
    /// Unique notification ID.
    pub id: NotificationId,
    /// Recipient.
    pub user_id: UserId,
    /// What this notification is about.
    pub kind: NotificationKind,
    /// Human-readable message.
    pub body: String,
    /// Related order, if any.
    pub order_id: Option<OrderId>,
    /// Whether the user has seen it.
    pub read: bool,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}
