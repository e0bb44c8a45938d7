//! Notification routes.

use axum::{
    Json,
    extract::{Path, Query, State},
};

use bazaar_core::NotificationId;

use crate::db::notifications::NotificationRepository;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::Notification;
use crate::state::AppState;

use super::Pagination;

/// List the caller's notifications, unread first.
///
/// GET /api/notifications
///
/// # Errors
///
/// Returns 401 without a valid token.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Notification>>> {
    let notifications = NotificationRepository::new(state.pool())
        .list_for_user(ctx.user_id, page.limit(), page.offset())
        .await?;

    Ok(Json(notifications))
}

/// Mark a notification as read.
///
/// POST /api/notifications/{id}/read
///
/// # Errors
///
/// Returns 404 if the notification doesn't exist or belongs to someone else.
pub async fn mark_read(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Path(id): Path<NotificationId>,
) -> Result<Json<serde_json::Value>> {
    NotificationRepository::new(state.pool())
        .mark_read(id, ctx.user_id)
        .await?;

    Ok(Json(serde_json::json!({ "ok": true })))
}

/// Mark every notification as read.
///
/// POST /api/notifications/read-all
///
/// # Errors
///
/// Returns 500 if the update fails.
pub async fn mark_all_read(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
) -> Result<Json<serde_json::Value>> {
    let updated = NotificationRepository::new(state.pool())
        .mark_all_read(ctx.user_id)
        .await?;

    Ok(Json(serde_json::json!({ "ok": true, "updated": updated })))
}
