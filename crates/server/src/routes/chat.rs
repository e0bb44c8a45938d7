//! Chat routes.
//!
//! A room pairs a buyer with a store. The buyer and the store owner can both
//! read and post; the seller also gets a notification for incoming messages.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use bazaar_core::{ChatRoomId, NotificationKind, StoreId};

use crate::db::RepositoryError;
use crate::db::chat::ChatRepository;
use crate::db::notifications::NotificationRepository;
use crate::db::stores::StoreRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{ChatMessage, ChatRoom};
use crate::state::AppState;

use super::Pagination;

/// Request to open (or reopen) a conversation with a store.
#[derive(Debug, Deserialize)]
pub struct OpenRoomRequest {
    pub store_id: StoreId,
}

/// Request to post a message.
#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    pub body: String,
}

/// Open the caller's room with a store, creating it on first use.
///
/// POST /api/chat/rooms
///
/// # Errors
///
/// Returns 404 if the store doesn't exist.
pub async fn open_room(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Json(req): Json<OpenRoomRequest>,
) -> Result<Json<ChatRoom>> {
    StoreRepository::new(state.pool())
        .get_by_id(req.store_id)
        .await?
        .ok_or(AppError::Database(RepositoryError::NotFound))?;

    let room = ChatRepository::new(state.pool())
        .get_or_create_room(ctx.user_id, req.store_id)
        .await?;

    Ok(Json(room))
}

/// List the caller's rooms, as buyer or store owner.
///
/// GET /api/chat/rooms
///
/// # Errors
///
/// Returns 401 without a valid token.
pub async fn list_rooms(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<ChatRoom>>> {
    let rooms = ChatRepository::new(state.pool())
        .list_rooms_for_user(ctx.user_id, page.limit(), page.offset())
        .await?;

    Ok(Json(rooms))
}

/// List a room's messages, oldest first.
///
/// GET /api/chat/rooms/{id}/messages
///
/// # Errors
///
/// Returns 404 if the room doesn't exist or the caller isn't in it.
pub async fn list_messages(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Path(room_id): Path<ChatRoomId>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<ChatMessage>>> {
    let repo = ChatRepository::new(state.pool());
    require_member(&repo, room_id, ctx.user_id).await?;

    let messages = repo
        .list_messages(room_id, page.limit(), page.offset())
        .await?;

    Ok(Json(messages))
}

/// Post a message to a room.
///
/// POST /api/chat/rooms/{id}/messages
///
/// # Errors
///
/// Returns 400 for empty messages, 404 if the room doesn't exist or the
/// caller isn't in it.
pub async fn post_message(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Path(room_id): Path<ChatRoomId>,
    Json(req): Json<PostMessageRequest>,
) -> Result<Json<ChatMessage>> {
    let body = req.body.trim();
    if body.is_empty() {
        return Err(AppError::BadRequest("message must not be empty".into()));
    }

    let repo = ChatRepository::new(state.pool());
    let room = require_member(&repo, room_id, ctx.user_id).await?;

    let message = repo.insert_message(room_id, ctx.user_id, body).await?;

    notify_counterpart(&state, &room, ctx.user_id).await;

    Ok(Json(message))
}

/// Load the room and reject callers who aren't in it. Hidden rooms read as
/// 404 so IDs don't leak.
async fn require_member(
    repo: &ChatRepository<'_>,
    room_id: ChatRoomId,
    user_id: bazaar_core::UserId,
) -> Result<ChatRoom> {
    let room = repo
        .get_room(room_id)
        .await?
        .ok_or(AppError::Database(RepositoryError::NotFound))?;

    if !repo.is_member(&room, user_id).await? {
        return Err(AppError::Database(RepositoryError::NotFound));
    }

    Ok(room)
}

/// Notify the other side of the room. Best-effort.
async fn notify_counterpart(state: &AppState, room: &ChatRoom, sender_id: bazaar_core::UserId) {
    let recipient = if room.buyer_id == sender_id {
        match StoreRepository::new(state.pool()).get_by_id(room.store_id).await {
            Ok(Some(store)) => store.owner_id,
            Ok(None) => return,
            Err(error) => {
                tracing::warn!(%error, room_id = %room.id, "Failed to load store for chat notification");
                return;
            }
        }
    } else {
        room.buyer_id
    };

    if let Err(error) = NotificationRepository::new(state.pool())
        .create(recipient, NotificationKind::Chat, "New message", None)
        .await
    {
        tracing::warn!(%error, room_id = %room.id, "Failed to notify chat recipient");
    }
}
