//! Chat models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::{ChatMessageId, ChatRoomId, StoreId, UserId};

/// A conversation between a buyer and a store. One per pair.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ChatRoom {
    /// Unique room ID.
    pub id: ChatRoomId,
    /// The buyer side of the conversation.
    pub buyer_id: UserId,
    /// The store side of the conversation.
    pub store_id: StoreId,
    /// When the room was created.
    pub created_at: DateTime<Utc>,
}

/// A message in a chat room.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ChatMessage {
    /// Unique message ID.
    pub id: ChatMessageId,
    /// Owning room.
    pub room_id: ChatRoomId,
    /// Sending user (the buyer or the store owner).
    pub sender_id: UserId,
    /// Message text.
    pub body: String,
    /// When the message was sent.
    pub created_at: DateTime<Utc>,
}
