//! Chat repository.
//!
//! Rooms pair a buyer with a store; messages belong to a room. Membership
//! checks (buyer or store owner) live here so route handlers only deal in
//! allowed/denied.

use sqlx::PgPool;

use bazaar_core::{ChatRoomId, StoreId, UserId};

use super::RepositoryError;
use crate::models::{ChatMessage, ChatRoom};

/// Repository for chat database operations.
pub struct ChatRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ChatRepository<'a> {
    /// Create a new chat repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the room for a (buyer, store) pair, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn get_or_create_room(
        &self,
        buyer_id: UserId,
        store_id: StoreId,
    ) -> Result<ChatRoom, RepositoryError> {
        let room = sqlx::query_as::<_, ChatRoom>(
            r"
            INSERT INTO bazaar.chat_room (buyer_id, store_id)
            VALUES ($1, $2)
            ON CONFLICT (buyer_id, store_id) DO UPDATE SET buyer_id = EXCLUDED.buyer_id
            RETURNING id, buyer_id, store_id, created_at
            ",
        )
        .bind(buyer_id)
        .bind(store_id)
        .fetch_one(self.pool)
        .await?;

        Ok(room)
    }

    /// Get a room by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_room(&self, id: ChatRoomId) -> Result<Option<ChatRoom>, RepositoryError> {
        let room = sqlx::query_as::<_, ChatRoom>(
            r"
            SELECT id, buyer_id, store_id, created_at
            FROM bazaar.chat_room
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(room)
    }

    /// Whether `user_id` may read and post in `room` (the buyer, or the
    /// owner of the room's store).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_member(
        &self,
        room: &ChatRoom,
        user_id: UserId,
    ) -> Result<bool, RepositoryError> {
        if room.buyer_id == user_id {
            return Ok(true);
        }

        let owner = sqlx::query_scalar::<_, UserId>(
            "SELECT owner_id FROM bazaar.store WHERE id = $1",
        )
        .bind(room.store_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(owner == Some(user_id))
    }

    /// List the rooms a user participates in, as buyer or as store owner,
    /// newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_rooms_for_user(
        &self,
        user_id: UserId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ChatRoom>, RepositoryError> {
        let rooms = sqlx::query_as::<_, ChatRoom>(
            r"
            SELECT r.id, r.buyer_id, r.store_id, r.created_at
            FROM bazaar.chat_room r
            JOIN bazaar.store s ON s.id = r.store_id
            WHERE r.buyer_id = $1 OR s.owner_id = $1
            ORDER BY r.created_at DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(rooms)
    }

    /// Append a message to a room.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert_message(
        &self,
        room_id: ChatRoomId,
        sender_id: UserId,
        body: &str,
    ) -> Result<ChatMessage, RepositoryError> {
        let message = sqlx::query_as::<_, ChatMessage>(
            r"
            INSERT INTO bazaar.chat_message (room_id, sender_id, body)
            VALUES ($1, $2, $3)
            RETURNING id, room_id, sender_id, body, created_at
            ",
        )
        .bind(room_id)
        .bind(sender_id)
        .bind(body)
        .fetch_one(self.pool)
        .await?;

        Ok(message)
    }

    /// List a room's messages, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_messages(
        &self,
        room_id: ChatRoomId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let messages = sqlx::query_as::<_, ChatMessage>(
            r"
            SELECT id, room_id, sender_id, body, created_at
            FROM bazaar.chat_message
            WHERE room_id = $1
            ORDER BY created_at ASC, id ASC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(room_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(messages)
    }
}
