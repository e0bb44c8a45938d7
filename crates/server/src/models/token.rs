//! Refresh token model.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use bazaar_core::{RefreshTokenId, UserId};

/// A stored refresh token.
///
/// Only the SHA-256 digest of the opaque token is persisted; the raw token
/// is returned to the client once at issue time and never stored. Tokens
/// issued by successive rotations share a `family` so that reuse of a
/// revoked token can void every descendant at once.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshTokenRecord {
    /// Unique token ID.
    pub id: RefreshTokenId,
    /// Owning user.
    pub user_id: UserId,
    /// SHA-256 digest of the opaque token, hex-encoded.
    pub token_digest: String,
    /// Rotation family; stable across rotations, fresh on login.
    pub family: Uuid,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
    /// Whether this token has been rotated out or revoked.
    pub revoked: bool,
    /// When the token was issued.
    pub created_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    /// Whether the token is past its expiry.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
