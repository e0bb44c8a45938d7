//! Refresh token repository.
//!
//! Stores only SHA-256 digests of the opaque tokens handed to clients.
//! Rotation and reuse detection live in the auth service; this module is
//! plain persistence.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use bazaar_core::{RefreshTokenId, UserId};

use super::RepositoryError;
use crate::models::RefreshTokenRecord;

/// Repository for refresh token database operations.
pub struct RefreshTokenRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RefreshTokenRepository<'a> {
    /// Create a new refresh token repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a new refresh token digest.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        &self,
        user_id: UserId,
        token_digest: &str,
        family: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshTokenRecord, RepositoryError> {
        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            r"
            INSERT INTO bazaar.refresh_token (user_id, token_digest, family, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, token_digest, family, expires_at, revoked, created_at
            ",
        )
        .bind(user_id)
        .bind(token_digest)
        .bind(family)
        .bind(expires_at)
        .fetch_one(self.pool)
        .await?;

        Ok(record)
    }

    /// Look up a token by its digest.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_digest(
        &self,
        token_digest: &str,
    ) -> Result<Option<RefreshTokenRecord>, RepositoryError> {
        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            r"
            SELECT id, user_id, token_digest, family, expires_at, revoked, created_at
            FROM bazaar.refresh_token
            WHERE token_digest = $1
            ",
        )
        .bind(token_digest)
        .fetch_optional(self.pool)
        .await?;

        Ok(record)
    }

    /// Revoke a single token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the token doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn revoke(&self, id: RefreshTokenId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE bazaar.refresh_token
            SET revoked = TRUE
            WHERE id = $1
            ",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Revoke every token in a rotation family.
    ///
    /// Used on logout and when a revoked token is presented again
    /// (reuse detection).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn revoke_family(&self, family: Uuid) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE bazaar.refresh_token
            SET revoked = TRUE
            WHERE family = $1 AND NOT revoked
            ",
        )
        .bind(family)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete tokens that expired before `cutoff`.
    ///
    /// Run periodically from the CLI to keep the table small.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM bazaar.refresh_token
            WHERE expires_at < $1
            ",
        )
        .bind(cutoff)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
