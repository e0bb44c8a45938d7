//! Store repository.

use sqlx::PgPool;

use bazaar_core::{Money, StoreId, UserId};

use super::RepositoryError;
use crate::models::Store;

/// Fields for creating or updating a store.
#[derive(Debug)]
pub struct StoreInput {
    /// URL-friendly unique identifier.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Flat shipping fee per order.
    pub shipping_fee: Money,
}

/// Repository for store database operations.
pub struct StoreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StoreRepository<'a> {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a store owned by `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        owner_id: UserId,
        input: &StoreInput,
    ) -> Result<Store, RepositoryError> {
        let store = sqlx::query_as::<_, Store>(
            r"
            INSERT INTO bazaar.store (owner_id, slug, name, description, shipping_fee)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, owner_id, slug, name, description, shipping_fee,
                      created_at, updated_at
            ",
        )
        .bind(owner_id)
        .bind(&input.slug)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.shipping_fee)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "store slug already exists"))?;

        Ok(store)
    }

    /// Update a store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new slug is taken.
    pub async fn update(&self, id: StoreId, input: &StoreInput) -> Result<Store, RepositoryError> {
        let store = sqlx::query_as::<_, Store>(
            r"
            UPDATE bazaar.store
            SET slug = $1, name = $2, description = $3, shipping_fee = $4, updated_at = now()
            WHERE id = $5
            RETURNING id, owner_id, slug, name, description, shipping_fee,
                      created_at, updated_at
            ",
        )
        .bind(&input.slug)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.shipping_fee)
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "store slug already exists"))?;

        store.ok_or(RepositoryError::NotFound)
    }

    /// Delete a store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store doesn't exist.
    pub async fn delete(&self, id: StoreId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM bazaar.store WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Get a store by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        let store = sqlx::query_as::<_, Store>(
            r"
            SELECT id, owner_id, slug, name, description, shipping_fee,
                   created_at, updated_at
            FROM bazaar.store
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(store)
    }

    /// Get a store by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Store>, RepositoryError> {
        let store = sqlx::query_as::<_, Store>(
            r"
            SELECT id, owner_id, slug, name, description, shipping_fee,
                   created_at, updated_at
            FROM bazaar.store
            WHERE slug = $1
            ",
        )
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(store)
    }

    /// List stores, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Store>, RepositoryError> {
        let stores = sqlx::query_as::<_, Store>(
            r"
            SELECT id, owner_id, slug, name, description, shipping_fee,
                   created_at, updated_at
            FROM bazaar.store
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(stores)
    }

    /// List stores owned by a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_owner(&self, owner_id: UserId) -> Result<Vec<Store>, RepositoryError> {
        let stores = sqlx::query_as::<_, Store>(
            r"
            SELECT id, owner_id, slug, name, description, shipping_fee,
                   created_at, updated_at
            FROM bazaar.store
            WHERE owner_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(owner_id)
        .fetch_all(self.pool)
        .await?;

        Ok(stores)
    }
}
