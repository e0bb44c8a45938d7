//! Promotion repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use bazaar_core::{Money, PromotionId, PromotionKind, StoreId};

use super::RepositoryError;
use crate::models::Promotion;

const PROMOTION_COLUMNS: &str = r"id, store_id, code, kind, value, max_discount, min_subtotal,
       starts_at, ends_at, usage_limit, used_count, active, created_at, updated_at";

/// Fields for creating or updating a promotion.
#[derive(Debug)]
pub struct PromotionInput {
    /// Store scope; `None` means marketplace-wide.
    pub store_id: Option<StoreId>,
    /// Code entered at checkout. Stored uppercase.
    pub code: String,
    /// How `value` is applied.
    pub kind: PromotionKind,
    /// Percentage in (0, 100] or flat amount.
    pub value: Decimal,
    /// Cap on the discount.
    pub max_discount: Option<Money>,
    /// Minimum store subtotal for the code to apply.
    pub min_subtotal: Option<Money>,
    /// Start of the validity window.
    pub starts_at: Option<DateTime<Utc>>,
    /// End of the validity window.
    pub ends_at: Option<DateTime<Utc>>,
    /// Maximum number of checkouts allowed to use the code.
    pub usage_limit: Option<i32>,
    /// Whether the code is live.
    pub active: bool,
}

/// Repository for promotion database operations.
pub struct PromotionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PromotionRepository<'a> {
    /// Create a new promotion repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a promotion.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the code is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, input: &PromotionInput) -> Result<Promotion, RepositoryError> {
        let promotion = sqlx::query_as::<_, Promotion>(&format!(
            r"
            INSERT INTO bazaar.promotion
                (store_id, code, kind, value, max_discount, min_subtotal,
                 starts_at, ends_at, usage_limit, active)
            VALUES ($1, upper($2), $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {PROMOTION_COLUMNS}
            "
        ))
        .bind(input.store_id)
        .bind(&input.code)
        .bind(input.kind)
        .bind(input.value)
        .bind(input.max_discount)
        .bind(input.min_subtotal)
        .bind(input.starts_at)
        .bind(input.ends_at)
        .bind(input.usage_limit)
        .bind(input.active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "promotion code already exists"))?;

        Ok(promotion)
    }

    /// Update a promotion.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the promotion doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new code is taken.
    pub async fn update(
        &self,
        id: PromotionId,
        input: &PromotionInput,
    ) -> Result<Promotion, RepositoryError> {
        let promotion = sqlx::query_as::<_, Promotion>(&format!(
            r"
            UPDATE bazaar.promotion
            SET store_id = $1, code = upper($2), kind = $3, value = $4,
                max_discount = $5, min_subtotal = $6, starts_at = $7, ends_at = $8,
                usage_limit = $9, active = $10, updated_at = now()
            WHERE id = $11
            RETURNING {PROMOTION_COLUMNS}
            "
        ))
        .bind(input.store_id)
        .bind(&input.code)
        .bind(input.kind)
        .bind(input.value)
        .bind(input.max_discount)
        .bind(input.min_subtotal)
        .bind(input.starts_at)
        .bind(input.ends_at)
        .bind(input.usage_limit)
        .bind(input.active)
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "promotion code already exists"))?;

        promotion.ok_or(RepositoryError::NotFound)
    }

    /// Delete a promotion.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the promotion doesn't exist.
    pub async fn delete(&self, id: PromotionId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM bazaar.promotion WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Get a promotion by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: PromotionId) -> Result<Option<Promotion>, RepositoryError> {
        let promotion = sqlx::query_as::<_, Promotion>(&format!(
            r"SELECT {PROMOTION_COLUMNS} FROM bazaar.promotion WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(promotion)
    }

    /// Get a promotion by code (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_code(&self, code: &str) -> Result<Option<Promotion>, RepositoryError> {
        let promotion = sqlx::query_as::<_, Promotion>(&format!(
            r"SELECT {PROMOTION_COLUMNS} FROM bazaar.promotion WHERE code = upper($1)"
        ))
        .bind(code)
        .fetch_optional(self.pool)
        .await?;

        Ok(promotion)
    }

    /// List promotions, optionally scoped to one store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        store_id: Option<StoreId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Promotion>, RepositoryError> {
        let promotions = sqlx::query_as::<_, Promotion>(&format!(
            r"
            SELECT {PROMOTION_COLUMNS}
            FROM bazaar.promotion
            WHERE ($1::int IS NULL OR store_id = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "
        ))
        .bind(store_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(promotions)
    }
}
