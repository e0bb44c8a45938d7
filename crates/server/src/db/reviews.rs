//! Review repository.

use sqlx::PgPool;

use bazaar_core::{ProductId, ReviewId, UserId};

use super::RepositoryError;
use crate::models::{ProductRating, Review};

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a review. One per (product, buyer).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the buyer already reviewed
    /// this product. Returns `RepositoryError::Database` for other errors.
    pub async fn create(
        &self,
        product_id: ProductId,
        user_id: UserId,
        rating: i32,
        body: &str,
    ) -> Result<Review, RepositoryError> {
        let review = sqlx::query_as::<_, Review>(
            r"
            INSERT INTO bazaar.review (product_id, user_id, rating, body)
            VALUES ($1, $2, $3, $4)
            RETURNING id, product_id, user_id, rating, body, created_at, updated_at
            ",
        )
        .bind(product_id)
        .bind(user_id)
        .bind(rating)
        .bind(body)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "product already reviewed"))?;

        Ok(review)
    }

    /// Get a review by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        let review = sqlx::query_as::<_, Review>(
            r"
            SELECT id, product_id, user_id, rating, body, created_at, updated_at
            FROM bazaar.review
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(review)
    }

    /// List a product's reviews, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Review>, RepositoryError> {
        let reviews = sqlx::query_as::<_, Review>(
            r"
            SELECT id, product_id, user_id, rating, body, created_at, updated_at
            FROM bazaar.review
            WHERE product_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(product_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(reviews)
    }

    /// Aggregate rating for a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn rating_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<ProductRating, RepositoryError> {
        let rating = sqlx::query_as::<_, ProductRating>(
            r"
            SELECT count(*) AS review_count, avg(rating)::numeric AS average_rating
            FROM bazaar.review
            WHERE product_id = $1
            ",
        )
        .bind(product_id)
        .fetch_one(self.pool)
        .await?;

        Ok(rating)
    }

    /// Update the caller's own review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review doesn't exist or
    /// belongs to someone else.
    pub async fn update(
        &self,
        id: ReviewId,
        user_id: UserId,
        rating: i32,
        body: &str,
    ) -> Result<Review, RepositoryError> {
        let review = sqlx::query_as::<_, Review>(
            r"
            UPDATE bazaar.review
            SET rating = $1, body = $2, updated_at = now()
            WHERE id = $3 AND user_id = $4
            RETURNING id, product_id, user_id, rating, body, created_at, updated_at
            ",
        )
        .bind(rating)
        .bind(body)
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        review.ok_or(RepositoryError::NotFound)
    }

    /// Delete the caller's own review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review doesn't exist or
    /// belongs to someone else.
    pub async fn delete(&self, id: ReviewId, user_id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM bazaar.review WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
