//! Review models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::{ProductId, ReviewId, UserId};
use rust_decimal::Decimal;

/// A buyer's review of a product. One per (product, buyer).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Review {
    /// Unique review ID.
    pub id: ReviewId,
    /// Reviewed product.
    pub product_id: ProductId,
    /// Reviewing buyer.
    pub user_id: UserId,
    /// Rating from 1 to 5.
    pub rating: i32,
    /// Review text.
    pub body: String,
    /// When the review was created.
    pub created_at: DateTime<Utc>,
    /// When the review was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Aggregate rating for a product.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductRating {
    /// Number of reviews.
    pub review_count: i64,
    /// Mean rating, `None` when there are no reviews.
    pub average_rating: Option<Decimal>,
}
