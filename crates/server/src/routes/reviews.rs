//! Review routes.
//!
//! One review per (product, buyer). Writes invalidate the cached rating.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use bazaar_core::{NotificationKind, OrderStatus, ProductId, ReviewId};

use crate::db::RepositoryError;
use crate::db::notifications::NotificationRepository;
use crate::db::products::ProductRepository;
use crate::db::reviews::ReviewRepository;
use crate::db::stores::StoreRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{ProductRating, Review};
use crate::state::AppState;

use super::Pagination;

/// Request body for creating or updating a review.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub rating: i32,
    #[serde(default)]
    pub body: String,
}

impl ReviewRequest {
    fn validate(&self) -> Result<()> {
        if !(1..=5).contains(&self.rating) {
            return Err(AppError::BadRequest("rating must be between 1 and 5".into()));
        }
        Ok(())
    }
}

/// List a product's reviews, newest first.
///
/// GET /api/products/{id}/reviews
///
/// # Errors
///
/// Returns 500 if the listing fails.
pub async fn list(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Review>>> {
    let reviews = ReviewRepository::new(state.pool())
        .list_for_product(product_id, page.limit(), page.offset())
        .await?;

    Ok(Json(reviews))
}

/// Get a product's aggregate rating.
///
/// GET /api/products/{id}/rating
///
/// # Errors
///
/// Returns 500 if the lookup fails.
pub async fn rating(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<ProductRating>> {
    let rating = state.catalog().rating(product_id).await?;

    Ok(Json(rating))
}

/// Review a product the caller has bought.
///
/// POST /api/products/{id}/reviews
///
/// # Errors
///
/// Returns 403 if the caller never received the product, 409 if they
/// already reviewed it.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Path(product_id): Path<ProductId>,
    Json(req): Json<ReviewRequest>,
) -> Result<Json<Review>> {
    req.validate()?;

    if !has_purchased(&state, ctx.user_id, product_id).await? {
        return Err(AppError::Forbidden(
            "only buyers who received the product can review it".into(),
        ));
    }

    let review = ReviewRepository::new(state.pool())
        .create(product_id, ctx.user_id, req.rating, &req.body)
        .await?;
    state.catalog().invalidate_rating(product_id).await;

    notify_seller(&state, product_id, review.rating).await;

    Ok(Json(review))
}

/// Tell the store owner a review landed. Best-effort.
async fn notify_seller(state: &AppState, product_id: ProductId, rating: i32) {
    let product = match ProductRepository::new(state.pool()).get_by_id(product_id).await {
        Ok(Some(product)) => product,
        Ok(None) => return,
        Err(error) => {
            tracing::warn!(%error, product_id = %product_id, "Failed to load product for review notification");
            return;
        }
    };

    let owner_id = match StoreRepository::new(state.pool()).get_by_id(product.store_id).await {
        Ok(Some(store)) => store.owner_id,
        Ok(None) => return,
        Err(error) => {
            tracing::warn!(%error, product_id = %product_id, "Failed to load store for review notification");
            return;
        }
    };

    let body = review_notification_body(rating, &product.title);
    if let Err(error) = NotificationRepository::new(state.pool())
        .create(owner_id, NotificationKind::Review, &body, None)
        .await
    {
        tracing::warn!(%error, product_id = %product_id, "Failed to notify seller of review");
    }
}

fn review_notification_body(rating: i32, title: &str) -> String {
    format!("New {rating}-star review on {title}")
}

/// Update the caller's review.
///
/// PUT /api/reviews/{id}
///
/// # Errors
///
/// Returns 404 if the review doesn't exist or belongs to someone else.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Path(id): Path<ReviewId>,
    Json(req): Json<ReviewRequest>,
) -> Result<Json<Review>> {
    req.validate()?;

    let review = ReviewRepository::new(state.pool())
        .update(id, ctx.user_id, req.rating, &req.body)
        .await?;
    state.catalog().invalidate_rating(review.product_id).await;

    Ok(Json(review))
}

/// Delete the caller's review.
///
/// DELETE /api/reviews/{id}
///
/// # Errors
///
/// Returns 404 if the review doesn't exist or belongs to someone else.
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Path(id): Path<ReviewId>,
) -> Result<Json<serde_json::Value>> {
    let repo = ReviewRepository::new(state.pool());
    let review = repo
        .get_by_id(id)
        .await?
        .ok_or(AppError::Database(RepositoryError::NotFound))?;
    if review.user_id != ctx.user_id && !ctx.is_admin() {
        return Err(AppError::Database(RepositoryError::NotFound));
    }

    repo.delete(id, review.user_id).await?;
    state.catalog().invalidate_rating(review.product_id).await;

    Ok(Json(serde_json::json!({ "ok": true })))
}

/// Whether the user has a delivered order line for this product.
async fn has_purchased(
    state: &AppState,
    user_id: bazaar_core::UserId,
    product_id: ProductId,
) -> Result<bool> {
    let purchased = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1
            FROM bazaar."order" o
            JOIN bazaar.order_line ol ON ol.order_id = o.id
            JOIN bazaar.product_variant v ON v.id = ol.variant_id
            WHERE o.user_id = $1 AND v.product_id = $2 AND o.status = $3
        )
        "#,
    )
    .bind(user_id)
    .bind(product_id)
    .bind(OrderStatus::Delivered)
    .fetch_one(state.pool())
    .await
    .map_err(RepositoryError::from)?;

    Ok(purchased)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_request_rejects_out_of_range_rating() {
        let zero = ReviewRequest { rating: 0, body: String::new() };
        let six = ReviewRequest { rating: 6, body: String::new() };
        assert!(zero.validate().is_err());
        assert!(six.validate().is_err());
        let ok = ReviewRequest { rating: 5, body: "great".into() };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_review_notification_body_names_product_and_rating() {
        assert_eq!(
            review_notification_body(4, "Demo Mug"),
            "New 4-star review on Demo Mug"
        );
    }
}
