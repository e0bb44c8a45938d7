//! Promotion routes.
//!
//! Store-scoped codes are managed by the store owner; marketplace-wide codes
//! are admin-only.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bazaar_core::{Money, PromotionId, PromotionKind, StoreId};

use crate::db::RepositoryError;
use crate::db::promotions::{PromotionInput, PromotionRepository};
use crate::db::stores::StoreRepository;
use crate::error::{AppError, Result};
use crate::middleware::{AuthContext, RequireAuth};
use crate::models::Promotion;
use crate::services::checkout::{CheckoutError, validate_promotion};
use crate::services::pricing;
use crate::state::AppState;

use super::Pagination;
use super::stores::require_store_owner;

/// Request body for creating or updating a promotion.
#[derive(Debug, Deserialize)]
pub struct PromotionRequest {
    #[serde(default)]
    pub store_id: Option<StoreId>,
    pub code: String,
    pub kind: PromotionKind,
    pub value: Decimal,
    #[serde(default)]
    pub max_discount: Option<Money>,
    #[serde(default)]
    pub min_subtotal: Option<Money>,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub usage_limit: Option<i32>,
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

impl PromotionRequest {
    fn validate(&self) -> Result<PromotionInput> {
        let code = self.code.trim();
        if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(AppError::BadRequest(
                "code must be non-empty letters, digits, and dashes".into(),
            ));
        }

        match self.kind {
            PromotionKind::Percentage => {
                if self.value <= Decimal::ZERO || self.value > Decimal::from(100) {
                    return Err(AppError::BadRequest(
                        "percentage value must be in (0, 100]".into(),
                    ));
                }
            }
            PromotionKind::FixedAmount => {
                if self.value <= Decimal::ZERO {
                    return Err(AppError::BadRequest("amount must be positive".into()));
                }
            }
        }

        if let (Some(starts_at), Some(ends_at)) = (self.starts_at, self.ends_at)
            && ends_at <= starts_at
        {
            return Err(AppError::BadRequest("ends_at must be after starts_at".into()));
        }
        if self.usage_limit.is_some_and(|limit| limit <= 0) {
            return Err(AppError::BadRequest("usage_limit must be positive".into()));
        }

        Ok(PromotionInput {
            store_id: self.store_id,
            code: code.to_owned(),
            kind: self.kind,
            value: self.value,
            max_discount: self.max_discount,
            min_subtotal: self.min_subtotal,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            usage_limit: self.usage_limit,
            active: self.active,
        })
    }
}

/// Query parameters for the promotion listing.
///
/// `limit` and `offset` are inline fields: query-string deserialization
/// buffers values as strings, so numeric fields can't arrive through
/// `serde(flatten)`.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub store_id: Option<StoreId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListQuery {
    const fn page(&self) -> Pagination {
        Pagination {
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// List promotions the caller manages.
///
/// GET /api/promotions
///
/// Admins see everything; sellers must scope the listing to a store they own.
///
/// # Errors
///
/// Returns 403 for out-of-scope listings.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Promotion>>> {
    if !ctx.is_admin() {
        let Some(store_id) = query.store_id else {
            return Err(AppError::Forbidden("store_id is required for sellers".into()));
        };
        let stores = StoreRepository::new(state.pool());
        require_store_owner(&stores, store_id, &ctx).await?;
    }

    let page = query.page();
    let promotions = PromotionRepository::new(state.pool())
        .list(query.store_id, page.limit(), page.offset())
        .await?;

    Ok(Json(promotions))
}

/// Get a promotion.
///
/// GET /api/promotions/{id}
///
/// # Errors
///
/// Returns 404 if the promotion doesn't exist, 403 if the caller doesn't
/// manage it.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Path(id): Path<PromotionId>,
) -> Result<Json<Promotion>> {
    let promotion = PromotionRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or(AppError::Database(RepositoryError::NotFound))?;

    require_promotion_manager(&state, &promotion, &ctx).await?;

    Ok(Json(promotion))
}

/// Create a promotion.
///
/// POST /api/promotions
///
/// # Errors
///
/// Returns 403 if the caller can't manage the scope, 409 if the code is
/// taken.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Json(req): Json<PromotionRequest>,
) -> Result<Json<Promotion>> {
    require_scope_manager(&state, req.store_id, &ctx).await?;

    let input = req.validate()?;
    let promotion = PromotionRepository::new(state.pool()).create(&input).await?;

    Ok(Json(promotion))
}

/// Update a promotion.
///
/// PUT /api/promotions/{id}
///
/// # Errors
///
/// Returns 403 if the caller can't manage the current or the new scope, 404
/// if the promotion doesn't exist.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Path(id): Path<PromotionId>,
    Json(req): Json<PromotionRequest>,
) -> Result<Json<Promotion>> {
    let repo = PromotionRepository::new(state.pool());
    let existing = repo
        .get_by_id(id)
        .await?
        .ok_or(AppError::Database(RepositoryError::NotFound))?;

    require_promotion_manager(&state, &existing, &ctx).await?;
    require_scope_manager(&state, req.store_id, &ctx).await?;

    let input = req.validate()?;
    let promotion = repo.update(id, &input).await?;

    Ok(Json(promotion))
}

/// Delete a promotion.
///
/// DELETE /api/promotions/{id}
///
/// # Errors
///
/// Returns 403 if the caller doesn't manage the promotion, 404 if it
/// doesn't exist.
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Path(id): Path<PromotionId>,
) -> Result<Json<serde_json::Value>> {
    let repo = PromotionRepository::new(state.pool());
    let promotion = repo
        .get_by_id(id)
        .await?
        .ok_or(AppError::Database(RepositoryError::NotFound))?;

    require_promotion_manager(&state, &promotion, &ctx).await?;
    repo.delete(id).await?;

    Ok(Json(serde_json::json!({ "ok": true })))
}

/// Query parameters for the discount preview.
#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub code: String,
    pub subtotal: Decimal,
    #[serde(default)]
    pub store_id: Option<StoreId>,
}

/// What a code would knock off a given subtotal.
#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub code: String,
    pub discount: Money,
    pub subtotal_after_discount: Money,
}

/// Preview the discount a code would produce, with checkout's arithmetic.
///
/// GET /api/promotions/preview?code=&subtotal=&store_id=
///
/// # Errors
///
/// Returns 400 if the code is unknown, inapplicable, or the subtotal doesn't
/// qualify.
pub async fn preview(
    State(state): State<AppState>,
    RequireAuth(_ctx): RequireAuth,
    Query(query): Query<PreviewQuery>,
) -> Result<Json<PreviewResponse>> {
    if query.subtotal < Decimal::ZERO {
        return Err(AppError::BadRequest("subtotal must not be negative".into()));
    }
    let subtotal = Money::new(query.subtotal).round();

    let promotion = PromotionRepository::new(state.pool())
        .get_by_code(&query.code)
        .await?
        .ok_or(CheckoutError::PromotionNotFound)?;

    validate_promotion(&promotion, Utc::now())?;

    if let Some(store_id) = query.store_id
        && !promotion.applies_to_store(store_id)
    {
        return Err(CheckoutError::PromotionWrongStore.into());
    }
    if promotion.store_id.is_some() && query.store_id.is_none() {
        return Err(CheckoutError::PromotionWrongStore.into());
    }
    if !pricing::meets_min_subtotal(&promotion, subtotal) {
        return Err(CheckoutError::PromotionMinSubtotal.into());
    }

    let discount = pricing::discount_for(&promotion, subtotal);

    Ok(Json(PreviewResponse {
        code: promotion.code,
        discount,
        subtotal_after_discount: subtotal.saturating_sub(discount),
    }))
}

/// Reject unless the caller manages the promotion's scope.
async fn require_promotion_manager(
    state: &AppState,
    promotion: &Promotion,
    ctx: &AuthContext,
) -> Result<()> {
    require_scope_manager(state, promotion.store_id, ctx).await
}

/// Marketplace-wide scope needs admin; store scope needs the store owner.
async fn require_scope_manager(
    state: &AppState,
    store_id: Option<StoreId>,
    ctx: &AuthContext,
) -> Result<()> {
    match store_id {
        None => {
            if ctx.is_admin() {
                Ok(())
            } else {
                Err(AppError::Forbidden(
                    "marketplace-wide promotions are admin-only".into(),
                ))
            }
        }
        Some(store_id) => {
            let stores = StoreRepository::new(state.pool());
            require_store_owner(&stores, store_id, ctx).await?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::extract::Query;
    use axum::http::Uri;

    use super::*;

    #[test]
    fn test_list_query_accepts_pagination_params() {
        let uri: Uri = "/api/promotions?store_id=2&limit=10&offset=20"
            .parse()
            .expect("uri should parse");
        let Query(query) = Query::<ListQuery>::try_from_uri(&uri).expect("query should parse");

        assert_eq!(query.page().limit(), 10);
        assert_eq!(query.page().offset(), 20);
        assert_eq!(query.store_id, Some(StoreId::new(2)));
    }
}
