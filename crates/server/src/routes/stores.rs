//! Store routes.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use bazaar_core::{Money, StoreId};

use crate::db::RepositoryError;
use crate::db::stores::{StoreInput, StoreRepository};
use crate::error::{AppError, Result};
use crate::middleware::{AuthContext, RequireAuth};
use crate::models::Store;
use crate::state::AppState;

use super::Pagination;

/// Request body for creating or updating a store.
#[derive(Debug, Deserialize)]
pub struct StoreRequest {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub shipping_fee: Money,
}

impl StoreRequest {
    fn validate(&self) -> Result<StoreInput> {
        if self.slug.is_empty()
            || !self
                .slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(AppError::BadRequest(
                "slug must be non-empty lowercase letters, digits, and dashes".into(),
            ));
        }
        if self.name.trim().is_empty() {
            return Err(AppError::BadRequest("name must not be empty".into()));
        }
        if self.shipping_fee.is_negative() {
            return Err(AppError::BadRequest("shipping_fee must not be negative".into()));
        }

        Ok(StoreInput {
            slug: self.slug.clone(),
            name: self.name.trim().to_owned(),
            description: self.description.clone(),
            shipping_fee: self.shipping_fee.round(),
        })
    }
}

/// List stores.
///
/// GET /api/stores
///
/// # Errors
///
/// Returns 500 if the listing fails.
pub async fn list(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Store>>> {
    let stores = StoreRepository::new(state.pool())
        .list(page.limit(), page.offset())
        .await?;

    Ok(Json(stores))
}

/// List the caller's own stores.
///
/// GET /api/stores/mine
///
/// # Errors
///
/// Returns 401 without a valid token.
pub async fn mine(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
) -> Result<Json<Vec<Store>>> {
    let stores = StoreRepository::new(state.pool())
        .list_for_owner(ctx.user_id)
        .await?;

    Ok(Json(stores))
}

/// Get a store by ID.
///
/// GET /api/stores/{id}
///
/// # Errors
///
/// Returns 404 if the store doesn't exist.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<StoreId>,
) -> Result<Json<Store>> {
    let store = StoreRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or(AppError::Database(RepositoryError::NotFound))?;

    Ok(Json(store))
}

/// Get a store by slug.
///
/// GET /api/stores/slug/{slug}
///
/// # Errors
///
/// Returns 404 if the store doesn't exist.
pub async fn show_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Store>> {
    let store = StoreRepository::new(state.pool())
        .get_by_slug(&slug)
        .await?
        .ok_or(AppError::Database(RepositoryError::NotFound))?;

    Ok(Json(store))
}

/// Create a store owned by the caller.
///
/// POST /api/stores
///
/// # Errors
///
/// Returns 403 for buyers, 409 if the slug is taken.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Json(req): Json<StoreRequest>,
) -> Result<Json<Store>> {
    if !ctx.is_seller() {
        return Err(AppError::Forbidden("only sellers can create stores".into()));
    }

    let input = req.validate()?;
    let store = StoreRepository::new(state.pool())
        .create(ctx.user_id, &input)
        .await?;

    Ok(Json(store))
}

/// Update a store. Owner or admin only.
///
/// PUT /api/stores/{id}
///
/// # Errors
///
/// Returns 403 if the caller doesn't own the store, 404 if it doesn't exist.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Path(id): Path<StoreId>,
    Json(req): Json<StoreRequest>,
) -> Result<Json<Store>> {
    let repo = StoreRepository::new(state.pool());
    require_store_owner(&repo, id, &ctx).await?;

    let input = req.validate()?;
    let store = repo.update(id, &input).await?;

    Ok(Json(store))
}

/// Delete a store. Owner or admin only.
///
/// DELETE /api/stores/{id}
///
/// # Errors
///
/// Returns 403 if the caller doesn't own the store, 404 if it doesn't exist.
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Path(id): Path<StoreId>,
) -> Result<Json<serde_json::Value>> {
    let repo = StoreRepository::new(state.pool());
    require_store_owner(&repo, id, &ctx).await?;

    repo.delete(id).await?;

    Ok(Json(serde_json::json!({ "ok": true })))
}

/// Reject unless the caller owns the store (admins pass).
pub(super) async fn require_store_owner(
    repo: &StoreRepository<'_>,
    id: StoreId,
    ctx: &AuthContext,
) -> Result<Store> {
    let store = repo
        .get_by_id(id)
        .await?
        .ok_or(AppError::Database(RepositoryError::NotFound))?;

    if store.owner_id != ctx.user_id && !ctx.is_admin() {
        return Err(AppError::Forbidden("not the store owner".into()));
    }

    Ok(store)
}
