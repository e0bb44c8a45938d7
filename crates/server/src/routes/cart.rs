//! Cart routes.
//!
//! Every cart operation returns the full cart view so clients can re-render
//! without a second request.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use bazaar_core::CartLineId;

use crate::db::RepositoryError;
use crate::db::carts::CartRepository;
use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::CartView;
use crate::state::AppState;

/// Request to add a variant to the cart.
#[derive(Debug, Deserialize)]
pub struct AddLineRequest {
    pub variant_id: bazaar_core::VariantId,
    pub quantity: i32,
}

/// Request to change a line's quantity.
#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: i32,
}

/// Get the caller's cart.
///
/// GET /api/cart
///
/// # Errors
///
/// Returns 401 without a valid token.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
) -> Result<Json<CartView>> {
    let carts = CartRepository::new(state.pool());
    let cart = carts.get_or_create(ctx.user_id).await?;
    let lines = carts.get_lines(cart.id).await?;

    Ok(Json(CartView::from_lines(cart.id, &lines)))
}

/// Add a variant to the cart, merging quantities.
///
/// POST /api/cart/lines
///
/// # Errors
///
/// Returns 400 for non-positive quantities or quantities beyond available
/// stock, 404 for unknown or inactive variants.
pub async fn add_line(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Json(req): Json<AddLineRequest>,
) -> Result<Json<CartView>> {
    if req.quantity <= 0 {
        return Err(AppError::BadRequest("quantity must be positive".into()));
    }

    let products = ProductRepository::new(state.pool());
    let variant = products
        .get_variant(req.variant_id)
        .await?
        .ok_or(AppError::Database(RepositoryError::NotFound))?;
    let product = products
        .get_by_id(variant.product_id)
        .await?
        .ok_or(AppError::Database(RepositoryError::NotFound))?;
    if !product.active {
        return Err(AppError::Database(RepositoryError::NotFound));
    }

    let carts = CartRepository::new(state.pool());
    let cart = carts.get_or_create(ctx.user_id).await?;

    // The add merges with any existing line, so check the merged quantity
    let already_in_cart: i64 = carts
        .get_lines(cart.id)
        .await?
        .iter()
        .filter(|line| line.variant_id == req.variant_id)
        .map(|line| i64::from(line.quantity))
        .sum();
    if already_in_cart + i64::from(req.quantity) > i64::from(variant.stock) {
        return Err(AppError::BadRequest(format!(
            "only {} in stock for {}",
            variant.stock, variant.sku
        )));
    }

    carts.add_line(cart.id, req.variant_id, req.quantity).await?;

    let lines = carts.get_lines(cart.id).await?;
    Ok(Json(CartView::from_lines(cart.id, &lines)))
}

/// Set a line's quantity. Zero removes the line.
///
/// PUT /api/cart/lines/{id}
///
/// # Errors
///
/// Returns 400 for negative quantities, 404 if the line isn't in the
/// caller's cart.
pub async fn set_quantity(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Path(line_id): Path<CartLineId>,
    Json(req): Json<SetQuantityRequest>,
) -> Result<Json<CartView>> {
    if req.quantity < 0 {
        return Err(AppError::BadRequest("quantity must not be negative".into()));
    }

    let carts = CartRepository::new(state.pool());
    let cart = carts.get_or_create(ctx.user_id).await?;
    carts.set_line_quantity(cart.id, line_id, req.quantity).await?;

    let lines = carts.get_lines(cart.id).await?;
    Ok(Json(CartView::from_lines(cart.id, &lines)))
}

/// Remove a line from the cart.
///
/// DELETE /api/cart/lines/{id}
///
/// # Errors
///
/// Returns 404 if the line isn't in the caller's cart.
pub async fn remove_line(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Path(line_id): Path<CartLineId>,
) -> Result<Json<CartView>> {
    let carts = CartRepository::new(state.pool());
    let cart = carts.get_or_create(ctx.user_id).await?;
    carts.remove_line(cart.id, line_id).await?;

    let lines = carts.get_lines(cart.id).await?;
    Ok(Json(CartView::from_lines(cart.id, &lines)))
}

/// Empty the cart.
///
/// DELETE /api/cart
///
/// # Errors
///
/// Returns 500 if the delete fails.
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
) -> Result<Json<CartView>> {
    let carts = CartRepository::new(state.pool());
    let cart = carts.get_or_create(ctx.user_id).await?;
    carts.clear(cart.id).await?;

    Ok(Json(CartView::from_lines(cart.id, &[])))
}
