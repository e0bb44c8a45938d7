//! Checkout routes.

use axum::{Json, extract::State};
use serde::Deserialize;

use bazaar_core::PaymentMethod;

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::services::checkout::{CheckoutOutcome, CheckoutPreview};
use crate::state::AppState;

/// Request to preview the cart's totals.
#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    #[serde(default)]
    pub promotion_code: Option<String>,
}

/// Request to place the orders.
#[derive(Debug, Deserialize)]
pub struct PlaceRequest {
    pub shipping_address: String,
    #[serde(default)]
    pub promotion_code: Option<String>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

/// Price the cart per store without placing orders.
///
/// POST /api/checkout/preview
///
/// # Errors
///
/// Returns 400 for empty carts and inapplicable promotion codes.
pub async fn preview(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Json(req): Json<PreviewRequest>,
) -> Result<Json<CheckoutPreview>> {
    let preview = state
        .checkout()
        .preview(ctx.user_id, req.promotion_code.as_deref())
        .await?;

    Ok(Json(preview))
}

/// Place one order per store from the caller's cart.
///
/// POST /api/checkout
///
/// # Errors
///
/// Returns 400 for empty carts and inapplicable promotion codes, 409 when a
/// variant ran out of stock.
pub async fn place(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Json(req): Json<PlaceRequest>,
) -> Result<Json<CheckoutOutcome>> {
    if req.shipping_address.trim().is_empty() {
        return Err(AppError::BadRequest("shipping_address must not be empty".into()));
    }

    let outcome = state
        .checkout()
        .place_orders(
            ctx.user_id,
            req.shipping_address.trim(),
            req.promotion_code.as_deref(),
            req.payment_method,
        )
        .await?;

    Ok(Json(outcome))
}
