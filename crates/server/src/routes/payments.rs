//! Payment routes.
//!
//! Payments are local state, no gateway is called. Capturing the payment is
//! what moves an order from pending to paid.

use axum::{
    Json,
    extract::{Path, State},
};

use bazaar_core::{NotificationKind, OrderId};

use crate::db::RepositoryError;
use crate::db::notifications::NotificationRepository;
use crate::db::payments::PaymentRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::Payment;
use crate::state::AppState;

use super::orders::load_visible;

/// Get the payment for an order.
///
/// GET /api/orders/{id}/payment
///
/// # Errors
///
/// Returns 404 if the order or payment doesn't exist or isn't visible.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Path(order_id): Path<OrderId>,
) -> Result<Json<Payment>> {
    load_visible(&state, order_id, &ctx).await?;

    let payment = PaymentRepository::new(state.pool())
        .get_by_order(order_id)
        .await?
        .ok_or(AppError::Database(RepositoryError::NotFound))?;

    Ok(Json(payment))
}

/// Capture the payment, marking the order paid. Buyer only.
///
/// POST /api/orders/{id}/payment/capture
///
/// # Errors
///
/// Returns 409 if the payment was already captured or the order left the
/// pending status.
pub async fn capture(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Path(order_id): Path<OrderId>,
) -> Result<Json<Payment>> {
    let order = load_visible(&state, order_id, &ctx).await?;
    if order.user_id != ctx.user_id && !ctx.is_admin() {
        return Err(AppError::Forbidden("only the buyer can pay".into()));
    }

    let payments = PaymentRepository::new(state.pool());
    if !payments.capture(order_id).await? {
        return Err(AppError::Conflict(
            "payment is not capturable in the order's current state".into(),
        ));
    }

    let body = format!("Payment received for order #{order_id}");
    if let Err(error) = NotificationRepository::new(state.pool())
        .create(order.user_id, NotificationKind::OrderPaid, &body, Some(order_id))
        .await
    {
        tracing::warn!(%error, order_id = %order_id, "Failed to notify buyer of capture");
    }

    let payment = payments
        .get_by_order(order_id)
        .await?
        .ok_or(AppError::Database(RepositoryError::NotFound))?;

    Ok(Json(payment))
}
