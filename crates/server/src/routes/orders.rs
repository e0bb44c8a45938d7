//! Order routes.
//!
//! Buyers list, inspect, and cancel their own orders; sellers work the
//! orders of stores they own through the fulfillment transitions.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use bazaar_core::{NotificationKind, OrderId, OrderStatus, StoreId};

use crate::db::RepositoryError;
use crate::db::notifications::NotificationRepository;
use crate::db::orders::OrderRepository;
use crate::db::stores::StoreRepository;
use crate::error::{AppError, Result};
use crate::middleware::{AuthContext, RequireAuth};
use crate::models::{Order, OrderWithLines};
use crate::state::AppState;

use super::Pagination;
use super::stores::require_store_owner;

/// List the caller's orders, newest first.
///
/// GET /api/orders
///
/// # Errors
///
/// Returns 401 without a valid token.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_buyer(ctx.user_id, page.limit(), page.offset())
        .await?;

    Ok(Json(orders))
}

/// List a store's orders. Owner or admin only.
///
/// GET /api/stores/{id}/orders
///
/// # Errors
///
/// Returns 403 if the caller doesn't own the store.
pub async fn list_for_store(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Path(store_id): Path<StoreId>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Order>>> {
    let stores = StoreRepository::new(state.pool());
    require_store_owner(&stores, store_id, &ctx).await?;

    let orders = OrderRepository::new(state.pool())
        .list_for_store(store_id, page.limit(), page.offset())
        .await?;

    Ok(Json(orders))
}

/// Get an order with its lines.
///
/// GET /api/orders/{id}
///
/// Visible to the buyer, the store owner, and admins.
///
/// # Errors
///
/// Returns 404 if the order doesn't exist or the caller can't see it.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderWithLines>> {
    let order = load_visible(&state, id, &ctx).await?;
    let lines = OrderRepository::new(state.pool()).get_lines(id).await?;

    Ok(Json(OrderWithLines { order, lines }))
}

/// Cancel an order that hasn't shipped. Buyer only.
///
/// POST /api/orders/{id}/cancel
///
/// Restocks the purchased quantities and refunds a captured payment.
///
/// # Errors
///
/// Returns 409 if the order already shipped or finished.
pub async fn cancel(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderWithLines>> {
    let repo = OrderRepository::new(state.pool());
    let order = repo
        .get_by_id(id)
        .await?
        .ok_or(AppError::Database(RepositoryError::NotFound))?;

    if order.user_id != ctx.user_id && !ctx.is_admin() {
        return Err(AppError::Database(RepositoryError::NotFound));
    }

    if !repo.cancel(id).await? {
        return Err(AppError::Conflict(
            "only orders that haven't shipped can be cancelled".into(),
        ));
    }

    let cancelled = repo
        .get_with_lines(id)
        .await?
        .ok_or(AppError::Database(RepositoryError::NotFound))?;

    Ok(Json(cancelled))
}

/// Request to advance an order's fulfillment status.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: OrderStatus,
}

/// Advance an order through fulfillment. Store owner or admin only.
///
/// POST /api/orders/{id}/status
///
/// Sellers move paid orders to shipped and shipped orders to delivered.
/// Payment capture (pending to paid) and cancellation have their own
/// endpoints.
///
/// # Errors
///
/// Returns 400 for transitions the state machine forbids, 409 when a
/// concurrent update already moved the order.
pub async fn set_status(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Path(id): Path<OrderId>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<Order>> {
    let repo = OrderRepository::new(state.pool());
    let order = repo
        .get_by_id(id)
        .await?
        .ok_or(AppError::Database(RepositoryError::NotFound))?;

    let stores = StoreRepository::new(state.pool());
    require_store_owner(&stores, order.store_id, &ctx).await?;

    let allowed = matches!(
        (order.status, req.status),
        (OrderStatus::Paid, OrderStatus::Shipped)
            | (OrderStatus::Shipped, OrderStatus::Delivered)
    );
    if !allowed || !order.status.can_transition_to(req.status) {
        return Err(AppError::BadRequest(format!(
            "cannot move order from {} to {}",
            order.status, req.status
        )));
    }

    if !repo.transition_status(id, order.status, req.status).await? {
        return Err(AppError::Conflict("order status changed concurrently".into()));
    }

    let updated = repo
        .get_by_id(id)
        .await?
        .ok_or(AppError::Database(RepositoryError::NotFound))?;

    notify_status(&state, &updated).await;

    Ok(Json(updated))
}

/// Tell the buyer the order moved. Best-effort.
async fn notify_status(state: &AppState, order: &Order) {
    let body = format!("Order #{} is now {}", order.id, order.status);
    if let Err(error) = NotificationRepository::new(state.pool())
        .create(
            order.user_id,
            NotificationKind::OrderStatus,
            &body,
            Some(order.id),
        )
        .await
    {
        tracing::warn!(%error, order_id = %order.id, "Failed to notify buyer of status change");
    }
}

/// Load an order if the caller is the buyer, the store owner, or an admin.
///
/// Hidden orders read as 404 rather than 403 so IDs don't leak.
pub(super) async fn load_visible(
    state: &AppState,
    id: OrderId,
    ctx: &AuthContext,
) -> Result<Order> {
    let order = OrderRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or(AppError::Database(RepositoryError::NotFound))?;

    if order.user_id == ctx.user_id || ctx.is_admin() {
        return Ok(order);
    }

    let store = StoreRepository::new(state.pool())
        .get_by_id(order.store_id)
        .await?;
    if store.is_some_and(|s| s.owner_id == ctx.user_id) {
        return Ok(order);
    }

    Err(AppError::Database(RepositoryError::NotFound))
}
