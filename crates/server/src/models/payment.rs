//! Payment model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::{Money, OrderId, PaymentId, PaymentMethod, PaymentStatus};

/// The payment record for an order. One per order.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Payment {
    /// Unique payment ID.
    pub id: PaymentId,
    /// Order this payment belongs to.
    pub order_id: OrderId,
    /// Amount due (the order total at checkout time).
    pub amount: Money,
    /// Method chosen at checkout.
    pub method: PaymentMethod,
    /// Capture status.
    pub status: PaymentStatus,
    /// When the payment record was created.
    pub created_at: DateTime<Utc>,
    /// When the payment record was last updated.
    pub updated_at: DateTime<Utc>,
}
