//! Order models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::{
    CheckoutGroupId, Money, OrderId, OrderLineId, OrderStatus, PromotionId, StoreId, UserId,
    VariantId,
};

/// An order placed against a single store.
///
/// One checkout produces one order per store in the cart; the orders share
/// a [`CheckoutGroupId`].
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Buyer who placed the order.
    pub user_id: UserId,
    /// Store the order was placed against.
    pub store_id: StoreId,
    /// Checkout group shared by sibling orders from the same checkout.
    pub checkout_group: CheckoutGroupId,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Shipping address as entered at checkout.
    pub shipping_address: String,
    /// Sum of line totals before discount and shipping.
    pub subtotal: Money,
    /// Discount applied from a promotion code (zero if none).
    pub discount: Money,
    /// Store's flat shipping fee.
    pub shipping_fee: Money,
    /// Final total: subtotal - discount + shipping fee.
    pub total: Money,
    /// Promotion that produced the discount, if any.
    pub promotion_id: Option<PromotionId>,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
    /// When the order was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A line on an order, with price and title snapshotted at checkout time.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderLine {
    /// Unique line ID.
    pub id: OrderLineId,
    /// Owning order.
    pub order_id: OrderId,
    /// Variant that was purchased.
    pub variant_id: VariantId,
    /// Product title at checkout time.
    pub product_title: String,
    /// Variant title at checkout time.
    pub variant_title: String,
    /// SKU at checkout time.
    pub sku: String,
    /// Unit price at checkout time.
    pub unit_price: Money,
    /// Quantity purchased.
    pub quantity: i32,
    /// unit price x quantity.
    pub line_total: Money,
}

/// An order together with its lines.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithLines {
    #[serde(flatten)]
    pub order: Order,
    pub lines: Vec<OrderLine>,
}
