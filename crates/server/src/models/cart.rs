//! Cart models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::{CartId, CartLineId, Money, ProductId, StoreId, UserId, VariantId};

/// A buyer's active cart.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Cart {
    /// Unique cart ID.
    pub id: CartId,
    /// Owning buyer.
    pub user_id: UserId,
    /// When the cart was created.
    pub created_at: DateTime<Utc>,
    /// When the cart was last touched.
    pub updated_at: DateTime<Utc>,
}

/// A cart line joined with the variant, product, and store it points at.
///
/// This is the unit the checkout flow splits by store, so it carries
/// everything needed to price and snapshot an order line.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartLineDetail {
    /// Cart line ID.
    pub id: CartLineId,
    /// Variant in the cart.
    pub variant_id: VariantId,
    /// Parent product.
    pub product_id: ProductId,
    /// Store the product belongs to.
    pub store_id: StoreId,
    /// Product title at view time.
    pub product_title: String,
    /// Variant title at view time.
    pub variant_title: String,
    /// Variant SKU.
    pub sku: String,
    /// Current unit price.
    pub unit_price: Money,
    /// Units currently in stock.
    pub stock: i32,
    /// Quantity in the cart. Always >= 1.
    pub quantity: i32,
}

impl CartLineDetail {
    /// Price of this line (unit price x quantity).
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price.times(u32::try_from(self.quantity).unwrap_or(0))
    }
}

/// Cart as returned to the client: lines plus computed totals.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub id: CartId,
    pub lines: Vec<CartLineView>,
    pub subtotal: Money,
    pub item_count: u32,
}

/// A single line in the cart view.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    pub id: CartLineId,
    pub variant_id: VariantId,
    pub product_id: ProductId,
    pub store_id: StoreId,
    pub product_title: String,
    pub variant_title: String,
    pub sku: String,
    pub unit_price: Money,
    pub quantity: i32,
    pub line_total: Money,
}

impl CartView {
    /// Build a view from joined cart lines.
    #[must_use]
    pub fn from_lines(id: CartId, lines: &[CartLineDetail]) -> Self {
        let subtotal: Money = lines.iter().map(CartLineDetail::line_total).sum();
        let item_count = lines
            .iter()
            .map(|l| u32::try_from(l.quantity).unwrap_or(0))
            .sum();

        Self {
            id,
            lines: lines
                .iter()
                .map(|l| CartLineView {
                    id: l.id,
                    variant_id: l.variant_id,
                    product_id: l.product_id,
                    store_id: l.store_id,
                    product_title: l.product_title.clone(),
                    variant_title: l.variant_title.clone(),
                    sku: l.sku.clone(),
                    unit_price: l.unit_price,
                    quantity: l.quantity,
                    line_total: l.line_total(),
                })
                .collect(),
            subtotal: subtotal.round(),
            item_count,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn line(id: i32, price: &str, quantity: i32) -> CartLineDetail {
        CartLineDetail {
            id: CartLineId::new(id),
            variant_id: VariantId::new(id),
            product_id: ProductId::new(id),
            store_id: StoreId::new(1),
            product_title: "Widget".to_string(),
            variant_title: "Default".to_string(),
            sku: format!("SKU-{id}"),
            unit_price: Money::new(price.parse::<Decimal>().unwrap()),
            stock: 100,
            quantity,
        }
    }

    #[test]
    fn test_line_total() {
        assert_eq!(
            line(1, "9.99", 3).line_total(),
            Money::new("29.97".parse().unwrap())
        );
    }

    #[test]
    fn test_cart_view_totals() {
        let lines = vec![line(1, "10.00", 2), line(2, "5.50", 1)];
        let view = CartView::from_lines(CartId::new(1), &lines);

        assert_eq!(view.subtotal, Money::new("25.50".parse().unwrap()));
        assert_eq!(view.item_count, 3);
        assert_eq!(view.lines.len(), 2);
    }

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::from_lines(CartId::new(1), &[]);
        assert_eq!(view.subtotal, Money::ZERO);
        assert_eq!(view.item_count, 0);
    }
}
