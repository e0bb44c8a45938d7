//! Checkout.
//!
//! A cart may hold products from several stores; checkout splits it into one
//! order per store, all tied together by a checkout group ID. Stock is
//! decremented with an oversell guard, prices and titles are snapshotted onto
//! order lines, and a pending payment is opened per order. The whole write
//! phase runs in a single transaction so a failed line leaves nothing behind.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;

use bazaar_core::{CheckoutGroupId, Money, PaymentMethod, StoreId, UserId};

use crate::db::RepositoryError;
use crate::db::carts::CartRepository;
use crate::db::notifications::NotificationRepository;
use crate::db::promotions::PromotionRepository;
use crate::db::stores::StoreRepository;
use crate::models::{CartLineDetail, Order, OrderLine, OrderWithLines, Promotion, Store};

use super::pricing::{self, OrderTotals};

/// Errors that can occur while placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart has no lines.
    #[error("cart is empty")]
    EmptyCart,

    /// A variant no longer has enough stock.
    #[error("insufficient stock for {sku}")]
    InsufficientStock {
        /// SKU of the variant that ran out.
        sku: String,
    },

    /// No promotion with the given code.
    #[error("promotion code not found")]
    PromotionNotFound,

    /// The promotion has been deactivated.
    #[error("promotion is not active")]
    PromotionInactive,

    /// Outside the promotion's validity window.
    #[error("promotion is not currently valid")]
    PromotionExpired,

    /// The promotion's usage limit has been reached.
    #[error("promotion usage limit reached")]
    PromotionExhausted,

    /// No store order in this checkout meets the promotion's minimum.
    #[error("order subtotal is below the promotion minimum")]
    PromotionMinSubtotal,

    /// The promotion is scoped to a store not present in this checkout.
    #[error("promotion does not apply to any store in this order")]
    PromotionWrongStore,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Quoted totals for one store before the order is placed.
#[derive(Debug, Serialize)]
pub struct StoreQuote {
    /// Store the order would go to.
    pub store_id: StoreId,
    /// Store name, for display.
    pub store_name: String,
    /// Whether the promotion code applied to this store's order.
    pub promotion_applied: bool,
    /// Computed totals.
    #[serde(flatten)]
    pub totals: OrderTotals,
}

/// Per-store quotes plus the grand total across stores.
#[derive(Debug, Serialize)]
pub struct CheckoutPreview {
    /// One quote per store in the cart.
    pub quotes: Vec<StoreQuote>,
    /// Sum of every store's total.
    pub grand_total: Money,
}

/// The orders created by a checkout.
#[derive(Debug, Serialize)]
pub struct CheckoutOutcome {
    /// Group ID tying the sibling orders together.
    pub checkout_group: CheckoutGroupId,
    /// One order per store, with lines.
    pub orders: Vec<OrderWithLines>,
}

/// One store's slice of the cart, priced and ready to write.
struct StorePlan {
    store: Store,
    lines: Vec<CartLineDetail>,
    totals: OrderTotals,
    promotion_applied: bool,
}

/// Checkout service.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Price the current cart without placing orders.
    ///
    /// # Errors
    ///
    /// Returns the same validation errors as [`Self::place_orders`], minus
    /// stock errors (stock is only checked at placement).
    pub async fn preview(
        &self,
        user_id: UserId,
        promotion_code: Option<&str>,
    ) -> Result<CheckoutPreview, CheckoutError> {
        let (_, plans) = self.plan(user_id, promotion_code).await?;

        let grand_total = plans.iter().map(|p| p.totals.total).sum();
        let quotes = plans
            .into_iter()
            .map(|p| StoreQuote {
                store_id: p.store.id,
                store_name: p.store.name,
                promotion_applied: p.promotion_applied,
                totals: p.totals,
            })
            .collect();

        Ok(CheckoutPreview {
            quotes,
            grand_total,
        })
    }

    /// Place one order per store from the caller's cart.
    ///
    /// Decrements stock, snapshots titles and prices onto order lines, opens
    /// a pending payment per order, bumps the promotion's usage count, and
    /// clears the cart, all in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` if there is nothing to buy,
    /// `CheckoutError::InsufficientStock` if a variant ran out, and the
    /// promotion variants if the code doesn't apply.
    pub async fn place_orders(
        &self,
        user_id: UserId,
        shipping_address: &str,
        promotion_code: Option<&str>,
        payment_method: PaymentMethod,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let (promotion, plans) = self.plan(user_id, promotion_code).await?;

        let checkout_group = CheckoutGroupId::generate();
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
        let mut orders = Vec::with_capacity(plans.len());

        for plan in &plans {
            // Guard against overselling: the decrement only lands if enough
            // stock remains
            for line in &plan.lines {
                let result = sqlx::query(
                    r"
                    UPDATE bazaar.product_variant
                    SET stock = stock - $1, updated_at = now()
                    WHERE id = $2 AND stock >= $1
                    ",
                )
                .bind(line.quantity)
                .bind(line.variant_id)
                .execute(&mut *tx)
                .await
                .map_err(RepositoryError::from)?;

                if result.rows_affected() == 0 {
                    tx.rollback().await.map_err(RepositoryError::from)?;
                    return Err(CheckoutError::InsufficientStock {
                        sku: line.sku.clone(),
                    });
                }
            }

            let promotion_id = if plan.promotion_applied {
                promotion.as_ref().map(|p| p.id)
            } else {
                None
            };

            let order = sqlx::query_as::<_, Order>(
                r#"
                INSERT INTO bazaar."order"
                    (user_id, store_id, checkout_group, status, shipping_address,
                     subtotal, discount, shipping_fee, total, promotion_id)
                VALUES ($1, $2, $3, 'pending', $4, $5, $6, $7, $8, $9)
                RETURNING id, user_id, store_id, checkout_group, status, shipping_address,
                          subtotal, discount, shipping_fee, total, promotion_id,
                          created_at, updated_at
                "#,
            )
            .bind(user_id)
            .bind(plan.store.id)
            .bind(checkout_group)
            .bind(shipping_address)
            .bind(plan.totals.subtotal)
            .bind(plan.totals.discount)
            .bind(plan.totals.shipping_fee)
            .bind(plan.totals.total)
            .bind(promotion_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(RepositoryError::from)?;

            let mut lines = Vec::with_capacity(plan.lines.len());
            for line in &plan.lines {
                let order_line = sqlx::query_as::<_, OrderLine>(
                    r"
                    INSERT INTO bazaar.order_line
                        (order_id, variant_id, product_title, variant_title, sku,
                         unit_price, quantity, line_total)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                    RETURNING id, order_id, variant_id, product_title, variant_title, sku,
                              unit_price, quantity, line_total
                    ",
                )
                .bind(order.id)
                .bind(line.variant_id)
                .bind(&line.product_title)
                .bind(&line.variant_title)
                .bind(&line.sku)
                .bind(line.unit_price)
                .bind(line.quantity)
                .bind(line.line_total())
                .fetch_one(&mut *tx)
                .await
                .map_err(RepositoryError::from)?;

                lines.push(order_line);
            }

            sqlx::query(
                r"
                INSERT INTO bazaar.payment (order_id, amount, method, status)
                VALUES ($1, $2, $3, 'pending')
                ",
            )
            .bind(order.id)
            .bind(order.total)
            .bind(payment_method)
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::from)?;

            orders.push(OrderWithLines { order, lines });
        }

        // One usage per checkout, however many store orders it covered. The
        // guard re-checks the limit in case a concurrent checkout got there
        // first.
        if let Some(promotion) = promotion.as_ref()
            && plans.iter().any(|p| p.promotion_applied)
        {
            let result = sqlx::query(
                r"
                UPDATE bazaar.promotion
                SET used_count = used_count + 1, updated_at = now()
                WHERE id = $1 AND (usage_limit IS NULL OR used_count < usage_limit)
                ",
            )
            .bind(promotion.id)
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::from)?;

            if result.rows_affected() == 0 {
                tx.rollback().await.map_err(RepositoryError::from)?;
                return Err(CheckoutError::PromotionExhausted);
            }
        }

        sqlx::query("DELETE FROM bazaar.cart_line WHERE cart_id = (SELECT id FROM bazaar.cart WHERE user_id = $1)")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::from)?;

        tx.commit().await.map_err(RepositoryError::from)?;

        self.notify_placed(user_id, &orders).await;

        Ok(CheckoutOutcome {
            checkout_group,
            orders,
        })
    }

    /// Load the cart, validate the promotion, and price every store's slice.
    async fn plan(
        &self,
        user_id: UserId,
        promotion_code: Option<&str>,
    ) -> Result<(Option<Promotion>, Vec<StorePlan>), CheckoutError> {
        let carts = CartRepository::new(self.pool);
        let stores = StoreRepository::new(self.pool);

        let cart = carts.get_or_create(user_id).await?;
        let lines = carts.get_lines(cart.id).await?;
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let promotion = match promotion_code {
            Some(code) => {
                let promotion = PromotionRepository::new(self.pool)
                    .get_by_code(code)
                    .await?
                    .ok_or(CheckoutError::PromotionNotFound)?;
                validate_promotion(&promotion, Utc::now())?;
                Some(promotion)
            }
            None => None,
        };

        let mut plans = Vec::new();
        let mut any_in_scope = false;
        let mut any_applied = false;

        for (store_id, store_lines) in split_by_store(lines) {
            let store = stores
                .get_by_id(store_id)
                .await?
                .ok_or_else(|| {
                    RepositoryError::DataCorruption(format!(
                        "cart references missing store {store_id}"
                    ))
                })?;

            let subtotal: Money = store_lines.iter().map(CartLineDetail::line_total).sum();

            let (discount, promotion_applied) = match promotion.as_ref() {
                Some(p) if p.applies_to_store(store_id) => {
                    any_in_scope = true;
                    let discount = pricing::discount_for(p, subtotal);
                    let applied = pricing::meets_min_subtotal(p, subtotal);
                    any_applied |= applied;
                    (discount, applied)
                }
                _ => (Money::ZERO, false),
            };

            plans.push(StorePlan {
                totals: pricing::order_totals(subtotal, discount, store.shipping_fee),
                store,
                lines: store_lines,
                promotion_applied,
            });
        }

        if promotion.is_some() {
            if !any_in_scope {
                return Err(CheckoutError::PromotionWrongStore);
            }
            if !any_applied {
                return Err(CheckoutError::PromotionMinSubtotal);
            }
        }

        Ok((promotion, plans))
    }

    /// Tell the buyer and each store owner about the new orders. Best-effort:
    /// the orders are already committed, so a failed insert only logs.
    async fn notify_placed(&self, buyer_id: UserId, orders: &[OrderWithLines]) {
        let notifications = NotificationRepository::new(self.pool);
        let stores = StoreRepository::new(self.pool);

        for placed in orders {
            let order = &placed.order;
            let body = format!("Order #{} placed, total {}", order.id, order.total);

            if let Err(error) = notifications
                .create(
                    buyer_id,
                    bazaar_core::NotificationKind::OrderPlaced,
                    &body,
                    Some(order.id),
                )
                .await
            {
                tracing::warn!(%error, order_id = %order.id, "Failed to notify buyer");
            }

            match stores.get_by_id(order.store_id).await {
                Ok(Some(store)) => {
                    let body = format!("New order #{} for {}", order.id, store.name);
                    if let Err(error) = notifications
                        .create(
                            store.owner_id,
                            bazaar_core::NotificationKind::OrderPlaced,
                            &body,
                            Some(order.id),
                        )
                        .await
                    {
                        tracing::warn!(%error, order_id = %order.id, "Failed to notify seller");
                    }
                }
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!(%error, order_id = %order.id, "Failed to load store for notification");
                }
            }
        }
    }
}

/// Validate the global preconditions of a promotion (scope and minimums are
/// per-store and checked during planning).
pub(crate) fn validate_promotion(
    promotion: &Promotion,
    now: chrono::DateTime<Utc>,
) -> Result<(), CheckoutError> {
    if !promotion.active {
        return Err(CheckoutError::PromotionInactive);
    }
    if !promotion.in_window(now) {
        return Err(CheckoutError::PromotionExpired);
    }
    if promotion.is_exhausted() {
        return Err(CheckoutError::PromotionExhausted);
    }
    Ok(())
}

/// Group cart lines by store, in stable store-ID order.
fn split_by_store(lines: Vec<CartLineDetail>) -> BTreeMap<StoreId, Vec<CartLineDetail>> {
    let mut by_store: BTreeMap<StoreId, Vec<CartLineDetail>> = BTreeMap::new();
    for line in lines {
        by_store.entry(line.store_id).or_default().push(line);
    }
    by_store
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bazaar_core::{CartLineId, ProductId, PromotionId, PromotionKind, VariantId};
    use chrono::Duration;
    use rust_decimal::Decimal;

    fn line(store: i32, price: &str, quantity: i32) -> CartLineDetail {
        CartLineDetail {
            id: CartLineId::new(store * 100 + quantity),
            variant_id: VariantId::new(store * 100 + quantity),
            product_id: ProductId::new(store),
            store_id: StoreId::new(store),
            product_title: "Widget".to_string(),
            variant_title: "Default".to_string(),
            sku: format!("SKU-{store}-{quantity}"),
            unit_price: Money::new(price.parse::<Decimal>().unwrap()),
            stock: 100,
            quantity,
        }
    }

    fn promotion() -> Promotion {
        Promotion {
            id: PromotionId::new(1),
            store_id: None,
            code: "SAVE10".to_string(),
            kind: PromotionKind::Percentage,
            value: "10".parse().unwrap(),
            max_discount: None,
            min_subtotal: None,
            starts_at: None,
            ends_at: None,
            usage_limit: None,
            used_count: 0,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_split_by_store_groups_lines() {
        let lines = vec![line(2, "5.00", 1), line(1, "10.00", 2), line(2, "3.00", 4)];
        let split = split_by_store(lines);

        assert_eq!(split.len(), 2);
        assert_eq!(split.get(&StoreId::new(1)).unwrap().len(), 1);
        assert_eq!(split.get(&StoreId::new(2)).unwrap().len(), 2);
    }

    #[test]
    fn test_split_by_store_is_ordered() {
        let lines = vec![line(3, "1.00", 1), line(1, "1.00", 1), line(2, "1.00", 1)];
        let stores: Vec<StoreId> = split_by_store(lines).into_keys().collect();
        assert_eq!(
            stores,
            vec![StoreId::new(1), StoreId::new(2), StoreId::new(3)]
        );
    }

    #[test]
    fn test_validate_promotion_ok() {
        assert!(validate_promotion(&promotion(), Utc::now()).is_ok());
    }

    #[test]
    fn test_validate_promotion_inactive() {
        let mut promo = promotion();
        promo.active = false;
        assert!(matches!(
            validate_promotion(&promo, Utc::now()),
            Err(CheckoutError::PromotionInactive)
        ));
    }

    #[test]
    fn test_validate_promotion_outside_window() {
        let now = Utc::now();

        let mut promo = promotion();
        promo.starts_at = Some(now + Duration::hours(1));
        assert!(matches!(
            validate_promotion(&promo, now),
            Err(CheckoutError::PromotionExpired)
        ));

        let mut promo = promotion();
        promo.ends_at = Some(now - Duration::hours(1));
        assert!(matches!(
            validate_promotion(&promo, now),
            Err(CheckoutError::PromotionExpired)
        ));
    }

    #[test]
    fn test_validate_promotion_exhausted() {
        let mut promo = promotion();
        promo.usage_limit = Some(5);
        promo.used_count = 5;
        assert!(matches!(
            validate_promotion(&promo, Utc::now()),
            Err(CheckoutError::PromotionExhausted)
        ));
    }
}
