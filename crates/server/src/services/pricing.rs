//! Order pricing.
//!
//! Pure functions over [`Money`] so discount math is testable without a
//! database. All outputs are rounded to two decimal places.

use rust_decimal::Decimal;
use serde::Serialize;

use bazaar_core::{Money, PromotionKind};

use crate::models::Promotion;

/// Computed totals for a single store's order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderTotals {
    /// Sum of line totals before discounts.
    pub subtotal: Money,
    /// Discount applied to the subtotal.
    pub discount: Money,
    /// Store's flat shipping fee.
    pub shipping_fee: Money,
    /// What the buyer pays: subtotal - discount + shipping.
    pub total: Money,
}

/// Whether a store subtotal clears the promotion's minimum, if it has one.
#[must_use]
pub fn meets_min_subtotal(promotion: &Promotion, subtotal: Money) -> bool {
    promotion.min_subtotal.is_none_or(|min| subtotal >= min)
}

/// Discount a promotion grants against a store subtotal.
///
/// Returns zero when the subtotal is below the promotion's minimum. The
/// result is capped by `max_discount` and never exceeds the subtotal, so a
/// store total can't go negative.
#[must_use]
pub fn discount_for(promotion: &Promotion, subtotal: Money) -> Money {
    if !meets_min_subtotal(promotion, subtotal) {
        return Money::ZERO;
    }

    let raw = match promotion.kind {
        PromotionKind::Percentage => {
            Money::new(subtotal.amount() * promotion.value / Decimal::from(100))
        }
        PromotionKind::FixedAmount => Money::new(promotion.value),
    };

    let capped = promotion
        .max_discount
        .map_or(raw, |max| raw.min(max));

    capped.min(subtotal).round()
}

/// Combine a store subtotal, discount, and shipping fee into order totals.
#[must_use]
pub fn order_totals(subtotal: Money, discount: Money, shipping_fee: Money) -> OrderTotals {
    let subtotal = subtotal.round();
    let discount = discount.min(subtotal).round();
    let shipping_fee = shipping_fee.round();

    OrderTotals {
        subtotal,
        discount,
        shipping_fee,
        total: (subtotal.saturating_sub(discount) + shipping_fee).round(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bazaar_core::{PromotionId, StoreId};
    use chrono::Utc;

    fn money(s: &str) -> Money {
        Money::new(s.parse().unwrap())
    }

    fn promotion(kind: PromotionKind, value: &str) -> Promotion {
        Promotion {
            id: PromotionId::new(1),
            store_id: None,
            code: "SAVE".to_string(),
            kind,
            value: value.parse().unwrap(),
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
    fn test_percentage_discount() {
        let promo = promotion(PromotionKind::Percentage, "10");
        assert_eq!(discount_for(&promo, money("200.00")), money("20.00"));
    }

    #[test]
    fn test_percentage_discount_rounds_to_cents() {
        let promo = promotion(PromotionKind::Percentage, "15");
        // 15% of 9.99 = 1.4985, rounds to 1.50
        assert_eq!(discount_for(&promo, money("9.99")), money("1.50"));
    }

    #[test]
    fn test_fixed_discount() {
        let promo = promotion(PromotionKind::FixedAmount, "5.00");
        assert_eq!(discount_for(&promo, money("50.00")), money("5.00"));
    }

    #[test]
    fn test_fixed_discount_never_exceeds_subtotal() {
        let promo = promotion(PromotionKind::FixedAmount, "25.00");
        assert_eq!(discount_for(&promo, money("10.00")), money("10.00"));
    }

    #[test]
    fn test_max_discount_caps_percentage() {
        let mut promo = promotion(PromotionKind::Percentage, "50");
        promo.max_discount = Some(money("30.00"));
        assert_eq!(discount_for(&promo, money("200.00")), money("30.00"));
    }

    #[test]
    fn test_min_subtotal_gate() {
        let mut promo = promotion(PromotionKind::Percentage, "10");
        promo.min_subtotal = Some(money("100.00"));

        assert_eq!(discount_for(&promo, money("99.99")), Money::ZERO);
        assert_eq!(discount_for(&promo, money("100.00")), money("10.00"));
    }

    #[test]
    fn test_full_percentage_discount() {
        let promo = promotion(PromotionKind::Percentage, "100");
        assert_eq!(discount_for(&promo, money("42.00")), money("42.00"));
    }

    #[test]
    fn test_order_totals() {
        let totals = order_totals(money("80.00"), money("8.00"), money("4.99"));
        assert_eq!(totals.total, money("76.99"));
    }

    #[test]
    fn test_order_totals_discount_clamped_to_subtotal() {
        let totals = order_totals(money("10.00"), money("15.00"), money("3.00"));
        assert_eq!(totals.discount, money("10.00"));
        assert_eq!(totals.total, money("3.00"));
    }

    #[test]
    fn test_order_totals_free_shipping() {
        let totals = order_totals(money("25.50"), Money::ZERO, Money::ZERO);
        assert_eq!(totals.total, money("25.50"));
    }

    #[test]
    fn test_store_scope() {
        let mut promo = promotion(PromotionKind::Percentage, "10");
        assert!(promo.applies_to_store(StoreId::new(7)));

        promo.store_id = Some(StoreId::new(3));
        assert!(promo.applies_to_store(StoreId::new(3)));
        assert!(!promo.applies_to_store(StoreId::new(7)));
    }
}
