//! Promotion model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::{Money, PromotionId, PromotionKind, StoreId};
use rust_decimal::Decimal;

/// A promotion code.
///
/// Store-scoped promotions (`store_id = Some`) apply only to the order for
/// that store; marketplace-wide promotions (`store_id = None`) apply to every
/// order in a checkout.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Promotion {
    /// Unique promotion ID.
    pub id: PromotionId,
    /// Store scope; `None` means marketplace-wide.
    pub store_id: Option<StoreId>,
    /// Unique code entered at checkout (stored uppercase).
    pub code: String,
    /// How `value` is applied.
    pub kind: PromotionKind,
    /// Percentage in (0, 100] or flat amount, depending on `kind`.
    pub value: Decimal,
    /// Cap on the discount, if any.
    pub max_discount: Option<Money>,
    /// Minimum store subtotal for the code to apply, if any.
    pub min_subtotal: Option<Money>,
    /// Start of the validity window, if bounded.
    pub starts_at: Option<DateTime<Utc>>,
    /// End of the validity window, if bounded.
    pub ends_at: Option<DateTime<Utc>>,
    /// Maximum number of checkouts that may use this code, if bounded.
    pub usage_limit: Option<i32>,
    /// Number of checkouts that have used this code.
    pub used_count: i32,
    /// Inactive promotions are never applied.
    pub active: bool,
    /// When the promotion was created.
    pub created_at: DateTime<Utc>,
    /// When the promotion was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Promotion {
    /// Whether `now` falls inside the validity window.
    #[must_use]
    pub fn in_window(&self, now: DateTime<Utc>) -> bool {
        if let Some(starts_at) = self.starts_at
            && now < starts_at
        {
            return false;
        }
        if let Some(ends_at) = self.ends_at
            && now >= ends_at
        {
            return false;
        }
        true
    }

    /// Whether the usage limit has been reached.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.usage_limit.is_some_and(|limit| self.used_count >= limit)
    }

    /// Whether this promotion applies to an order for `store_id`.
    #[must_use]
    pub fn applies_to_store(&self, store_id: StoreId) -> bool {
        self.store_id.is_none_or(|scoped| scoped == store_id)
    }
}
