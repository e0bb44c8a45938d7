//! Store model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::{Money, StoreId, UserId};

/// A seller-owned store.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Store {
    /// Unique store ID.
    pub id: StoreId,
    /// Owning seller.
    pub owner_id: UserId,
    /// URL-friendly unique identifier.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Flat shipping fee added to every order from this store.
    pub shipping_fee: Money,
    /// When the store was created.
    pub created_at: DateTime<Utc>,
    /// When the store was last updated.
    pub updated_at: DateTime<Utc>,
}
