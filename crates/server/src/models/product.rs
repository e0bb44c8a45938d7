//! Product and variant models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::{Money, ProductId, StoreId, VariantId};

/// A product listed in a store.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Store this product belongs to.
    pub store_id: StoreId,
    /// Product title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Inactive products are hidden from listings and cannot be carted.
    pub active: bool,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A purchasable variant of a product (the SKU level).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductVariant {
    /// Unique variant ID.
    pub id: VariantId,
    /// Parent product.
    pub product_id: ProductId,
    /// Stock-keeping unit, unique across the marketplace.
    pub sku: String,
    /// Variant title (e.g. "Large / Red").
    pub title: String,
    /// Unit price. Always positive.
    pub price: Money,
    /// Units available. Never negative.
    pub stock: i32,
    /// When the variant was created.
    pub created_at: DateTime<Utc>,
    /// When the variant was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A product together with all of its variants, as served by the detail
/// endpoint and the catalog cache.
#[derive(Debug, Clone, Serialize)]
pub struct ProductWithVariants {
    #[serde(flatten)]
    pub product: Product,
    pub variants: Vec<ProductVariant>,
}
