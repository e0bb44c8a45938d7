//! Catalog reads with caching.
//!
//! Product detail and rating lookups are the hottest reads, so they go
//! through a `moka` cache (5-minute TTL). Catalog writes invalidate the
//! affected product's entries.

use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use bazaar_core::ProductId;

use crate::db::RepositoryError;
use crate::db::products::ProductRepository;
use crate::db::reviews::ReviewRepository;
use crate::models::{ProductRating, ProductWithVariants};

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(ProductId),
    Rating(ProductId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<ProductWithVariants>),
    Rating(ProductRating),
}

/// Shared catalog cache, held in application state.
pub type CatalogCache = Cache<CacheKey, CacheValue>;

/// Build the catalog cache.
#[must_use]
pub fn new_cache() -> CatalogCache {
    Cache::builder()
        .max_capacity(1000)
        .time_to_live(Duration::from_secs(300))
        .build()
}

/// Cached catalog read service.
pub struct CatalogService<'a> {
    products: ProductRepository<'a>,
    reviews: ReviewRepository<'a>,
    cache: &'a CatalogCache,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, cache: &'a CatalogCache) -> Self {
        Self {
            products: ProductRepository::new(pool),
            reviews: ReviewRepository::new(pool),
            cache,
        }
    }

    /// Get a product with its variants, from cache when possible.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the lookup fails.
    pub async fn get_product(
        &self,
        id: ProductId,
    ) -> Result<Option<ProductWithVariants>, RepositoryError> {
        let key = CacheKey::Product(id);

        if let Some(CacheValue::Product(product)) = self.cache.get(&key).await {
            tracing::debug!(product_id = %id, "Cache hit for product");
            return Ok(Some(*product));
        }

        let Some(product) = self.products.get_with_variants(id).await? else {
            return Ok(None);
        };

        self.cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(Some(product))
    }

    /// Get a product's aggregate rating, from cache when possible.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the lookup fails.
    pub async fn rating(&self, id: ProductId) -> Result<ProductRating, RepositoryError> {
        let key = CacheKey::Rating(id);

        if let Some(CacheValue::Rating(rating)) = self.cache.get(&key).await {
            return Ok(rating);
        }

        let rating = self.reviews.rating_for_product(id).await?;
        self.cache
            .insert(key, CacheValue::Rating(rating.clone()))
            .await;

        Ok(rating)
    }

    /// Drop a product's cached detail after a catalog write.
    pub async fn invalidate_product(&self, id: ProductId) {
        self.cache.invalidate(&CacheKey::Product(id)).await;
    }

    /// Drop a product's cached rating after a review write.
    pub async fn invalidate_rating(&self, id: ProductId) {
        self.cache.invalidate(&CacheKey::Rating(id)).await;
    }
}
