//! Product and variant repository.

use sqlx::PgPool;

use bazaar_core::{Money, ProductId, StoreId, VariantId};

use super::RepositoryError;
use crate::models::{Product, ProductVariant, ProductWithVariants};

/// Fields for creating or updating a product.
#[derive(Debug)]
pub struct ProductInput {
    /// Product title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Whether the product is visible and purchasable.
    pub active: bool,
}

/// Fields for creating or updating a variant.
#[derive(Debug)]
pub struct VariantInput {
    /// Marketplace-unique SKU.
    pub sku: String,
    /// Variant title.
    pub title: String,
    /// Unit price.
    pub price: Money,
    /// Units in stock.
    pub stock: i32,
}

/// Filters for the product listing.
#[derive(Debug, Default)]
pub struct ProductFilter {
    /// Restrict to one store.
    pub store_id: Option<StoreId>,
    /// Case-insensitive substring match on the title.
    pub search: Option<String>,
    /// Include inactive products (seller views).
    pub include_inactive: bool,
}

/// Escape `%`, `_`, and `\` so a search term matches literally in `ILIKE`.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a product in a store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        store_id: StoreId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r"
            INSERT INTO bazaar.product (store_id, title, description, active)
            VALUES ($1, $2, $3, $4)
            RETURNING id, store_id, title, description, active, created_at, updated_at
            ",
        )
        .bind(store_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.active)
        .fetch_one(self.pool)
        .await?;

        Ok(product)
    }

    /// Update a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r"
            UPDATE bazaar.product
            SET title = $1, description = $2, active = $3, updated_at = now()
            WHERE id = $4
            RETURNING id, store_id, title, description, active, created_at, updated_at
            ",
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.active)
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        product.ok_or(RepositoryError::NotFound)
    }

    /// Delete a product (variants cascade).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM bazaar.product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r"
            SELECT id, store_id, title, description, active, created_at, updated_at
            FROM bazaar.product
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Get a product with all of its variants.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_with_variants(
        &self,
        id: ProductId,
    ) -> Result<Option<ProductWithVariants>, RepositoryError> {
        let Some(product) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        let variants = self.get_variants(id).await?;

        Ok(Some(ProductWithVariants { product, variants }))
    }

    /// List products matching a filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        filter: &ProductFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT id, store_id, title, description, active, created_at, updated_at
            FROM bazaar.product
            WHERE ($1::int IS NULL OR store_id = $1)
              AND ($2::text IS NULL OR title ILIKE '%' || $2 || '%')
              AND (active OR $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            ",
        )
        .bind(filter.store_id)
        .bind(filter.search.as_deref().map(escape_like))
        .bind(filter.include_inactive)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    // =========================================================================
    // Variants
    // =========================================================================

    /// Get all variants of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_variants(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ProductVariant>, RepositoryError> {
        let variants = sqlx::query_as::<_, ProductVariant>(
            r"
            SELECT id, product_id, sku, title, price, stock, created_at, updated_at
            FROM bazaar.product_variant
            WHERE product_id = $1
            ORDER BY created_at ASC
            ",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(variants)
    }

    /// Get a variant by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_variant(
        &self,
        id: VariantId,
    ) -> Result<Option<ProductVariant>, RepositoryError> {
        let variant = sqlx::query_as::<_, ProductVariant>(
            r"
            SELECT id, product_id, sku, title, price, stock, created_at, updated_at
            FROM bazaar.product_variant
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(variant)
    }

    /// Create a variant for a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the SKU is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_variant(
        &self,
        product_id: ProductId,
        input: &VariantInput,
    ) -> Result<ProductVariant, RepositoryError> {
        let variant = sqlx::query_as::<_, ProductVariant>(
            r"
            INSERT INTO bazaar.product_variant (product_id, sku, title, price, stock)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, product_id, sku, title, price, stock, created_at, updated_at
            ",
        )
        .bind(product_id)
        .bind(&input.sku)
        .bind(&input.title)
        .bind(input.price)
        .bind(input.stock)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "SKU already exists"))?;

        Ok(variant)
    }

    /// Update a variant.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the variant doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new SKU is taken.
    pub async fn update_variant(
        &self,
        id: VariantId,
        input: &VariantInput,
    ) -> Result<ProductVariant, RepositoryError> {
        let variant = sqlx::query_as::<_, ProductVariant>(
            r"
            UPDATE bazaar.product_variant
            SET sku = $1, title = $2, price = $3, stock = $4, updated_at = now()
            WHERE id = $5
            RETURNING id, product_id, sku, title, price, stock, created_at, updated_at
            ",
        )
        .bind(&input.sku)
        .bind(&input.title)
        .bind(input.price)
        .bind(input.stock)
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "SKU already exists"))?;

        variant.ok_or(RepositoryError::NotFound)
    }

    /// Delete a variant.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the variant doesn't exist.
    pub async fn delete_variant(&self, id: VariantId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM bazaar.product_variant WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn test_escape_like_plain_term_unchanged() {
        assert_eq!(escape_like("coffee mug"), "coffee mug");
    }

    #[test]
    fn test_escape_like_percent_matches_literally() {
        assert_eq!(escape_like("100% wool"), "100\\% wool");
    }

    #[test]
    fn test_escape_like_underscore_and_backslash() {
        assert_eq!(escape_like("mug_v2"), "mug\\_v2");
        assert_eq!(escape_like(r"back\slash"), r"back\\slash");
    }
}
