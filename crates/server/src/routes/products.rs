//! Product and variant routes.
//!
//! Public reads go through the cached catalog service; seller writes go
//! straight to the repository and invalidate the cache.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use bazaar_core::{Money, ProductId, StoreId, VariantId};

use crate::db::RepositoryError;
use crate::db::products::{ProductFilter, ProductInput, ProductRepository, VariantInput};
use crate::db::stores::StoreRepository;
use crate::error::{AppError, Result};
use crate::middleware::{AuthContext, OptionalAuth, RequireAuth};
use crate::models::{Product, ProductRating, ProductVariant, ProductWithVariants};
use crate::state::AppState;

use super::Pagination;
use super::stores::require_store_owner;

/// Query parameters for the product listing.
///
/// `limit` and `offset` are inline fields: query-string deserialization
/// buffers values as strings, so numeric fields can't arrive through
/// `serde(flatten)`.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub store_id: Option<StoreId>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListQuery {
    const fn page(&self) -> Pagination {
        Pagination {
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// Product detail response: the product, its variants, and its rating.
#[derive(Debug, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: ProductWithVariants,
    pub rating: ProductRating,
}

/// Request body for creating a product.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub store_id: StoreId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

/// Request body for updating a product.
#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

/// Request body for creating or updating a variant.
#[derive(Debug, Deserialize)]
pub struct VariantRequest {
    pub sku: String,
    pub title: String,
    pub price: Money,
    pub stock: i32,
}

impl VariantRequest {
    fn validate(&self) -> Result<VariantInput> {
        if self.sku.trim().is_empty() {
            return Err(AppError::BadRequest("sku must not be empty".into()));
        }
        if !self.price.is_positive() {
            return Err(AppError::BadRequest("price must be positive".into()));
        }
        if self.stock < 0 {
            return Err(AppError::BadRequest("stock must not be negative".into()));
        }

        Ok(VariantInput {
            sku: self.sku.trim().to_owned(),
            title: self.title.clone(),
            price: self.price.round(),
            stock: self.stock,
        })
    }
}

fn validate_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::BadRequest("title must not be empty".into()));
    }
    Ok(title.to_owned())
}

/// List products. Inactive products are only visible to the store owner.
///
/// GET /api/products
///
/// # Errors
///
/// Returns 500 if the listing fails.
pub async fn list(
    State(state): State<AppState>,
    OptionalAuth(ctx): OptionalAuth,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Product>>> {
    // Sellers browsing their own store see drafts too
    let include_inactive = match (query.store_id, ctx) {
        (Some(store_id), Some(ctx)) => {
            let store = StoreRepository::new(state.pool()).get_by_id(store_id).await?;
            store.is_some_and(|s| s.owner_id == ctx.user_id) || ctx.is_admin()
        }
        _ => false,
    };

    let page = query.page();
    let filter = ProductFilter {
        store_id: query.store_id,
        search: query.search,
        include_inactive,
    };

    let products = ProductRepository::new(state.pool())
        .list(&filter, page.limit(), page.offset())
        .await?;

    Ok(Json(products))
}

/// List one store's products.
///
/// GET /api/stores/{id}/products
///
/// # Errors
///
/// Returns 404 if the store doesn't exist.
pub async fn list_for_store(
    State(state): State<AppState>,
    OptionalAuth(ctx): OptionalAuth,
    Path(store_id): Path<StoreId>,
    Query(query): Query<StoreListQuery>,
) -> Result<Json<Vec<Product>>> {
    let store = StoreRepository::new(state.pool())
        .get_by_id(store_id)
        .await?
        .ok_or(AppError::Database(RepositoryError::NotFound))?;

    let include_inactive = ctx.is_some_and(|ctx| store.owner_id == ctx.user_id || ctx.is_admin());

    let page = query.page();
    let filter = ProductFilter {
        store_id: Some(store_id),
        search: query.search,
        include_inactive,
    };

    let products = ProductRepository::new(state.pool())
        .list(&filter, page.limit(), page.offset())
        .await?;

    Ok(Json(products))
}

/// Query parameters for the per-store product listing.
#[derive(Debug, Deserialize)]
pub struct StoreListQuery {
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl StoreListQuery {
    const fn page(&self) -> Pagination {
        Pagination {
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// Get a product with variants and rating. Served from cache when warm.
///
/// GET /api/products/{id}
///
/// # Errors
///
/// Returns 404 if the product doesn't exist.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductDetail>> {
    let catalog = state.catalog();

    let product = catalog
        .get_product(id)
        .await?
        .ok_or(AppError::Database(RepositoryError::NotFound))?;
    let rating = catalog.rating(id).await?;

    Ok(Json(ProductDetail { product, rating }))
}

/// Create a product in a store the caller owns.
///
/// POST /api/products
///
/// # Errors
///
/// Returns 403 if the caller doesn't own the store.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Json(req): Json<CreateProductRequest>,
) -> Result<Json<Product>> {
    let stores = StoreRepository::new(state.pool());
    require_store_owner(&stores, req.store_id, &ctx).await?;

    let input = ProductInput {
        title: validate_title(&req.title)?,
        description: req.description,
        active: req.active,
    };

    let product = ProductRepository::new(state.pool())
        .create(req.store_id, &input)
        .await?;

    Ok(Json(product))
}

/// Update a product.
///
/// PUT /api/products/{id}
///
/// # Errors
///
/// Returns 403 if the caller doesn't own the product's store, 404 if the
/// product doesn't exist.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Path(id): Path<ProductId>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<Product>> {
    require_product_owner(&state, id, &ctx).await?;

    let input = ProductInput {
        title: validate_title(&req.title)?,
        description: req.description,
        active: req.active,
    };

    let product = ProductRepository::new(state.pool()).update(id, &input).await?;
    state.catalog().invalidate_product(id).await;

    Ok(Json(product))
}

/// Delete a product.
///
/// DELETE /api/products/{id}
///
/// # Errors
///
/// Returns 403 if the caller doesn't own the product's store, 404 if the
/// product doesn't exist.
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Path(id): Path<ProductId>,
) -> Result<Json<serde_json::Value>> {
    require_product_owner(&state, id, &ctx).await?;

    ProductRepository::new(state.pool()).delete(id).await?;
    state.catalog().invalidate_product(id).await;

    Ok(Json(serde_json::json!({ "ok": true })))
}

/// Add a variant to a product.
///
/// POST /api/products/{id}/variants
///
/// # Errors
///
/// Returns 403 if the caller doesn't own the product's store, 409 if the SKU
/// is taken.
pub async fn create_variant(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Path(id): Path<ProductId>,
    Json(req): Json<VariantRequest>,
) -> Result<Json<ProductVariant>> {
    require_product_owner(&state, id, &ctx).await?;

    let input = req.validate()?;
    let variant = ProductRepository::new(state.pool())
        .create_variant(id, &input)
        .await?;
    state.catalog().invalidate_product(id).await;

    Ok(Json(variant))
}

/// Update a variant.
///
/// PUT /api/variants/{id}
///
/// # Errors
///
/// Returns 403 if the caller doesn't own the variant's store, 404 if the
/// variant doesn't exist.
pub async fn update_variant(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Path(id): Path<VariantId>,
    Json(req): Json<VariantRequest>,
) -> Result<Json<ProductVariant>> {
    let product_id = require_variant_owner(&state, id, &ctx).await?;

    let input = req.validate()?;
    let variant = ProductRepository::new(state.pool())
        .update_variant(id, &input)
        .await?;
    state.catalog().invalidate_product(product_id).await;

    Ok(Json(variant))
}

/// Delete a variant.
///
/// DELETE /api/variants/{id}
///
/// # Errors
///
/// Returns 403 if the caller doesn't own the variant's store, 404 if the
/// variant doesn't exist.
pub async fn delete_variant(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Path(id): Path<VariantId>,
) -> Result<Json<serde_json::Value>> {
    let product_id = require_variant_owner(&state, id, &ctx).await?;

    ProductRepository::new(state.pool()).delete_variant(id).await?;
    state.catalog().invalidate_product(product_id).await;

    Ok(Json(serde_json::json!({ "ok": true })))
}

/// Reject unless the caller owns the store behind the product.
async fn require_product_owner(
    state: &AppState,
    id: ProductId,
    ctx: &AuthContext,
) -> Result<Product> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or(AppError::Database(RepositoryError::NotFound))?;

    let stores = StoreRepository::new(state.pool());
    require_store_owner(&stores, product.store_id, ctx).await?;

    Ok(product)
}

/// Reject unless the caller owns the store behind the variant. Returns the
/// parent product ID for cache invalidation.
async fn require_variant_owner(
    state: &AppState,
    id: VariantId,
    ctx: &AuthContext,
) -> Result<ProductId> {
    let variant = ProductRepository::new(state.pool())
        .get_variant(id)
        .await?
        .ok_or(AppError::Database(RepositoryError::NotFound))?;

    require_product_owner(state, variant.product_id, ctx).await?;

    Ok(variant.product_id)
}

#[cfg(test)]
mod tests {
    use axum::extract::Query;
    use axum::http::Uri;

    use super::*;

    #[test]
    fn test_list_query_accepts_pagination_params() {
        let uri: Uri = "/api/products?limit=10&offset=5&search=mug"
            .parse()
            .expect("uri should parse");
        let Query(query) = Query::<ListQuery>::try_from_uri(&uri).expect("query should parse");

        assert_eq!(query.page().limit(), 10);
        assert_eq!(query.page().offset(), 5);
        assert_eq!(query.search.as_deref(), Some("mug"));
    }

    #[test]
    fn test_list_query_defaults_without_params() {
        let uri: Uri = "/api/products".parse().expect("uri should parse");
        let Query(query) = Query::<ListQuery>::try_from_uri(&uri).expect("query should parse");

        assert_eq!(query.page().limit(), 20);
        assert_eq!(query.page().offset(), 0);
        assert!(query.store_id.is_none());
    }

    #[test]
    fn test_store_list_query_accepts_pagination_params() {
        let uri: Uri = "/api/stores/1/products?limit=3&offset=6"
            .parse()
            .expect("uri should parse");
        let Query(query) =
            Query::<StoreListQuery>::try_from_uri(&uri).expect("query should parse");

        assert_eq!(query.page().limit(), 3);
        assert_eq!(query.page().offset(), 6);
    }
}
