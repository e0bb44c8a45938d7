//! Cart repository.

use sqlx::PgPool;

use bazaar_core::{CartId, CartLineId, UserId, VariantId};

use super::RepositoryError;
use crate::models::{Cart, CartLineDetail};

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the buyer's cart, creating it on first use.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_or_create(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        let cart = sqlx::query_as::<_, Cart>(
            r"
            INSERT INTO bazaar.cart (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO UPDATE SET updated_at = now()
            RETURNING id, user_id, created_at, updated_at
            ",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(cart)
    }

    /// Get all lines in a cart, joined with variant, product, and store.
    ///
    /// Ordered by line creation so the cart renders stably.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_lines(&self, cart_id: CartId) -> Result<Vec<CartLineDetail>, RepositoryError> {
        let lines = sqlx::query_as::<_, CartLineDetail>(
            r"
            SELECT cl.id, cl.variant_id, p.id AS product_id, p.store_id,
                   p.title AS product_title, v.title AS variant_title, v.sku,
                   v.price AS unit_price, v.stock, cl.quantity
            FROM bazaar.cart_line cl
            JOIN bazaar.product_variant v ON v.id = cl.variant_id
            JOIN bazaar.product p ON p.id = v.product_id
            WHERE cl.cart_id = $1
            ORDER BY cl.created_at ASC
            ",
        )
        .bind(cart_id)
        .fetch_all(self.pool)
        .await?;

        Ok(lines)
    }

    /// Add a variant to the cart, merging quantity if already present.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn add_line(
        &self,
        cart_id: CartId,
        variant_id: VariantId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO bazaar.cart_line (cart_id, variant_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (cart_id, variant_id)
            DO UPDATE SET quantity = bazaar.cart_line.quantity + EXCLUDED.quantity
            ",
        )
        .bind(cart_id)
        .bind(variant_id)
        .bind(quantity)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Set a line's quantity. A quantity of zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line isn't in this cart.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_line_quantity(
        &self,
        cart_id: CartId,
        line_id: CartLineId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let result = if quantity == 0 {
            sqlx::query("DELETE FROM bazaar.cart_line WHERE id = $1 AND cart_id = $2")
                .bind(line_id)
                .bind(cart_id)
                .execute(self.pool)
                .await?
        } else {
            sqlx::query(
                r"
                UPDATE bazaar.cart_line
                SET quantity = $1
                WHERE id = $2 AND cart_id = $3
                ",
            )
            .bind(quantity)
            .bind(line_id)
            .bind(cart_id)
            .execute(self.pool)
            .await?
        };

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Remove a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line isn't in this cart.
    pub async fn remove_line(
        &self,
        cart_id: CartId,
        line_id: CartLineId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM bazaar.cart_line WHERE id = $1 AND cart_id = $2")
            .bind(line_id)
            .bind(cart_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Remove every line from the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn clear(&self, cart_id: CartId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM bazaar.cart_line WHERE cart_id = $1")
            .bind(cart_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
