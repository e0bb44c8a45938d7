//! Order repository.
//!
//! Order *creation* lives in the checkout service, which owns the multi-table
//! transaction (stock decrement, promotion usage, payment records). This
//! module covers reads, status transitions, and cancellation.

use sqlx::PgPool;

use bazaar_core::{OrderId, OrderStatus, StoreId, UserId};

use super::RepositoryError;
use crate::models::{Order, OrderLine, OrderWithLines};

const ORDER_COLUMNS: &str = r#"id, user_id, store_id, checkout_group, status, shipping_address,
       subtotal, discount, shipping_fee, total, promotion_id, created_at, updated_at"#;

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            r#"SELECT {ORDER_COLUMNS} FROM bazaar."order" WHERE id = $1"#
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// Get the lines of an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_lines(&self, order_id: OrderId) -> Result<Vec<OrderLine>, RepositoryError> {
        let lines = sqlx::query_as::<_, OrderLine>(
            r"
            SELECT id, order_id, variant_id, product_title, variant_title, sku,
                   unit_price, quantity, line_total
            FROM bazaar.order_line
            WHERE order_id = $1
            ORDER BY id ASC
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(lines)
    }

    /// Get an order with its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_with_lines(
        &self,
        id: OrderId,
    ) -> Result<Option<OrderWithLines>, RepositoryError> {
        let Some(order) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        let lines = self.get_lines(id).await?;

        Ok(Some(OrderWithLines { order, lines }))
    }

    /// List a buyer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_buyer(
        &self,
        user_id: UserId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM bazaar."order"
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// List a store's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_store(
        &self,
        store_id: StoreId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM bazaar."order"
            WHERE store_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(store_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// Move an order from `from` to `to`, guarded against races.
    ///
    /// Returns `false` if the order was not in the `from` status (someone
    /// else transitioned it first, or it doesn't exist).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn transition_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE bazaar."order"
            SET status = $1, updated_at = now()
            WHERE id = $2 AND status = $3
            "#,
        )
        .bind(to)
        .bind(id)
        .bind(from)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Cancel an order that hasn't shipped: mark it cancelled, restock its
    /// lines, and refund a captured payment. All in one transaction.
    ///
    /// Returns `false` if the order was neither `pending` nor `paid`
    /// (nothing changed).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn cancel(&self, id: OrderId) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE bazaar."order"
            SET status = 'cancelled', updated_at = now()
            WHERE id = $1 AND status IN ('pending', 'paid')
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        // Return the purchased quantities to stock
        sqlx::query(
            r"
            UPDATE bazaar.product_variant v
            SET stock = v.stock + ol.quantity, updated_at = now()
            FROM bazaar.order_line ol
            WHERE ol.order_id = $1 AND ol.variant_id = v.id
            ",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        // Refund if the payment was already captured
        sqlx::query(
            r"
            UPDATE bazaar.payment
            SET status = 'refunded', updated_at = now()
            WHERE order_id = $1 AND status = 'captured'
            ",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(true)
    }
}
