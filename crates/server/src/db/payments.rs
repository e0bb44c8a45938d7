//! Payment repository.

use sqlx::PgPool;

use bazaar_core::OrderId;

use super::RepositoryError;
use crate::models::Payment;

/// Repository for payment database operations.
pub struct PaymentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PaymentRepository<'a> {
    /// Create a new payment repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the payment for an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_order(&self, order_id: OrderId) -> Result<Option<Payment>, RepositoryError> {
        let payment = sqlx::query_as::<_, Payment>(
            r"
            SELECT id, order_id, amount, method, status, created_at, updated_at
            FROM bazaar.payment
            WHERE order_id = $1
            ",
        )
        .bind(order_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(payment)
    }

    /// Capture the payment for a pending order and mark the order paid.
    ///
    /// Both updates are conditional and run in one transaction, so a
    /// double-capture or a capture racing a cancellation changes nothing.
    ///
    /// Returns `false` if the payment was not pending or the order was not
    /// in the `pending` status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn capture(&self, order_id: OrderId) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let payment_result = sqlx::query(
            r"
            UPDATE bazaar.payment
            SET status = 'captured', updated_at = now()
            WHERE order_id = $1 AND status = 'pending'
            ",
        )
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        if payment_result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        let order_result = sqlx::query(
            r#"
            UPDATE bazaar."order"
            SET status = 'paid', updated_at = now()
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        if order_result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;

        Ok(true)
    }
}
