//! Repository for the `orders` and `order_histories` tables.

use commerce_core::types::DbId;
use sqlx::PgPool;

use crate::models::order::{CreateOrder, Order, OrderHistory};

/// Column list for the `orders` table.
const COLUMNS: &str = "id, number, email, order_status_id, created_at, updated_at";

/// Column list for the `order_histories` table.
const HISTORY_COLUMNS: &str = "id, order_id, prev_status_id, new_status_id, message, created_at";

/// Provides the order lookups the status service depends on.
pub struct OrderRepo;

impl OrderRepo {
    /// Insert a new order.
    pub async fn create(pool: &PgPool, input: &CreateOrder) -> Result<Order, sqlx::Error> {
        let query = format!(
            "INSERT INTO orders (number, email, order_status_id) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(&input.number)
            .bind(&input.email)
            .bind(input.order_status_id)
            .fetch_one(pool)
            .await
    }

    /// Find an order by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Order>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM orders WHERE id = $1");
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Count orders currently in the given status.
    pub async fn count_by_status(pool: &PgPool, order_status_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders WHERE order_status_id = $1")
            .bind(order_status_id)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// Move an order to a new status and record the transition.
    ///
    /// Runs in a transaction: lock the order row, update its status, then
    /// insert the history entry. Returns `None` if the order does not exist.
    pub async fn change_status(
        pool: &PgPool,
        order_id: DbId,
        new_status_id: DbId,
        message: Option<&str>,
    ) -> Result<Option<(Order, OrderHistory)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let prev: Option<(Option<DbId>,)> =
            sqlx::query_as("SELECT order_status_id FROM orders WHERE id = $1 FOR UPDATE")
                .bind(order_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((prev_status_id,)) = prev else {
            tx.rollback().await?;
            return Ok(None);
        };

        let update_query = format!(
            "UPDATE orders SET order_status_id = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        let order = sqlx::query_as::<_, Order>(&update_query)
            .bind(order_id)
            .bind(new_status_id)
            .fetch_one(&mut *tx)
            .await?;

        let history_query = format!(
            "INSERT INTO order_histories (order_id, prev_status_id, new_status_id, message) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {HISTORY_COLUMNS}"
        );
        let history = sqlx::query_as::<_, OrderHistory>(&history_query)
            .bind(order_id)
            .bind(prev_status_id)
            .bind(new_status_id)
            .bind(message)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some((order, history)))
    }

    /// List the status history of an order, oldest first.
    pub async fn list_history(
        pool: &PgPool,
        order_id: DbId,
    ) -> Result<Vec<OrderHistory>, sqlx::Error> {
        let query = format!(
            "SELECT {HISTORY_COLUMNS} FROM order_histories \
             WHERE order_id = $1 \
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, OrderHistory>(&query)
            .bind(order_id)
            .fetch_all(pool)
            .await
    }
}
