//! Repository for the `order_statuses` and `order_status_emails` tables.

use commerce_core::order_status::{effective_color, effective_sort_order};
use commerce_core::types::DbId;
use sqlx::PgPool;

use crate::models::order_status::{OrderStatus, SaveOrderStatus};

/// Column list for the `order_statuses` table.
const COLUMNS: &str = "id, name, handle, color, sort_order, is_default, created_at, updated_at";

/// Provides CRUD operations for order statuses and their email associations.
pub struct OrderStatusRepo;

impl OrderStatusRepo {
    /// Insert a new order status and its email associations in one transaction.
    ///
    /// If `input.is_default` is set, every other status loses its default flag
    /// first.
    pub async fn create(
        pool: &PgPool,
        input: &SaveOrderStatus,
        email_ids: &[DbId],
    ) -> Result<OrderStatus, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if input.is_default {
            Self::clear_defaults_inner(&mut tx).await?;
        }

        let insert_query = format!(
            "INSERT INTO order_statuses (name, handle, color, sort_order, is_default) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        let status = sqlx::query_as::<_, OrderStatus>(&insert_query)
            .bind(&input.name)
            .bind(&input.handle)
            .bind(effective_color(input.color.as_deref()))
            .bind(effective_sort_order(input.sort_order))
            .bind(input.is_default)
            .fetch_one(&mut *tx)
            .await?;

        Self::set_emails_inner(&mut tx, status.id, email_ids).await?;

        tx.commit().await?;
        Ok(status)
    }

    /// Overwrite an order status and replace its email associations.
    ///
    /// Returns `None` if no row with the given `id` exists; nothing is
    /// written in that case.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &SaveOrderStatus,
        email_ids: &[DbId],
    ) -> Result<Option<OrderStatus>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if input.is_default {
            Self::clear_defaults_inner(&mut tx).await?;
        }

        let update_query = format!(
            "UPDATE order_statuses SET \
                name = $2, \
                handle = $3, \
                color = $4, \
                sort_order = $5, \
                is_default = $6 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let status = sqlx::query_as::<_, OrderStatus>(&update_query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.handle)
            .bind(effective_color(input.color.as_deref()))
            .bind(effective_sort_order(input.sort_order))
            .bind(input.is_default)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(status) = status else {
            tx.rollback().await?;
            return Ok(None);
        };

        Self::set_emails_inner(&mut tx, status.id, email_ids).await?;

        tx.commit().await?;
        Ok(Some(status))
    }

    /// Find an order status by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<OrderStatus>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM order_statuses WHERE id = $1");
        sqlx::query_as::<_, OrderStatus>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an order status by its handle.
    pub async fn find_by_handle(
        pool: &PgPool,
        handle: &str,
    ) -> Result<Option<OrderStatus>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM order_statuses WHERE handle = $1");
        sqlx::query_as::<_, OrderStatus>(&query)
            .bind(handle)
            .fetch_optional(pool)
            .await
    }

    /// Find the status flagged `is_default = true`, if any.
    pub async fn find_default(pool: &PgPool) -> Result<Option<OrderStatus>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM order_statuses \
             WHERE is_default = true \
             ORDER BY sort_order, id \
             LIMIT 1"
        );
        sqlx::query_as::<_, OrderStatus>(&query)
            .fetch_optional(pool)
            .await
    }

    /// List all order statuses by `sort_order`, ties broken by id.
    pub async fn list(pool: &PgPool) -> Result<Vec<OrderStatus>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM order_statuses ORDER BY sort_order, id");
        sqlx::query_as::<_, OrderStatus>(&query)
            .fetch_all(pool)
            .await
    }

    /// Count all order statuses.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM order_statuses")
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// Whether another status already uses `handle`.
    ///
    /// `exclude_id` skips the status being updated.
    pub async fn handle_taken(
        pool: &PgPool,
        handle: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS (\
                SELECT 1 FROM order_statuses \
                WHERE handle = $1 AND ($2::BIGINT IS NULL OR id <> $2)\
             )",
        )
        .bind(handle)
        .bind(exclude_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Delete an order status. Junction rows cascade.
    ///
    /// Returns `true` if a row was deleted, `false` if not found.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM order_statuses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Apply `(id, sort_order)` pairs in one transaction.
    ///
    /// Returns the ids that matched no row. If any are missing the
    /// transaction is rolled back and no sort order changes.
    pub async fn reorder(
        pool: &PgPool,
        positions: &[(DbId, i32)],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut missing = Vec::new();

        for &(id, sort_order) in positions {
            let result = sqlx::query("UPDATE order_statuses SET sort_order = $2 WHERE id = $1")
                .bind(id)
                .bind(sort_order)
                .execute(&mut *tx)
                .await?;
            if result.rows_affected() == 0 {
                missing.push(id);
            }
        }

        if missing.is_empty() {
            tx.commit().await?;
        } else {
            tx.rollback().await?;
        }
        Ok(missing)
    }

    // -----------------------------------------------------------------------
    // Email association helpers
    // -----------------------------------------------------------------------

    /// Ids of the email templates attached to a status, ascending.
    pub async fn email_ids(pool: &PgPool, order_status_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT email_id FROM order_status_emails \
             WHERE order_status_id = $1 \
             ORDER BY email_id",
        )
        .bind(order_status_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Clear the default flag on every status within an existing transaction.
    async fn clear_defaults_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE order_statuses SET is_default = false WHERE is_default = true")
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Replace email associations within an existing transaction.
    async fn set_emails_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order_status_id: DbId,
        email_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        // Delete existing
        sqlx::query("DELETE FROM order_status_emails WHERE order_status_id = $1")
            .bind(order_status_id)
            .execute(&mut **tx)
            .await?;

        if email_ids.is_empty() {
            return Ok(());
        }

        // Insert new associations in one statement
        sqlx::query(
            "INSERT INTO order_status_emails (order_status_id, email_id) \
             SELECT $1, email_id FROM UNNEST($2::BIGINT[]) AS t(email_id) \
             ON CONFLICT DO NOTHING",
        )
        .bind(order_status_id)
        .bind(email_ids)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
