//! Repository for the `emails` table and its status associations.

use commerce_core::types::DbId;
use sqlx::PgPool;

use crate::models::email::{CreateEmail, Email, StatusEmail};

/// Column list for the `emails` table.
const COLUMNS: &str = "id, name, subject, recipient_type, to_address, bcc, enabled, \
    template_path, created_at, updated_at";

/// Column list for the `emails` table (used in JOIN queries).
const JOINED_COLUMNS: &str = "e.id, e.name, e.subject, e.recipient_type, e.to_address, e.bcc, \
    e.enabled, e.template_path, e.created_at, e.updated_at";

/// Provides CRUD operations for email templates.
pub struct EmailRepo;

impl EmailRepo {
    /// Insert a new email template.
    pub async fn create(pool: &PgPool, input: &CreateEmail) -> Result<Email, sqlx::Error> {
        let query = format!(
            "INSERT INTO emails \
                (name, subject, recipient_type, to_address, bcc, enabled, template_path) \
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, true), $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Email>(&query)
            .bind(&input.name)
            .bind(&input.subject)
            .bind(input.recipient_type.as_str())
            .bind(&input.to_address)
            .bind(&input.bcc)
            .bind(input.enabled)
            .bind(&input.template_path)
            .fetch_one(pool)
            .await
    }

    /// Find an email template by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Email>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM emails WHERE id = $1");
        sqlx::query_as::<_, Email>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Count how many of the given ids exist. Duplicates in `ids` count once.
    pub async fn count_existing(pool: &PgPool, ids: &[DbId]) -> Result<i64, sqlx::Error> {
        if ids.is_empty() {
            return Ok(0);
        }
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM emails WHERE id = ANY($1)")
            .bind(ids)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// List the email templates attached to an order status.
    pub async fn list_for_status(
        pool: &PgPool,
        order_status_id: DbId,
    ) -> Result<Vec<Email>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} \
             FROM emails e \
             JOIN order_status_emails ose ON ose.email_id = e.id \
             WHERE ose.order_status_id = $1 \
             ORDER BY e.name, e.id"
        );
        sqlx::query_as::<_, Email>(&query)
            .bind(order_status_id)
            .fetch_all(pool)
            .await
    }

    /// List email templates for several order statuses in one query.
    pub async fn list_for_statuses(
        pool: &PgPool,
        order_status_ids: &[DbId],
    ) -> Result<Vec<StatusEmail>, sqlx::Error> {
        if order_status_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT ose.order_status_id, {JOINED_COLUMNS} \
             FROM emails e \
             JOIN order_status_emails ose ON ose.email_id = e.id \
             WHERE ose.order_status_id = ANY($1) \
             ORDER BY ose.order_status_id, e.name, e.id"
        );
        sqlx::query_as::<_, StatusEmail>(&query)
            .bind(order_status_ids)
            .fetch_all(pool)
            .await
    }
}
