//! Order status service: memoized reads, validated writes, guarded deletes.

use std::collections::HashMap;
use std::sync::Arc;

use commerce_core::error::CoreError;
use commerce_core::order_status::{dedup_ids, reorder_positions, FieldErrors};
use commerce_core::types::DbId;
use sqlx::PgPool;
use tokio::sync::RwLock;
use validator::Validate;

use crate::models::order::Order;
use crate::models::order_status::{OrderStatus, OrderStatusWithEmails, SaveOrderStatus};
use crate::repositories::{EmailRepo, OrderRepo, OrderStatusRepo};

use super::order_status_cache::{Lookup, OrderStatusCache};

/// Minimum number of statuses that must exist for one to be deleted.
const MIN_STATUSES_FOR_DELETE: i64 = 2;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Errors returned by [`OrderStatusService`].
#[derive(Debug, thiserror::Error)]
pub enum OrderStatusError {
    #[error("No order status exists with the ID {id}")]
    NotFound { id: DbId },

    #[error("Order status validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Order status {id} is used by {orders} order(s)")]
    InUse { id: DbId, orders: i64 },

    #[error("Cannot delete an order status while only {remaining} exist")]
    TooFewStatuses { remaining: i64 },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

// ---------------------------------------------------------------------------
// Default status overrides
// ---------------------------------------------------------------------------

/// What an override sees when resolving the default status for an order.
pub struct DefaultStatusContext<'a> {
    pub order: &'a Order,
    /// Every status, ordered by `sort_order`.
    pub statuses: &'a [Arc<OrderStatusWithEmails>],
}

impl DefaultStatusContext<'_> {
    /// Look up one of the available statuses by handle.
    pub fn find_handle(&self, handle: &str) -> Option<OrderStatusWithEmails> {
        self.statuses
            .iter()
            .find(|s| s.handle() == handle)
            .map(|s| (**s).clone())
    }
}

/// Strategy that may replace the default status chosen for an order.
///
/// Overrides run in registration order; each receives the status chosen so
/// far and returns the one to use.
pub trait DefaultStatusOverride: Send + Sync {
    fn override_default(
        &self,
        ctx: &DefaultStatusContext<'_>,
        resolved: Option<OrderStatusWithEmails>,
    ) -> Option<OrderStatusWithEmails>;
}

impl<F> DefaultStatusOverride for F
where
    F: Fn(&DefaultStatusContext<'_>, Option<OrderStatusWithEmails>) -> Option<OrderStatusWithEmails>
        + Send
        + Sync,
{
    fn override_default(
        &self,
        ctx: &DefaultStatusContext<'_>,
        resolved: Option<OrderStatusWithEmails>,
    ) -> Option<OrderStatusWithEmails> {
        self(ctx, resolved)
    }
}

// ---------------------------------------------------------------------------
// OrderStatusService
// ---------------------------------------------------------------------------

/// Read-through, invalidate-on-write service over [`OrderStatusRepo`].
///
/// Meant to be shared as `Arc<OrderStatusService>`. Cache locks are never
/// held across a database call.
pub struct OrderStatusService {
    pool: PgPool,
    cache: RwLock<OrderStatusCache>,
    overrides: Vec<Arc<dyn DefaultStatusOverride>>,
}

impl OrderStatusService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            cache: RwLock::new(OrderStatusCache::new()),
            overrides: Vec::new(),
        }
    }

    /// Register a default-status override. Overrides run in the order added.
    pub fn with_override(mut self, strategy: impl DefaultStatusOverride + 'static) -> Self {
        self.overrides.push(Arc::new(strategy));
        self
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Find a status by handle, memoizing the result.
    pub async fn get_by_handle(
        &self,
        handle: &str,
    ) -> Result<Option<Arc<OrderStatusWithEmails>>, OrderStatusError> {
        let generation = match self.cache.read().await.by_handle(handle) {
            Lookup::Hit(status) => {
                tracing::debug!(handle, "Order status cache hit");
                return Ok(Some(status));
            }
            Lookup::Absent => return Ok(None),
            Lookup::Miss { generation } => generation,
        };

        let Some(status) = OrderStatusRepo::find_by_handle(&self.pool, handle).await? else {
            return Ok(None);
        };
        let status = self.with_emails(status).await?;
        Ok(Some(self.cache.write().await.memoize(generation, status)))
    }

    /// Find a status by id, memoizing the result.
    pub async fn get_by_id(
        &self,
        id: DbId,
    ) -> Result<Option<Arc<OrderStatusWithEmails>>, OrderStatusError> {
        let generation = match self.cache.read().await.by_id(id) {
            Lookup::Hit(status) => {
                tracing::debug!(id, "Order status cache hit");
                return Ok(Some(status));
            }
            Lookup::Absent => return Ok(None),
            Lookup::Miss { generation } => generation,
        };

        let Some(status) = OrderStatusRepo::find_by_id(&self.pool, id).await? else {
            return Ok(None);
        };
        let status = self.with_emails(status).await?;
        Ok(Some(self.cache.write().await.memoize(generation, status)))
    }

    /// All statuses ordered by `sort_order`.
    ///
    /// The first call loads and memoizes every row; later calls return the
    /// same shared values until the next write.
    pub async fn get_all(&self) -> Result<Vec<Arc<OrderStatusWithEmails>>, OrderStatusError> {
        let generation = {
            let cache = self.cache.read().await;
            if let Some(all) = cache.all() {
                return Ok(all);
            }
            cache.generation()
        };

        tracing::debug!("Loading all order statuses");
        let statuses = OrderStatusRepo::list(&self.pool).await?;
        let ids: Vec<DbId> = statuses.iter().map(|s| s.id).collect();

        let mut emails_by_status: HashMap<DbId, Vec<_>> = HashMap::new();
        for row in EmailRepo::list_for_statuses(&self.pool, &ids).await? {
            emails_by_status
                .entry(row.order_status_id)
                .or_default()
                .push(row.email);
        }

        let statuses = statuses
            .into_iter()
            .map(|status| {
                let emails = emails_by_status.remove(&status.id).unwrap_or_default();
                OrderStatusWithEmails { status, emails }
            })
            .collect();

        Ok(self.cache.write().await.fill(generation, statuses))
    }

    /// The status flagged as default, freshly read and not memoized.
    pub async fn get_default(&self) -> Result<Option<OrderStatusWithEmails>, OrderStatusError> {
        match OrderStatusRepo::find_default(&self.pool).await? {
            Some(status) => Ok(Some(self.with_emails(status).await?)),
            None => Ok(None),
        }
    }

    /// Id of the default status, if one is flagged.
    pub async fn default_id(&self) -> Result<Option<DbId>, OrderStatusError> {
        Ok(OrderStatusRepo::find_default(&self.pool)
            .await?
            .map(|status| status.id))
    }

    /// The default status for a specific order, after every registered
    /// [`DefaultStatusOverride`] has had its say.
    pub async fn get_default_for_order(
        &self,
        order: &Order,
    ) -> Result<Option<OrderStatusWithEmails>, OrderStatusError> {
        let mut resolved = self.get_default().await?;
        if self.overrides.is_empty() {
            return Ok(resolved);
        }

        let statuses = self.get_all().await?;
        let ctx = DefaultStatusContext {
            order,
            statuses: &statuses,
        };
        for strategy in &self.overrides {
            resolved = strategy.override_default(&ctx, resolved);
        }

        tracing::debug!(
            order_id = order.id,
            status_id = resolved.as_ref().map(|s| s.id()),
            "Resolved default order status for order"
        );
        Ok(resolved)
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Create (`input.id = None`) or update an order status and replace its
    /// email associations.
    ///
    /// Fails with [`OrderStatusError::NotFound`] for an unknown id and with
    /// [`OrderStatusError::Validation`] when any field or email id is
    /// invalid; neither case touches storage.
    pub async fn save(
        &self,
        input: &SaveOrderStatus,
        email_ids: &[DbId],
    ) -> Result<OrderStatusWithEmails, OrderStatusError> {
        if let Some(id) = input.id {
            if OrderStatusRepo::find_by_id(&self.pool, id).await?.is_none() {
                return Err(OrderStatusError::NotFound { id });
            }
        }

        let email_ids = dedup_ids(email_ids);
        self.validate(input, &email_ids)
            .await?
            .into_result()
            .map_err(OrderStatusError::Validation)?;

        let status = match input.id {
            Some(id) => OrderStatusRepo::update(&self.pool, id, input, &email_ids)
                .await?
                .ok_or(OrderStatusError::NotFound { id })?,
            None => OrderStatusRepo::create(&self.pool, input, &email_ids).await?,
        };

        self.invalidate().await;
        tracing::info!(
            id = status.id,
            handle = %status.handle,
            is_default = status.is_default,
            emails = email_ids.len(),
            "Order status saved"
        );

        Ok(self.with_emails(status).await?)
    }

    /// Delete an order status.
    ///
    /// Refused while any order references the status, or while fewer than
    /// two statuses exist.
    pub async fn delete_by_id(&self, id: DbId) -> Result<(), OrderStatusError> {
        if OrderStatusRepo::find_by_id(&self.pool, id).await?.is_none() {
            return Err(OrderStatusError::NotFound { id });
        }

        let orders = OrderRepo::count_by_status(&self.pool, id).await?;
        if orders > 0 {
            tracing::warn!(id, orders, "Refusing to delete order status in use");
            return Err(OrderStatusError::InUse { id, orders });
        }

        let remaining = OrderStatusRepo::count(&self.pool).await?;
        if remaining < MIN_STATUSES_FOR_DELETE {
            tracing::warn!(id, remaining, "Refusing to delete one of the last order statuses");
            return Err(OrderStatusError::TooFewStatuses { remaining });
        }

        if !OrderStatusRepo::delete(&self.pool, id).await? {
            return Err(OrderStatusError::NotFound { id });
        }

        self.invalidate().await;
        tracing::info!(id, "Order status deleted");
        Ok(())
    }

    /// Set `sort_order = position + 1` for each id, atomically.
    pub async fn reorder(&self, ids: &[DbId]) -> Result<(), OrderStatusError> {
        let positions = reorder_positions(ids)?;
        let missing = OrderStatusRepo::reorder(&self.pool, &positions).await?;
        if let Some(&id) = missing.first() {
            return Err(OrderStatusError::NotFound { id });
        }

        self.invalidate().await;
        tracing::info!(count = positions.len(), "Order statuses reordered");
        Ok(())
    }

    /// Drop all memoized statuses.
    pub async fn invalidate(&self) {
        self.cache.write().await.invalidate();
        tracing::debug!("Order status cache invalidated");
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    async fn with_emails(&self, status: OrderStatus) -> Result<OrderStatusWithEmails, sqlx::Error> {
        let emails = EmailRepo::list_for_status(&self.pool, status.id).await?;
        Ok(OrderStatusWithEmails { status, emails })
    }

    /// Collect every field error for a save. Expects deduplicated email ids.
    async fn validate(
        &self,
        input: &SaveOrderStatus,
        email_ids: &[DbId],
    ) -> Result<FieldErrors, sqlx::Error> {
        let mut errors = match input.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => FieldErrors::from(e),
        };

        if !errors.has("handle")
            && OrderStatusRepo::handle_taken(&self.pool, &input.handle, input.id).await?
        {
            errors.add(
                "handle",
                format!("Handle \u{201c}{}\u{201d} has already been taken.", input.handle),
            );
        }

        if !email_ids.is_empty() {
            let found = EmailRepo::count_existing(&self.pool, email_ids).await?;
            if found != email_ids.len() as i64 {
                errors.add("emails", "One or more emails do not exist in the system.");
            }
        }

        Ok(errors)
    }
}
