use std::sync::Arc;

use commerce_db::services::OrderStatusService;
use commerce_events::StatusChangeNotifier;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything heavier than the pool sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: commerce_db::DbPool,
    /// Memoizing order status service shared by every handler.
    pub order_statuses: Arc<OrderStatusService>,
    /// Status change notifier. `None` when SMTP is not configured.
    pub notifier: Option<Arc<StatusChangeNotifier>>,
}
