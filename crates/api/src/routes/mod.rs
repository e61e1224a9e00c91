pub mod health;
pub mod order_statuses;
pub mod orders;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /order-statuses                     list, create
/// /order-statuses/default             default status
/// /order-statuses/reorder             reorder (PUT)
/// /order-statuses/handle/{handle}     get by handle
/// /order-statuses/{id}                get, update, delete
///
/// /orders/{id}/status                 change status, notify (PUT)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/order-statuses", order_statuses::router())
        .nest("/orders", orders::router())
}
