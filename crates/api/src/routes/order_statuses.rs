//! Route definitions for the `/order-statuses` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::order_statuses;
use crate::state::AppState;

/// Routes mounted at `/order-statuses`.
///
/// ```text
/// GET    /                  -> list
/// POST   /                  -> create
/// GET    /default           -> get_default
/// PUT    /reorder           -> reorder
/// GET    /handle/{handle}   -> get_by_handle
/// GET    /{id}              -> get_by_id
/// PUT    /{id}              -> update
/// DELETE /{id}              -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(order_statuses::list).post(order_statuses::create),
        )
        .route("/default", get(order_statuses::get_default))
        .route("/reorder", put(order_statuses::reorder))
        .route("/handle/{handle}", get(order_statuses::get_by_handle))
        .route(
            "/{id}",
            get(order_statuses::get_by_id)
                .put(order_statuses::update)
                .delete(order_statuses::delete),
        )
}
