use axum::routing::put;
use axum::Router;

use crate::handlers::orders;
use crate::state::AppState;

/// Routes mounted at `/orders`.
///
/// ```text
/// PUT    /{id}/status       -> change_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/status", put(orders::change_status))
}
