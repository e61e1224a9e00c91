//! Handlers for order status transitions.

use axum::extract::{Path, State};
use axum::Json;
use commerce_core::error::CoreError;
use commerce_core::types::DbId;
use commerce_db::models::order::{ChangeOrderStatus, Order, OrderHistory};
use commerce_db::repositories::OrderRepo;
use commerce_db::services::OrderStatusError;
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Result of a status change.
#[derive(Debug, Serialize)]
pub struct StatusChangeResponse {
    pub order: Order,
    pub history: OrderHistory,
    /// Number of notification emails delivered.
    pub emails_sent: usize,
}

/// PUT /api/v1/orders/{id}/status
///
/// Moves the order to the given status, records a history entry and runs
/// the status change notifier when one is configured. The transition is
/// committed before any email is sent; a notifier failure is logged and
/// reported as zero emails sent.
pub async fn change_status(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ChangeOrderStatus>,
) -> AppResult<Json<DataResponse<StatusChangeResponse>>> {
    if state
        .order_statuses
        .get_by_id(input.order_status_id)
        .await?
        .is_none()
    {
        return Err(OrderStatusError::NotFound {
            id: input.order_status_id,
        }
        .into());
    }

    let (order, history) = OrderRepo::change_status(
        &state.pool,
        id,
        input.order_status_id,
        input.message.as_deref(),
    )
    .await?
    .ok_or(CoreError::NotFound { entity: "Order", id })?;

    tracing::info!(
        order_id = order.id,
        prev_status_id = history.prev_status_id,
        new_status_id = history.new_status_id,
        "Order status changed"
    );

    let emails_sent = match &state.notifier {
        Some(notifier) => match notifier.on_status_change(&order, &history).await {
            Ok(sent) => sent,
            Err(e) => {
                tracing::error!(order_id = order.id, error = %e, "Status change notification failed");
                0
            }
        },
        None => 0,
    };

    Ok(Json(DataResponse {
        data: StatusChangeResponse {
            order,
            history,
            emails_sent,
        },
    }))
}
