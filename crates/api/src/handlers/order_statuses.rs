//! Handlers for the `/order-statuses` resource.
//!
//! Every read and write goes through the shared [`OrderStatusService`] so
//! the memo cache stays coherent with storage.
//!
//! [`OrderStatusService`]: commerce_db::services::OrderStatusService

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use commerce_core::types::DbId;
use commerce_db::models::order_status::{OrderStatusWithEmails, SaveOrderStatus};
use commerce_db::services::OrderStatusError;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for create and update.
#[derive(Debug, Deserialize)]
pub struct SaveOrderStatusRequest {
    #[serde(flatten)]
    pub status: SaveOrderStatus,
    /// Email templates to attach. Replaces the existing set on update.
    #[serde(default)]
    pub email_ids: Vec<DbId>,
}

/// Request body for `PUT /order-statuses/reorder`.
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub ids: Vec<DbId>,
}

/// GET /api/v1/order-statuses
pub async fn list(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Arc<OrderStatusWithEmails>>>>> {
    let statuses = state.order_statuses.get_all().await?;
    Ok(Json(DataResponse { data: statuses }))
}

/// POST /api/v1/order-statuses
///
/// Ignores any `id` in the body; this route always creates.
pub async fn create(
    State(state): State<AppState>,
    Json(mut input): Json<SaveOrderStatusRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<OrderStatusWithEmails>>)> {
    input.status.id = None;
    let status = state
        .order_statuses
        .save(&input.status, &input.email_ids)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: status })))
}

/// GET /api/v1/order-statuses/default
pub async fn get_default(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<OrderStatusWithEmails>>> {
    let status = state
        .order_statuses
        .get_default()
        .await?
        .ok_or_else(|| AppError::NotFound("No default order status is configured".into()))?;
    Ok(Json(DataResponse { data: status }))
}

/// PUT /api/v1/order-statuses/reorder
pub async fn reorder(
    State(state): State<AppState>,
    Json(input): Json<ReorderRequest>,
) -> AppResult<StatusCode> {
    state.order_statuses.reorder(&input.ids).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/order-statuses/handle/{handle}
pub async fn get_by_handle(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> AppResult<Json<DataResponse<Arc<OrderStatusWithEmails>>>> {
    let status = state
        .order_statuses
        .get_by_handle(&handle)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("No order status exists with the handle '{handle}'"))
        })?;
    Ok(Json(DataResponse { data: status }))
}

/// GET /api/v1/order-statuses/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Arc<OrderStatusWithEmails>>>> {
    let status = state
        .order_statuses
        .get_by_id(id)
        .await?
        .ok_or(OrderStatusError::NotFound { id })?;
    Ok(Json(DataResponse { data: status }))
}

/// PUT /api/v1/order-statuses/{id}
///
/// Overrides any `id` in the body with the value from the URL path.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(mut input): Json<SaveOrderStatusRequest>,
) -> AppResult<Json<DataResponse<OrderStatusWithEmails>>> {
    input.status.id = Some(id);
    let status = state
        .order_statuses
        .save(&input.status, &input.email_ids)
        .await?;
    Ok(Json(DataResponse { data: status }))
}

/// DELETE /api/v1/order-statuses/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    state.order_statuses.delete_by_id(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
