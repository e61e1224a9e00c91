use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use commerce_core::error::CoreError;
use commerce_db::services::OrderStatusError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps domain errors and adds HTTP-specific variants. Implements
/// [`IntoResponse`] to produce consistent JSON error responses of the form
/// `{ "error": ..., "code": ... }`, plus `errors` for field validation.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `commerce_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An error from the order status service.
    #[error(transparent)]
    OrderStatus(#[from] OrderStatusError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A lookup by something other than an id found nothing.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

struct ErrorParts {
    status: StatusCode,
    code: &'static str,
    message: String,
    errors: Option<serde_json::Value>,
}

impl ErrorParts {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            errors: None,
        }
    }

    fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "An internal error occurred",
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let parts = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::OrderStatus(err) => classify_order_status_error(err),
            AppError::Database(err) => classify_sqlx_error(err),
            AppError::BadRequest(msg) => ErrorParts::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            AppError::NotFound(msg) => ErrorParts::new(StatusCode::NOT_FOUND, "NOT_FOUND", msg),
        };

        let mut body = json!({
            "error": parts.message,
            "code": parts.code,
        });
        if let Some(errors) = parts.errors {
            body["errors"] = errors;
        }

        (parts.status, axum::Json(body)).into_response()
    }
}

fn classify_core_error(err: &CoreError) -> ErrorParts {
    match err {
        CoreError::NotFound { entity, id } => ErrorParts::new(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => {
            ErrorParts::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg)
        }
    }
}

fn classify_order_status_error(err: &OrderStatusError) -> ErrorParts {
    match err {
        OrderStatusError::NotFound { .. } => {
            ErrorParts::new(StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string())
        }
        OrderStatusError::Validation(fields) => ErrorParts {
            errors: serde_json::to_value(fields).ok(),
            ..ErrorParts::new(
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Order status validation failed",
            )
        },
        OrderStatusError::InUse { .. } => {
            ErrorParts::new(StatusCode::CONFLICT, "STATUS_IN_USE", err.to_string())
        }
        OrderStatusError::TooFewStatuses { .. } => {
            ErrorParts::new(StatusCode::CONFLICT, "TOO_FEW_STATUSES", err.to_string())
        }
        OrderStatusError::Core(core) => classify_core_error(core),
        OrderStatusError::Database(db) => classify_sqlx_error(db),
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> ErrorParts {
    match err {
        sqlx::Error::RowNotFound => {
            ErrorParts::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Resource not found")
        }
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return ErrorParts::new(
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            ErrorParts::internal()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            ErrorParts::internal()
        }
    }
}
