//! Order and order history models.
//!
//! Orders are owned by the wider platform; only the columns the status
//! service reads are modelled.

use commerce_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `orders` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Order {
    pub id: DbId,
    pub number: String,
    pub email: Option<String>,
    pub order_status_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new order.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrder {
    pub number: String,
    pub email: Option<String>,
    pub order_status_id: Option<DbId>,
}

/// A row from the `order_histories` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct OrderHistory {
    pub id: DbId,
    pub order_id: DbId,
    pub prev_status_id: Option<DbId>,
    pub new_status_id: Option<DbId>,
    pub message: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for changing an order's status.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeOrderStatus {
    pub order_status_id: DbId,
    pub message: Option<String>,
}
