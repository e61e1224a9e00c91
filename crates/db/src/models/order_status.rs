//! Order status entity model and DTOs.
//!
//! An order status is a named, colored stage an order moves through. Each
//! status may carry email templates via the `order_status_emails`
//! junction table; those are sent when an order enters the status.

use commerce_core::order_status::{validate_color, validate_handle, validate_name};
use commerce_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::email::Email;

/// A row from the `order_statuses` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct OrderStatus {
    pub id: DbId,
    pub name: String,
    pub handle: String,
    pub color: String,
    pub sort_order: i32,
    pub is_default: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An order status enriched with its email templates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderStatusWithEmails {
    #[serde(flatten)]
    pub status: OrderStatus,
    pub emails: Vec<Email>,
}

impl OrderStatusWithEmails {
    pub fn id(&self) -> DbId {
        self.status.id
    }

    pub fn handle(&self) -> &str {
        &self.status.handle
    }

    /// Ids of the attached email templates, in display order.
    pub fn email_ids(&self) -> Vec<DbId> {
        self.emails.iter().map(|e| e.id).collect()
    }
}

/// DTO for creating or updating an order status.
///
/// `id = None` creates a new status; `Some(id)` updates an existing one.
/// Email template ids are passed to the save operation separately.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SaveOrderStatus {
    #[serde(default)]
    pub id: Option<DbId>,
    #[validate(custom(function = "validate_name"))]
    pub name: String,
    #[validate(custom(function = "validate_handle"))]
    pub handle: String,
    #[validate(custom(function = "validate_color"))]
    pub color: Option<String>,
    /// Unset or zero falls back to the default sort order.
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub is_default: bool,
}

impl SaveOrderStatus {
    /// Convenience constructor for a new status with defaults.
    pub fn new(name: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            handle: handle.into(),
            color: None,
            sort_order: None,
            is_default: false,
        }
    }
}
