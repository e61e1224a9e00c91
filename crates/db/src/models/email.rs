//! Email template entity model and DTOs.

use commerce_core::email::RecipientType;
use commerce_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `emails` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Email {
    pub id: DbId,
    pub name: String,
    pub subject: String,
    pub recipient_type: String,
    pub to_address: Option<String>,
    pub bcc: Option<String>,
    pub enabled: bool,
    pub template_path: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Email {
    /// Parsed recipient type. Unknown stored values fall back to customer,
    /// which the `ck_emails_recipient_type` constraint makes unreachable.
    pub fn recipient(&self) -> RecipientType {
        RecipientType::parse(&self.recipient_type).unwrap_or(RecipientType::Customer)
    }
}

/// An email joined with the order status it is attached to.
#[derive(Debug, Clone, FromRow)]
pub struct StatusEmail {
    pub order_status_id: DbId,
    #[sqlx(flatten)]
    pub email: Email,
}

/// DTO for creating a new email template.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEmail {
    pub name: String,
    pub subject: String,
    pub recipient_type: RecipientType,
    pub to_address: Option<String>,
    pub bcc: Option<String>,
    pub enabled: Option<bool>,
    pub template_path: String,
}
