//! Email template recipient rules.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Who an email template is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientType {
    /// The customer who placed the order.
    Customer,
    /// A fixed address configured on the template.
    Custom,
}

impl RecipientType {
    pub fn as_str(self) -> &'static str {
        match self {
            RecipientType::Customer => "customer",
            RecipientType::Custom => "custom",
        }
    }

    /// Parse the stored column value.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "customer" => Ok(RecipientType::Customer),
            "custom" => Ok(RecipientType::Custom),
            other => Err(CoreError::Validation(format!(
                "Unknown email recipient type '{other}'"
            ))),
        }
    }
}

/// Resolve the address an email template should be sent to.
///
/// Customer templates go to the order's email; custom templates go to the
/// template's own `to_address`. Returns `None` when the chosen address is
/// missing or blank.
pub fn resolve_recipient(
    recipient_type: RecipientType,
    to_address: Option<&str>,
    order_email: Option<&str>,
) -> Option<String> {
    let address = match recipient_type {
        RecipientType::Customer => order_email,
        RecipientType::Custom => to_address,
    }?;
    let trimmed = address.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
