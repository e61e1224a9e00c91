//! Mailer port used by the status change notifier.

use async_trait::async_trait;
use commerce_core::email::resolve_recipient;
use commerce_db::models::email::Email;
use commerce_db::models::order::{Order, OrderHistory};
use commerce_db::models::order_status::OrderStatus;

use crate::email::EmailError;

/// A fully addressed plain-text email ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub bcc: Option<String>,
    pub subject: String,
    pub body: String,
    /// Name of the template the message was built from, for logging.
    pub template_name: String,
}

/// Delivers status change emails.
#[async_trait]
pub trait StatusMailer: Send + Sync {
    async fn send(&self, message: &OutgoingEmail) -> Result<(), EmailError>;
}

/// Substitute `{order.number}`, `{status.name}` and `{status.handle}`.
fn render(template: &str, order: &Order, status: &OrderStatus) -> String {
    template
        .replace("{order.number}", &order.number)
        .replace("{status.name}", &status.name)
        .replace("{status.handle}", &status.handle)
}

/// Build the message for one email template.
///
/// Returns `None` when the template has no resolvable recipient.
pub fn compose_status_email(
    template: &Email,
    order: &Order,
    status: &OrderStatus,
    history: &OrderHistory,
) -> Option<OutgoingEmail> {
    let to = resolve_recipient(
        template.recipient(),
        template.to_address.as_deref(),
        order.email.as_deref(),
    )?;

    let mut body = format!("Order {} is now {}.", order.number, status.name);
    if let Some(message) = history.message.as_deref().filter(|m| !m.trim().is_empty()) {
        body.push_str("\n\n");
        body.push_str(message);
    }

    Some(OutgoingEmail {
        to,
        bcc: template
            .bcc
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(str::to_string),
        subject: render(&template.subject, order, status),
        body,
        template_name: template.name.clone(),
    })
}
