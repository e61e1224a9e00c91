//! Sends the email templates attached to an order's new status.

use std::sync::Arc;

use commerce_db::models::order::{Order, OrderHistory};
use commerce_db::services::{OrderStatusError, OrderStatusService};

use crate::mailer::{compose_status_email, StatusMailer};

/// Handles order status changes by mailing every enabled template linked
/// to the order's current status.
pub struct StatusChangeNotifier {
    statuses: Arc<OrderStatusService>,
    mailer: Arc<dyn StatusMailer>,
}

impl StatusChangeNotifier {
    pub fn new(statuses: Arc<OrderStatusService>, mailer: Arc<dyn StatusMailer>) -> Self {
        Self { statuses, mailer }
    }

    /// Deliver the status emails for `order` and return how many were sent.
    ///
    /// Individual send failures are logged and skipped. Only a failure to
    /// look the status up is returned as an error.
    pub async fn on_status_change(
        &self,
        order: &Order,
        history: &OrderHistory,
    ) -> Result<usize, OrderStatusError> {
        let Some(status_id) = order.order_status_id else {
            return Ok(0);
        };

        let Some(status) = self.statuses.get_by_id(status_id).await? else {
            tracing::warn!(
                order_id = order.id,
                status_id,
                "Order references a missing order status, no emails sent"
            );
            return Ok(0);
        };

        let mut sent = 0;
        for template in status.emails.iter().filter(|e| e.enabled) {
            let Some(message) = compose_status_email(template, order, &status.status, history)
            else {
                tracing::warn!(
                    order_id = order.id,
                    email_id = template.id,
                    recipient_type = %template.recipient_type,
                    "No recipient for status email, skipping"
                );
                continue;
            };

            match self.mailer.send(&message).await {
                Ok(()) => sent += 1,
                Err(e) => {
                    tracing::error!(
                        order_id = order.id,
                        email_id = template.id,
                        to = %message.to,
                        error = %e,
                        "Failed to send status email"
                    );
                }
            }
        }

        tracing::info!(
            order_id = order.id,
            status_id,
            sent,
            "Order status change notifications processed"
        );
        Ok(sent)
    }
}
