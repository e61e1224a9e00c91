//! Integration tests for the status change notifier.
//!
//! Uses a recording mailer in place of SMTP. Migrations seed two statuses:
//! `new` (default) and `shipped`.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use commerce_core::email::RecipientType;
use commerce_core::types::DbId;
use commerce_db::models::email::CreateEmail;
use commerce_db::models::order::{CreateOrder, Order, OrderHistory};
use commerce_db::models::order_status::SaveOrderStatus;
use commerce_db::repositories::{EmailRepo, OrderRepo};
use commerce_db::services::OrderStatusService;
use commerce_events::{EmailError, OutgoingEmail, StatusChangeNotifier, StatusMailer};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Records every message; fails any message whose subject is `fail_subject`.
#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    fail_subject: Option<String>,
}

impl RecordingMailer {
    fn failing_on(subject: &str) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_subject: Some(subject.to_string()),
        }
    }

    fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatusMailer for RecordingMailer {
    async fn send(&self, message: &OutgoingEmail) -> Result<(), EmailError> {
        if self.fail_subject.as_deref() == Some(message.subject.as_str()) {
            return Err(EmailError::Build("simulated failure".to_string()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

async fn new_email(
    pool: &PgPool,
    name: &str,
    recipient_type: RecipientType,
    to_address: Option<&str>,
    enabled: bool,
) -> DbId {
    EmailRepo::create(
        pool,
        &CreateEmail {
            name: name.to_string(),
            subject: format!("{name}: {{order.number}} is {{status.name}}"),
            recipient_type,
            to_address: to_address.map(str::to_string),
            bcc: None,
            enabled: Some(enabled),
            template_path: format!("emails/{name}"),
        },
    )
    .await
    .unwrap()
    .id
}

async fn status_with_emails(service: &OrderStatusService, handle: &str, email_ids: &[DbId]) -> DbId {
    service
        .save(&SaveOrderStatus::new(handle, handle), email_ids)
        .await
        .unwrap()
        .id()
}

async fn order_in(pool: &PgPool, email: Option<&str>, status_id: DbId) -> (Order, OrderHistory) {
    let order = OrderRepo::create(
        pool,
        &CreateOrder {
            number: "A-1001".to_string(),
            email: email.map(str::to_string),
            order_status_id: None,
        },
    )
    .await
    .unwrap();

    OrderRepo::change_status(pool, order.id, status_id, Some("On its way"))
        .await
        .unwrap()
        .expect("order should exist")
}

fn notifier(pool: &PgPool, mailer: Arc<RecordingMailer>) -> StatusChangeNotifier {
    let service = Arc::new(OrderStatusService::new(pool.clone()));
    StatusChangeNotifier::new(service, mailer)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn sends_one_email_per_enabled_template(pool: PgPool) {
    let customer = new_email(&pool, "customer", RecipientType::Customer, None, true).await;
    let ops = new_email(&pool, "ops", RecipientType::Custom, Some("ops@example.com"), true).await;
    let disabled = new_email(&pool, "disabled", RecipientType::Customer, None, false).await;

    let service = OrderStatusService::new(pool.clone());
    let status_id = status_with_emails(&service, "packed", &[customer, ops, disabled]).await;
    let (order, history) = order_in(&pool, Some("buyer@example.com"), status_id).await;

    let mailer = Arc::new(RecordingMailer::default());
    let sent = notifier(&pool, Arc::clone(&mailer))
        .on_status_change(&order, &history)
        .await
        .unwrap();

    assert_eq!(sent, 2);
    let messages = mailer.sent();
    let mut recipients: Vec<_> = messages.iter().map(|m| m.to.as_str()).collect();
    recipients.sort_unstable();
    assert_eq!(recipients, vec!["buyer@example.com", "ops@example.com"]);

    let customer_mail = messages.iter().find(|m| m.to == "buyer@example.com").unwrap();
    assert_eq!(customer_mail.subject, "customer: A-1001 is packed");
    assert_eq!(customer_mail.body, "Order A-1001 is now packed.\n\nOn its way");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn skips_templates_without_recipient(pool: PgPool) {
    let customer = new_email(&pool, "customer", RecipientType::Customer, None, true).await;
    let ops = new_email(&pool, "ops", RecipientType::Custom, Some("ops@example.com"), true).await;

    let service = OrderStatusService::new(pool.clone());
    let status_id = status_with_emails(&service, "packed", &[customer, ops]).await;
    let (order, history) = order_in(&pool, None, status_id).await;

    let mailer = Arc::new(RecordingMailer::default());
    let sent = notifier(&pool, Arc::clone(&mailer))
        .on_status_change(&order, &history)
        .await
        .unwrap();

    assert_eq!(sent, 1);
    assert_eq!(mailer.sent()[0].to, "ops@example.com");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn failed_send_does_not_stop_remaining_templates(pool: PgPool) {
    let first = new_email(&pool, "first", RecipientType::Customer, None, true).await;
    let second = new_email(&pool, "second", RecipientType::Customer, None, true).await;

    let service = OrderStatusService::new(pool.clone());
    let status_id = status_with_emails(&service, "packed", &[first, second]).await;
    let (order, history) = order_in(&pool, Some("buyer@example.com"), status_id).await;

    let mailer = Arc::new(RecordingMailer::failing_on("first: A-1001 is packed"));
    let sent = notifier(&pool, Arc::clone(&mailer))
        .on_status_change(&order, &history)
        .await
        .unwrap();

    assert_eq!(sent, 1);
    assert_eq!(mailer.sent()[0].subject, "second: A-1001 is packed");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn order_without_status_sends_nothing(pool: PgPool) {
    let order = OrderRepo::create(
        &pool,
        &CreateOrder {
            number: "A-2002".to_string(),
            email: Some("buyer@example.com".to_string()),
            order_status_id: None,
        },
    )
    .await
    .unwrap();
    let history = OrderHistory {
        id: 0,
        order_id: order.id,
        prev_status_id: None,
        new_status_id: None,
        message: None,
        created_at: order.created_at,
    };

    let mailer = Arc::new(RecordingMailer::default());
    let sent = notifier(&pool, Arc::clone(&mailer))
        .on_status_change(&order, &history)
        .await
        .unwrap();

    assert_eq!(sent, 0);
    assert!(mailer.sent().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn status_without_emails_sends_nothing(pool: PgPool) {
    let service = OrderStatusService::new(pool.clone());
    let shipped = service.get_by_handle("shipped").await.unwrap().unwrap().id();
    let (order, history) = order_in(&pool, Some("buyer@example.com"), shipped).await;

    let mailer = Arc::new(RecordingMailer::default());
    let sent = notifier(&pool, Arc::clone(&mailer))
        .on_status_change(&order, &history)
        .await
        .unwrap();

    assert_eq!(sent, 0);
}
