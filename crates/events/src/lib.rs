//! Order status change notifications.
//!
//! [`StatusChangeNotifier`] reacts to an order entering a new status by
//! sending every email template attached to that status through a
//! [`StatusMailer`]. [`SmtpStatusMailer`] is the production mailer.

pub mod email;
pub mod mailer;
pub mod notifier;

pub use email::{EmailConfig, EmailError, SmtpStatusMailer};
pub use mailer::{OutgoingEmail, StatusMailer};
pub use notifier::StatusChangeNotifier;
