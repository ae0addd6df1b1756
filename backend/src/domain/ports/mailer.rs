//! Port abstraction for outbound confirmation mail.

use async_trait::async_trait;

use crate::domain::activation::ActivationCode;
use crate::domain::user::{Email, Username};

use super::macros::define_port_error;

define_port_error! {
    /// Delivery errors raised by mailer adapters.
    pub enum MailerError {
        /// The relay could not be reached.
        Transport { message: String } => "mail transport failed: {message}",
        /// The relay refused the message.
        Rejected { message: String } => "mail rejected by relay: {message}",
    }
}

/// Account-confirmation mail addressed to a freshly registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationMail {
    pub to: Email,
    pub username: Username,
    pub code: ActivationCode,
}

/// Driven port for sending transactional mail.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver the account-confirmation mail.
    async fn send_confirmation(&self, mail: &ConfirmationMail) -> Result<(), MailerError>;
}
