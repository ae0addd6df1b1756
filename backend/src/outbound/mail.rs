//! Mail adapters: an HTTP relay client and a tracing fallback.
//!
//! The relay speaks a Brevo-style transactional API: one JSON POST per
//! message, authenticated with an `api-key` header. Delivery beyond the
//! relay's 2xx answer is out of scope here.

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use crate::domain::activation::ActivationCode;
use crate::domain::ports::mailer::{ConfirmationMail, Mailer, MailerError};

/// Settings for the HTTP mail relay.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Relay endpoint receiving the JSON payload.
    pub endpoint: String,
    /// Value of the `api-key` request header.
    pub api_key: String,
    /// Sender address shown to recipients.
    pub sender_email: String,
    /// Optional sender display name.
    pub sender_name: Option<String>,
    /// Public base URL the completion link points at.
    pub app_url: String,
}

/// Activation link embedded in the confirmation mail.
pub fn completion_link(app_url: &str, code: &ActivationCode) -> String {
    let base = app_url.trim_end_matches('/');
    format!("{base}/api/v1/auth/activation/complete/{code}")
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RelayAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RelayPayload {
    sender: RelayAddress,
    to: Vec<RelayAddress>,
    subject: String,
    text_content: String,
}

impl RelayPayload {
    fn confirmation(config: &MailConfig, mail: &ConfirmationMail) -> Self {
        let link = completion_link(&config.app_url, &mail.code);
        Self {
            sender: RelayAddress {
                email: config.sender_email.clone(),
                name: config.sender_name.clone(),
            },
            to: vec![RelayAddress {
                email: mail.to.as_ref().to_owned(),
                name: Some(mail.username.as_ref().to_owned()),
            }],
            subject: "Confirm your account".to_owned(),
            text_content: format!(
                "Hello {username},\n\n\
                 Follow this link to activate your account:\n{link}\n\n\
                 If you did not register, ignore this message.",
                username = mail.username
            ),
        }
    }
}

/// Mailer delivering through an HTTP relay.
#[derive(Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    config: MailConfig,
}

impl HttpMailer {
    pub fn new(client: reqwest::Client, config: MailConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send_confirmation(&self, mail: &ConfirmationMail) -> Result<(), MailerError> {
        let payload = RelayPayload::confirmation(&self.config, mail);
        let response = self
            .client
            .post(&self.config.endpoint)
            .header("api-key", &self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MailerError::transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(MailerError::rejected(format!(
            "relay answered {status}: {body}"
        )))
    }
}

/// Mailer that only logs; used when no relay is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMailer;

#[async_trait]
impl Mailer for TracingMailer {
    async fn send_confirmation(&self, mail: &ConfirmationMail) -> Result<(), MailerError> {
        info!(
            to = %mail.to,
            user = %mail.username,
            code = %mail.code,
            "confirmation mail suppressed, no relay configured"
        );
        Ok(())
    }
}
