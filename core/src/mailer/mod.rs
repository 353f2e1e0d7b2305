//! SMTP notification sender
//!
//! STARTTLS transport with a connection timeout; the credential is read
//! from the environment at config load and never logged.

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use tracing::info;

use crate::config::Config;
use crate::error::{RelayError, Result};

#[derive(Debug)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl Mailer {
    pub fn from_config(config: &Config) -> Result<Self> {
        let password =
            config
                .secrets
                .smtp_password
                .clone()
                .ok_or(RelayError::MissingConfig {
                    key: crate::config::ENV_SMTP_PASSWORD.to_string(),
                })?;

        let sender: Mailbox =
            config
                .smtp
                .sender
                .parse()
                .map_err(|_| RelayError::InvalidAddress {
                    address: config.smtp.sender.clone(),
                })?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp.host)
            .map_err(|e| RelayError::MailFailed {
                message: e.to_string(),
            })?
            .port(config.smtp.port)
            .credentials(Credentials::new(config.smtp.sender.clone(), password))
            .timeout(Some(Duration::from_secs(config.request_timeout_secs)))
            .build();

        Ok(Self { transport, sender })
    }

    /// Send a plain-text notification.
    pub async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        let to: Mailbox = recipient.parse().map_err(|_| RelayError::InvalidAddress {
            address: recipient.to_string(),
        })?;

        let message = Message::builder()
            .from(self.sender.clone())
            .to(to)
            .subject(subject)
            .body(body.to_string())
            .map_err(|e| RelayError::MailFailed {
                message: e.to_string(),
            })?;

        self.transport
            .send(message)
            .await
            .map_err(|e| RelayError::MailFailed {
                // SMTP errors describe the session, not the credential
                message: e.to_string(),
            })?;

        info!(recipient, "notification email sent");
        Ok(())
    }
}
