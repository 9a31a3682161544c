//! SMTP delivery for shared summaries

use async_trait::async_trait;
use lettre::address::AddressError;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use thiserror::Error;

use crate::config::Settings;
use crate::email::format::render_html;

/// Subject line used for shared summaries
pub const SUMMARY_SUBJECT: &str = "Meeting Summary";

#[derive(Debug, Error)]
pub enum MailError {
    #[error("SMTP username and password must be set (smtp.username/smtp.password or SMTP_USER/SMTP_PASS)")]
    MissingCredentials,

    #[error("At least one recipient is required")]
    NoRecipients,

    #[error("Invalid email address '{address}': {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: AddressError,
    },

    #[error("Failed to build email: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// A message ready to be delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub subject: String,
    /// Markdown-ish narrative; sent as plain text plus rendered HTML
    pub body: String,
    pub recipients: Vec<String>,
}

impl OutgoingEmail {
    pub fn summary(body: impl Into<String>, recipients: Vec<String>) -> Self {
        Self {
            subject: SUMMARY_SUBJECT.to_string(),
            body: body.into(),
            recipients,
        }
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

/// Parse recipient addresses, rejecting the first invalid one.
pub fn parse_recipients(recipients: &[String]) -> Result<Vec<Mailbox>, MailError> {
    if recipients.is_empty() {
        return Err(MailError::NoRecipients);
    }

    recipients
        .iter()
        .map(|address| {
            address
                .trim()
                .parse::<Mailbox>()
                .map_err(|source| MailError::InvalidAddress {
                    address: address.clone(),
                    source,
                })
        })
        .collect()
}

/// Sends mail through an authenticated STARTTLS relay
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn from_settings(settings: &Settings) -> Result<Self, MailError> {
        let smtp = &settings.smtp;
        if smtp.username.trim().is_empty() || smtp.password.is_empty() {
            return Err(MailError::MissingCredentials);
        }

        let sender = settings.smtp_sender().trim();
        let from = sender
            .parse::<Mailbox>()
            .map_err(|source| MailError::InvalidAddress {
                address: sender.to_string(),
                source,
            })?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)?
            .port(smtp.port)
            .credentials(Credentials::new(
                smtp.username.trim().to_string(),
                smtp.password.clone(),
            ))
            .timeout(Some(Duration::from_secs(smtp.timeout_secs)))
            .build();

        Ok(Self { transport, from })
    }

    fn build_message(&self, email: &OutgoingEmail) -> Result<Message, MailError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(email.subject.as_str());

        for mailbox in parse_recipients(&email.recipients)? {
            builder = builder.to(mailbox);
        }

        let html = render_html(&email.body);
        Ok(builder.multipart(MultiPart::alternative_plain_html(email.body.clone(), html))?)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let message = self.build_message(email)?;
        self.transport.send(message).await?;
        tracing::info!("Email sent to {}", email.recipients.join(", "));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smtp_settings() -> Settings {
        let mut settings = Settings::default();
        settings.smtp.host = "smtp.example.com".to_string();
        settings.smtp.username = "bot@example.com".to_string();
        settings.smtp.password = "hunter2".to_string();
        settings
    }

    #[test]
    fn missing_credentials_are_rejected() {
        let err = match SmtpMailer::from_settings(&Settings::default()) {
            Ok(_) => panic!("expected missing credentials"),
            Err(e) => e,
        };
        assert!(matches!(err, MailError::MissingCredentials));
    }

    #[test]
    fn invalid_sender_is_rejected() {
        let mut settings = smtp_settings();
        settings.smtp.from = "not an address".to_string();
        assert!(matches!(
            SmtpMailer::from_settings(&settings),
            Err(MailError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn recipients_are_validated() {
        assert!(matches!(parse_recipients(&[]), Err(MailError::NoRecipients)));

        let err = parse_recipients(&["ok@example.com".to_string(), "nope".to_string()])
            .unwrap_err();
        assert!(err.to_string().contains("'nope'"));

        let parsed = parse_recipients(&[" Ann <ann@example.com> ".to_string()]).unwrap();
        assert_eq!(parsed[0].email.to_string(), "ann@example.com");
    }

    #[tokio::test]
    async fn message_carries_plain_and_html_parts() {
        let mailer = SmtpMailer::from_settings(&smtp_settings()).unwrap();
        let email = OutgoingEmail::summary(
            "# Recap\n- ship it",
            vec!["ann@example.com".to_string(), "bob@example.com".to_string()],
        );

        let message = mailer.build_message(&email).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("Subject: Meeting Summary"));
        assert!(raw.contains("ann@example.com"));
        assert!(raw.contains("bob@example.com"));
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("<h2>Recap</h2><ul><li>ship it</li></ul>"));
    }
}
