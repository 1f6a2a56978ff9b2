// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use std::fmt::Debug;

use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};

use crate::config::EmailSettings;

/// Subject of alerts raised for balancing loads and for the run as a whole
pub const ETL_FAILED_SUBJECT: &str = "ENTSOE ETL Failed";
pub const DAY_AHEAD_FAILED_SUBJECT: &str = "ENTSOE Day-ahead ETL Failed";

/// Destination for failure alerts
#[async_trait]
pub trait AlertSink: Debug + Send + Sync {
    async fn send_alert(&self, subject: &str, body: &str) -> Result<()>;
}

/// Sends alerts as plain-text email to a single recipient
#[derive(Debug)]
pub struct EmailNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailNotifier {
    pub fn new(config: &EmailSettings) -> Result<Self> {
        let from: Mailbox = config
            .sender()
            .parse()
            .with_context(|| format!("Invalid sender address: {}", config.sender()))?;
        let to: Mailbox = config
            .alert_recipient
            .parse()
            .with_context(|| format!("Invalid alert recipient: {}", config.alert_recipient))?;

        let creds = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

        let transport = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
                .with_context(|| format!("Failed to create SMTP relay: {}", config.smtp_host))?
                .port(config.smtp_port)
                .credentials(creds)
                .build()
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
                .port(config.smtp_port)
                .credentials(creds)
                .build()
        };

        Ok(Self { transport, from, to })
    }

    fn build_message(&self, subject: &str, body: &str) -> Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .body(body.to_owned())
            .context("Failed to build email message")
    }
}

#[async_trait]
impl AlertSink for EmailNotifier {
    async fn send_alert(&self, subject: &str, body: &str) -> Result<()> {
        let message = self.build_message(subject, body)?;
        self.transport
            .send(message)
            .await
            .context("Failed to send alert email")?;

        info!(recipient = %self.to, subject = %subject, "Alert email sent");
        Ok(())
    }
}

/// Fallback when SMTP is not configured
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl AlertSink for LogNotifier {
    async fn send_alert(&self, subject: &str, body: &str) -> Result<()> {
        warn!(subject = %subject, body = %body, "Alert (email not configured)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> EmailSettings {
        EmailSettings {
            smtp_host: "smtp.example.com".to_owned(),
            smtp_port: 587,
            smtp_username: "etl@example.com".to_owned(),
            smtp_password: "secret".to_owned(),
            from_address: None,
            alert_recipient: "ops@example.com".to_owned(),
            use_tls: true,
        }
    }

    #[tokio::test]
    async fn test_notifier_builds_plain_text_message() {
        let notifier = EmailNotifier::new(&settings()).unwrap();
        let message = notifier
            .build_message(ETL_FAILED_SUBJECT, "Germany-Amprion failed")
            .unwrap();

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: ENTSOE ETL Failed"));
        assert!(raw.contains("From: etl@example.com"));
        assert!(raw.contains("To: ops@example.com"));
        assert!(raw.contains("Germany-Amprion failed"));
    }

    #[tokio::test]
    async fn test_notifier_without_tls() {
        let mut config = settings();
        config.use_tls = false;
        config.smtp_port = 25;
        config.from_address = Some("alerts@example.com".to_owned());

        let notifier = EmailNotifier::new(&config).unwrap();
        assert_eq!(notifier.from.email.to_string(), "alerts@example.com");
    }

    #[test]
    fn test_invalid_recipient_is_rejected() {
        let mut config = settings();
        config.alert_recipient = "not an address".to_owned();
        assert!(EmailNotifier::new(&config).is_err());
    }

    #[tokio::test]
    async fn test_log_notifier_never_fails() {
        assert!(LogNotifier.send_alert("subject", "body").await.is_ok());
    }
}
