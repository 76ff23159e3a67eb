// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMTP delivery through lettre's async transport.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use tracing::debug;

use casebook_config::model::SmtpConfig;
use casebook_core::{
    AdapterType, CasebookError, HealthStatus, NotifierAdapter, OutboundEmail, PluginAdapter,
};

fn notification_err<E>(message: &str, source: E) -> CasebookError
where
    E: std::error::Error + Send + Sync + 'static,
{
    CasebookError::Notification {
        message: format!("{message}: {source}"),
        source: Some(Box::new(source)),
    }
}

/// Sends HTML email through an SMTP relay.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    /// Build the transport. STARTTLS upgrades a plain connection; otherwise
    /// the relay is reached over implicit TLS.
    pub fn new(config: &SmtpConfig) -> Result<Self, CasebookError> {
        let from: Mailbox = config
            .from_address
            .parse()
            .map_err(|e| notification_err("invalid from_address", e))?;

        let builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        }
        .map_err(|e| notification_err("invalid smtp relay", e))?
        .port(config.port);

        let builder = match &config.password {
            Some(password) => {
                let user = config
                    .username
                    .clone()
                    .unwrap_or_else(|| config.from_address.clone());
                builder.credentials(Credentials::new(user, password.clone()))
            }
            None => builder,
        };

        debug!(host = %config.host, port = config.port, starttls = config.starttls, "smtp transport configured");
        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl PluginAdapter for SmtpNotifier {
    fn name(&self) -> &str {
        "smtp"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Notifier
    }

    async fn health_check(&self) -> Result<HealthStatus, CasebookError> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(HealthStatus::Healthy),
            Ok(false) => Ok(HealthStatus::Degraded("smtp relay refused NOOP".into())),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), CasebookError> {
        Ok(())
    }
}

#[async_trait]
impl NotifierAdapter for SmtpNotifier {
    async fn send(&self, email: &OutboundEmail) -> Result<(), CasebookError> {
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| notification_err("invalid recipient", e))?;

        let message = lettre::Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(email.html_body.clone())
            .map_err(|e| notification_err("failed to build message", e))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| notification_err("smtp send failed", e))?;
        Ok(())
    }
}
