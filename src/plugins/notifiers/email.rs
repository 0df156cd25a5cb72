use async_trait::async_trait;
use lettre::message::{header, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::env;
use tracing::{error, info, warn};

use crate::config::SmtpConfig;
use crate::plugins::traits::{NotificationResult, Notifier, PriceAlert};
use crate::utils::error::{AppError, Result};

#[derive(Debug, Clone)]
pub struct EmailCredentials {
    pub username: String,
    pub password: String,
}

impl EmailCredentials {
    /// Read the account and app password from the configured variables.
    pub fn from_env(config: &SmtpConfig) -> Option<Self> {
        let username = env::var(&config.username_env).ok().filter(|v| !v.is_empty())?;
        let password = env::var(&config.password_env).ok().filter(|v| !v.is_empty())?;
        Some(Self { username, password })
    }
}

/// Sends a plain-text alert over implicit-TLS SMTP.
///
/// Credentials are looked up on every send, so they can be supplied after
/// startup. The alert goes to the sending account unless `to_address` is set.
pub struct EmailNotifier {
    config: SmtpConfig,
    currency_symbol: String,
}

impl EmailNotifier {
    pub fn new(config: SmtpConfig, currency_symbol: impl Into<String>) -> Self {
        Self {
            config,
            currency_symbol: currency_symbol.into(),
        }
    }

    fn format_subject(&self, alert: &PriceAlert) -> String {
        format!(
            "Price Drop Alert: {} now at {}{}",
            alert.name, self.currency_symbol, alert.price
        )
    }

    fn format_text_body(&self, alert: &PriceAlert) -> String {
        let mut text = String::new();

        text.push_str("Great news! The price has dropped!\n\n");
        text.push_str(&format!("Product: {}\n", alert.name));
        text.push_str(&format!("Current Price: {}{}\n", self.currency_symbol, alert.price));
        if let Some(previous) = alert.previous_price {
            text.push_str(&format!("Previous Price: {}{}\n", self.currency_symbol, previous));
        }
        text.push_str(&format!("Your Target: {}{}\n", self.currency_symbol, alert.target_price));
        text.push_str(&format!("Link: {}\n\n", alert.url));
        text.push_str("Happy shopping!\n");

        text
    }

    fn build_message(&self, alert: &PriceAlert, credentials: &EmailCredentials) -> Result<Message> {
        let from = Mailbox::new(self.config.from_name.clone(), credentials.username.parse()?);
        let to: Mailbox = match &self.config.to_address {
            Some(address) => address.parse()?,
            None => credentials.username.parse()?,
        };

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(self.format_subject(alert))
            .header(header::ContentType::TEXT_PLAIN)
            .body(self.format_text_body(alert))?;

        Ok(message)
    }

    fn build_transport(&self, credentials: &EmailCredentials) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.host)
            .map_err(|e| AppError::Notification {
                notifier: "email".to_string(),
                message: format!("cannot set up SMTP relay {}: {}", self.config.host, e),
            })?
            .port(self.config.port)
            .credentials(Credentials::new(
                credentials.username.clone(),
                credentials.password.clone(),
            ))
            .build();

        Ok(transport)
    }

    async fn send_with(&self, alert: &PriceAlert, credentials: &EmailCredentials) -> Result<NotificationResult> {
        let message = self.build_message(alert, credentials)?;
        let mailer = self.build_transport(credentials)?;

        match mailer.send(message).await {
            Ok(response) => {
                info!("Alert email sent for {}", alert.name);
                let message_id = response
                    .message()
                    .next()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("email-{}", chrono::Utc::now().timestamp()));
                Ok(NotificationResult::sent(message_id))
            }
            Err(e) => {
                error!("Failed to send email for {}: {}", alert.name, e);
                Ok(NotificationResult::failed(e.to_string()))
            }
        }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, alert: &PriceAlert) -> Result<NotificationResult> {
        let Some(credentials) = EmailCredentials::from_env(&self.config) else {
            warn!(
                "Email credentials not set ({} / {}), skipping alert for {}",
                self.config.username_env, self.config.password_env, alert.name
            );
            return Ok(NotificationResult::failed("email credentials not set"));
        };

        self.send_with(alert, &credentials).await
    }
}
