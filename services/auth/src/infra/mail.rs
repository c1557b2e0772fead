use askama::Template;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::config::MailConfig;
use crate::domain::repository::EmailGateway;
use crate::error::AuthServiceError;

const BRAND: &str = "Mangas World";

/// A rendered outbound email.
#[derive(Debug, Clone, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

fn format_expiry(expires_at: DateTime<Utc>) -> String {
    expires_at.format("%d/%m/%Y %H:%M UTC").to_string()
}

#[derive(Template, Debug)]
#[template(path = "emails/verification_code.html")]
pub struct VerificationCodeEmail<'a> {
    pub brand: &'a str,
    pub code: &'a str,
    pub expires_at: &'a str,
}

#[derive(Template, Debug)]
#[template(path = "emails/password_reset.html")]
pub struct PasswordResetEmail<'a> {
    pub brand: &'a str,
    pub code: &'a str,
    pub expires_at: &'a str,
}

fn render(template: &impl Template) -> Result<String, AuthServiceError> {
    template
        .render()
        .map_err(|e| anyhow::Error::new(e).context("render email template").into())
}

pub fn verification_message(
    from: &str,
    to: &str,
    code: &str,
    expires_at: DateTime<Utc>,
) -> Result<EmailMessage, AuthServiceError> {
    let html = render(&VerificationCodeEmail {
        brand: BRAND,
        code,
        expires_at: &format_expiry(expires_at),
    })?;
    Ok(EmailMessage {
        from: from.to_owned(),
        to: to.to_owned(),
        subject: format!("{BRAND} - Verify your account"),
        html,
    })
}

pub fn password_reset_message(
    from: &str,
    to: &str,
    code: &str,
    expires_at: DateTime<Utc>,
) -> Result<EmailMessage, AuthServiceError> {
    let html = render(&PasswordResetEmail {
        brand: BRAND,
        code,
        expires_at: &format_expiry(expires_at),
    })?;
    Ok(EmailMessage {
        from: from.to_owned(),
        to: to.to_owned(),
        subject: format!("{BRAND} - Password reset"),
        html,
    })
}

// ── HTTP mail API ────────────────────────────────────────────────────────────

/// Posts rendered messages as JSON to a transactional mail API.
#[derive(Clone)]
pub struct HttpMailer {
    pub client: reqwest::Client,
    pub api_url: String,
    pub api_key: String,
}

impl HttpMailer {
    async fn deliver(&self, message: &EmailMessage) -> Result<(), AuthServiceError> {
        self.client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(message)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| AuthServiceError::DeliveryFailed(e.into()))?;
        info!(to = %message.to, subject = %message.subject, "email sent");
        Ok(())
    }
}

// ── Log-only delivery ────────────────────────────────────────────────────────

/// Writes messages to the log instead of sending them. Used when no mail API is configured.
#[derive(Clone, Copy, Default)]
pub struct LogMailer;

impl LogMailer {
    fn deliver(message: &EmailMessage) {
        info!(to = %message.to, subject = %message.subject, html = %message.html, "email not sent (log-only delivery)");
    }
}

// ── Mailer ───────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub enum MailTransport {
    Http(HttpMailer),
    Log(LogMailer),
}

#[derive(Clone)]
pub struct Mailer {
    pub from: String,
    pub transport: MailTransport,
}

impl Mailer {
    pub fn from_config(config: &MailConfig) -> Self {
        let transport = match &config.api_url {
            Some(api_url) => MailTransport::Http(HttpMailer {
                client: reqwest::Client::new(),
                api_url: api_url.clone(),
                api_key: config.api_key.clone(),
            }),
            None => MailTransport::Log(LogMailer),
        };
        Self {
            from: config.from.clone(),
            transport,
        }
    }

    async fn send(&self, message: EmailMessage) -> Result<(), AuthServiceError> {
        match &self.transport {
            MailTransport::Http(http) => http.deliver(&message).await,
            MailTransport::Log(_) => {
                LogMailer::deliver(&message);
                Ok(())
            }
        }
    }
}

impl EmailGateway for Mailer {
    async fn send_verification_code(
        &self,
        to: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthServiceError> {
        self.send(verification_message(&self.from, to, code, expires_at)?)
            .await
    }

    async fn send_password_reset(
        &self,
        to: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthServiceError> {
        self.send(password_reset_message(&self.from, to, code, expires_at)?)
            .await
    }
}
