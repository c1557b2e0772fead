use std::time::Duration;

use anyhow::{Context as _, bail};

use crate::domain::types::{
    CodeTtl, DEFAULT_CODE_SWEEP_INTERVAL_SECS, DEFAULT_PASSWORD_RESET_CODE_TTL_HOURS,
    DEFAULT_REGISTRATION_CODE_TTL_HOURS,
};

pub const DEFAULT_MAIL_FROM: &str = "no-reply@mangareader.local";

/// Outbound mail settings.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// HTTP mail API endpoint. Env var: `MAIL_API_URL`. Unset means log-only delivery.
    pub api_url: Option<String>,
    /// Bearer key for the mail API. Env var: `MAIL_API_KEY`.
    pub api_key: String,
    /// Sender address. Env var: `MAIL_FROM`.
    pub from: String,
}

/// Auth service configuration loaded from environment variables.
#[derive(Debug)]
pub struct AuthConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing JWT access tokens.
    pub jwt_secret: String,
    /// TCP port to listen on (default 3112). Env var: `AUTH_PORT`.
    pub auth_port: u16,
    /// Env var: `REGISTRATION_CODE_EXPIRATION_HOURS`.
    pub registration_code_ttl_hours: i64,
    /// Env var: `PASSWORD_RESET_CODE_EXPIRATION_HOURS`.
    pub password_reset_code_ttl_hours: i64,
    /// Env var: `CODE_SWEEP_INTERVAL_SECS`.
    pub code_sweep_interval_secs: u64,
    pub mail: MailConfig,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok()).expect("invalid auth configuration")
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let required = |key: &str| lookup(key).with_context(|| format!("{key} is not set"));
        let parsed_or = |key: &str, default: &str| -> String {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_owned())
        };

        let registration_code_ttl_hours: i64 = parsed_or(
            "REGISTRATION_CODE_EXPIRATION_HOURS",
            &DEFAULT_REGISTRATION_CODE_TTL_HOURS.to_string(),
        )
        .parse()
        .context("REGISTRATION_CODE_EXPIRATION_HOURS")?;
        let password_reset_code_ttl_hours: i64 = parsed_or(
            "PASSWORD_RESET_CODE_EXPIRATION_HOURS",
            &DEFAULT_PASSWORD_RESET_CODE_TTL_HOURS.to_string(),
        )
        .parse()
        .context("PASSWORD_RESET_CODE_EXPIRATION_HOURS")?;
        if registration_code_ttl_hours <= 0 || password_reset_code_ttl_hours <= 0 {
            bail!("code expiration hours must be positive");
        }

        let code_sweep_interval_secs: u64 = parsed_or(
            "CODE_SWEEP_INTERVAL_SECS",
            &DEFAULT_CODE_SWEEP_INTERVAL_SECS.to_string(),
        )
        .parse()
        .context("CODE_SWEEP_INTERVAL_SECS")?;
        if code_sweep_interval_secs == 0 {
            bail!("CODE_SWEEP_INTERVAL_SECS must be positive");
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            auth_port: lookup("AUTH_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(3112),
            registration_code_ttl_hours,
            password_reset_code_ttl_hours,
            code_sweep_interval_secs,
            mail: MailConfig {
                api_url: lookup("MAIL_API_URL").filter(|v| !v.trim().is_empty()),
                api_key: lookup("MAIL_API_KEY").unwrap_or_default(),
                from: parsed_or("MAIL_FROM", DEFAULT_MAIL_FROM),
            },
        })
    }

    pub fn code_ttl(&self) -> CodeTtl {
        CodeTtl::from_hours(
            self.registration_code_ttl_hours,
            self.password_reset_code_ttl_hours,
        )
    }

    pub fn code_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.code_sweep_interval_secs)
    }
}
