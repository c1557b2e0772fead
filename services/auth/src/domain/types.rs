use std::fmt;
use std::ops::RangeInclusive;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Account data the auth flows act on.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    /// Lowercased.
    pub email: String,
    /// argon2 PHC string.
    pub password_hash: String,
    pub role: u8,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Why a verification code was issued.
///
/// The digit count of a code is derived from its purpose. Each purpose must own a
/// distinct digit count so a code string can never be mistaken for another purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodePurpose {
    /// Email confirmation after sign-up.
    Registration,
    /// Forgot-password flow.
    PasswordReset,
}

impl CodePurpose {
    pub const ALL: [CodePurpose; 2] = [CodePurpose::Registration, CodePurpose::PasswordReset];

    pub fn digits(self) -> u32 {
        match self {
            Self::Registration => 6,
            Self::PasswordReset => 7,
        }
    }

    /// Every value in this range renders with exactly [`digits`](Self::digits) digits.
    pub fn code_range(self) -> RangeInclusive<u32> {
        let low = 10u32.pow(self.digits() - 1);
        low..=low * 10 - 1
    }

    /// Value stored in the `purpose` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Registration => "registration",
            Self::PasswordReset => "password_reset",
        }
    }

    pub fn from_db(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == value)
    }
}

impl fmt::Display for CodePurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted verification code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationCode {
    pub id: Uuid,
    pub user_id: Uuid,
    pub purpose: CodePurpose,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

impl VerificationCode {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// True when the record was issued for `purpose` and its code has that purpose's shape.
    pub fn matches_format(&self, purpose: CodePurpose) -> bool {
        self.purpose == purpose
            && self.code.len() == purpose.digits() as usize
            && self.code.bytes().all(|b| b.is_ascii_digit())
    }
}

/// Lifetime of a freshly issued code, per purpose.
#[derive(Debug, Clone, Copy)]
pub struct CodeTtl {
    pub registration: Duration,
    pub password_reset: Duration,
}

impl CodeTtl {
    pub fn from_hours(registration: i64, password_reset: i64) -> Self {
        Self {
            registration: Duration::hours(registration),
            password_reset: Duration::hours(password_reset),
        }
    }

    pub fn for_purpose(&self, purpose: CodePurpose) -> Duration {
        match purpose {
            CodePurpose::Registration => self.registration,
            CodePurpose::PasswordReset => self.password_reset,
        }
    }
}

impl Default for CodeTtl {
    fn default() -> Self {
        Self::from_hours(
            DEFAULT_REGISTRATION_CODE_TTL_HOURS,
            DEFAULT_PASSWORD_RESET_CODE_TTL_HOURS,
        )
    }
}

/// Role assigned to self-registered accounts.
pub const USER_ROLE: u8 = 0;

/// Registration code lifetime when not configured.
pub const DEFAULT_REGISTRATION_CODE_TTL_HOURS: i64 = 24;

/// Password-reset code lifetime when not configured.
pub const DEFAULT_PASSWORD_RESET_CODE_TTL_HOURS: i64 = 1;

/// Expired-code sweep period when not configured (top of every hour).
pub const DEFAULT_CODE_SWEEP_INTERVAL_SECS: u64 = 3600;
