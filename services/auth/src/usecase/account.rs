use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::{EmailGateway, UserRepository, VerificationCodeRepository};
use crate::domain::types::{AuthUser, CodePurpose, USER_ROLE};
use crate::error::AuthServiceError;
use crate::usecase::code::CodeService;
use crate::usecase::password::hash_password_blocking;

/// Emails are compared and stored trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// ── Register ─────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

pub struct RegisterUseCase<U, C, E>
where
    U: UserRepository,
    C: VerificationCodeRepository,
    E: EmailGateway,
{
    pub users: U,
    pub codes: CodeService<C, E>,
}

impl<U, C, E> RegisterUseCase<U, C, E>
where
    U: UserRepository,
    C: VerificationCodeRepository,
    E: EmailGateway,
{
    /// Create a disabled account and send its registration code. Returns the new user id.
    pub async fn execute(&self, input: RegisterInput) -> Result<Uuid, AuthServiceError> {
        let username = input.username.trim();
        let email = normalize_email(&input.email);
        if username.is_empty() || email.is_empty() || input.password.is_empty() {
            return Err(AuthServiceError::MissingData);
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthServiceError::UserAlreadyExists);
        }

        let now = Utc::now();
        let user = AuthUser {
            id: Uuid::now_v7(),
            username: username.to_owned(),
            email,
            password_hash: hash_password_blocking(input.password).await?,
            role: USER_ROLE,
            enabled: false,
            created_at: now,
            updated_at: now,
        };
        self.users.create(&user).await?;

        self.codes.issue(&user, CodePurpose::Registration).await?;
        Ok(user.id)
    }
}

// ── ActivateAccount ──────────────────────────────────────────────────────────

pub struct ActivateAccountUseCase<U, C, E>
where
    U: UserRepository,
    C: VerificationCodeRepository,
    E: EmailGateway,
{
    pub users: U,
    pub codes: CodeService<C, E>,
}

impl<U, C, E> ActivateAccountUseCase<U, C, E>
where
    U: UserRepository,
    C: VerificationCodeRepository,
    E: EmailGateway,
{
    pub async fn execute(&self, code: &str) -> Result<(), AuthServiceError> {
        let record = self.codes.redeem(code, CodePurpose::Registration).await?;

        self.users
            .find_by_id(record.user_id)
            .await?
            .ok_or(AuthServiceError::UserNotFound)?;

        self.codes.consume_activating_owner(&record).await
    }
}

// ── ForgotPassword ───────────────────────────────────────────────────────────

pub struct ForgotPasswordUseCase<U, C, E>
where
    U: UserRepository,
    C: VerificationCodeRepository,
    E: EmailGateway,
{
    pub users: U,
    pub codes: CodeService<C, E>,
}

impl<U, C, E> ForgotPasswordUseCase<U, C, E>
where
    U: UserRepository,
    C: VerificationCodeRepository,
    E: EmailGateway,
{
    pub async fn execute(&self, email: &str) -> Result<(), AuthServiceError> {
        let user = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AuthServiceError::UserNotFound)?;
        if !user.enabled {
            return Err(AuthServiceError::UserNotEnabled);
        }

        self.codes.issue(&user, CodePurpose::PasswordReset).await?;
        Ok(())
    }
}

// ── ResetPassword ────────────────────────────────────────────────────────────

pub struct ResetPasswordInput {
    pub code: String,
    pub password: String,
}

pub struct ResetPasswordUseCase<U, C, E>
where
    U: UserRepository,
    C: VerificationCodeRepository,
    E: EmailGateway,
{
    pub users: U,
    pub codes: CodeService<C, E>,
}

impl<U, C, E> ResetPasswordUseCase<U, C, E>
where
    U: UserRepository,
    C: VerificationCodeRepository,
    E: EmailGateway,
{
    /// Set a new password and spend the reset code so it cannot be replayed.
    pub async fn execute(&self, input: ResetPasswordInput) -> Result<(), AuthServiceError> {
        if input.password.is_empty() {
            return Err(AuthServiceError::MissingData);
        }

        let record = self
            .codes
            .redeem(&input.code, CodePurpose::PasswordReset)
            .await?;

        let user = self
            .users
            .find_by_id(record.user_id)
            .await?
            .ok_or(AuthServiceError::UserNotFound)?;
        let password_hash = hash_password_blocking(input.password).await?;
        self.users.update_password(user.id, &password_hash).await?;

        self.codes.consume(&record).await
    }
}

// ── ResendActivation ─────────────────────────────────────────────────────────

pub struct ResendActivationUseCase<U, C, E>
where
    U: UserRepository,
    C: VerificationCodeRepository,
    E: EmailGateway,
{
    pub users: U,
    pub codes: CodeService<C, E>,
}

impl<U, C, E> ResendActivationUseCase<U, C, E>
where
    U: UserRepository,
    C: VerificationCodeRepository,
    E: EmailGateway,
{
    pub async fn execute(&self, email: &str) -> Result<(), AuthServiceError> {
        let user = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AuthServiceError::UserNotFound)?;
        if user.enabled {
            return Err(AuthServiceError::UserAlreadyEnabled);
        }

        self.codes.issue(&user, CodePurpose::Registration).await?;
        Ok(())
    }
}
