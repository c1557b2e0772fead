use chrono::Utc;
use rand::RngExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::repository::{EmailGateway, VerificationCodeRepository};
use crate::domain::types::{AuthUser, CodePurpose, CodeTtl, VerificationCode};
use crate::error::AuthServiceError;

/// Draws per issuance before a code collision is reported as `DuplicateCode`.
pub const ISSUE_ATTEMPTS: u32 = 3;

/// Draw a numeric code uniformly from the purpose's fixed-width range.
pub fn generate_code(purpose: CodePurpose) -> String {
    let mut rng = rand::rng();
    rng.random_range(purpose.code_range()).to_string()
}

/// Sole authority over verification codes: format, lifetime, validation and single use.
pub struct CodeService<C, E>
where
    C: VerificationCodeRepository,
    E: EmailGateway,
{
    pub codes: C,
    pub mailer: E,
    pub ttl: CodeTtl,
}

impl<C, E> CodeService<C, E>
where
    C: VerificationCodeRepository,
    E: EmailGateway,
{
    /// Replace the owner's code for `purpose` with a fresh one and email it.
    ///
    /// The code is persisted before delivery; a delivery failure leaves it usable.
    pub async fn issue(
        &self,
        owner: &AuthUser,
        purpose: CodePurpose,
    ) -> Result<VerificationCode, AuthServiceError> {
        let record = self.persist_fresh(owner, purpose).await?;

        match purpose {
            CodePurpose::Registration => {
                self.mailer
                    .send_verification_code(&owner.email, &record.code, record.expires_at)
                    .await?
            }
            CodePurpose::PasswordReset => {
                self.mailer
                    .send_password_reset(&owner.email, &record.code, record.expires_at)
                    .await?
            }
        }

        Ok(record)
    }

    /// Generate and store a new code, drawing again when the value collides with a live code.
    async fn persist_fresh(
        &self,
        owner: &AuthUser,
        purpose: CodePurpose,
    ) -> Result<VerificationCode, AuthServiceError> {
        let mut attempt = 1;
        loop {
            let now = Utc::now();
            let record = VerificationCode {
                id: Uuid::now_v7(),
                user_id: owner.id,
                purpose,
                code: generate_code(purpose),
                expires_at: now + self.ttl.for_purpose(purpose),
                used: false,
                created_at: now,
            };

            match self.codes.replace_for_owner(&record).await {
                Ok(purged) => {
                    info!(
                        user_id = %owner.id,
                        %purpose,
                        purged,
                        expires_at = %record.expires_at,
                        "verification code issued"
                    );
                    return Ok(record);
                }
                Err(AuthServiceError::DuplicateCode) if attempt < ISSUE_ATTEMPTS => {
                    warn!(user_id = %owner.id, %purpose, attempt, "verification code collided, regenerating");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub async fn get_by_code(&self, code: &str) -> Result<VerificationCode, AuthServiceError> {
        self.codes
            .find_by_code(code)
            .await?
            .ok_or(AuthServiceError::CodeNotFound)
    }

    /// Check a resolved record against the purpose it is being redeemed for.
    ///
    /// Used and expired records are deleted before the error is returned. A record of the
    /// wrong purpose is left in place for its rightful flow.
    pub async fn validate(
        &self,
        record: &VerificationCode,
        purpose: CodePurpose,
    ) -> Result<(), AuthServiceError> {
        if record.used {
            self.codes.delete(record.id).await?;
            return Err(AuthServiceError::CodeAlreadyUsed);
        }

        if !record.matches_format(purpose) {
            debug!(code_id = %record.id, expected = %purpose, actual = %record.purpose, "code purpose mismatch");
            return Err(AuthServiceError::InvalidCode);
        }

        if record.is_expired_at(Utc::now()) {
            self.codes.delete(record.id).await?;
            return Err(AuthServiceError::CodeExpired);
        }

        Ok(())
    }

    /// Spend a validated record. Afterwards its code string no longer resolves.
    pub async fn consume(&self, record: &VerificationCode) -> Result<(), AuthServiceError> {
        self.codes.consume(record.id).await?;
        info!(user_id = %record.user_id, purpose = %record.purpose, "verification code consumed");
        Ok(())
    }

    /// Activate the owner of a validated registration record and spend the record, atomically.
    pub async fn consume_activating_owner(
        &self,
        record: &VerificationCode,
    ) -> Result<(), AuthServiceError> {
        self.codes
            .consume_and_enable_owner(record.id, record.user_id)
            .await?;
        info!(user_id = %record.user_id, "registration code consumed, account enabled");
        Ok(())
    }

    /// Resolve `code` and validate it for `purpose`. The record stays live until consumed.
    pub async fn redeem(
        &self,
        code: &str,
        purpose: CodePurpose,
    ) -> Result<VerificationCode, AuthServiceError> {
        let record = self.get_by_code(code).await?;
        self.validate(&record, purpose).await?;
        Ok(record)
    }

    /// Owner lookup for callers that act on the account without spending the code.
    pub async fn get_owner_by_code(
        &self,
        code: &str,
        purpose: CodePurpose,
    ) -> Result<Uuid, AuthServiceError> {
        Ok(self.redeem(code, purpose).await?.user_id)
    }
}
