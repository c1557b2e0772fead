#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::types::{AuthUser, CodePurpose, VerificationCode};
use crate::error::AuthServiceError;

/// Repository for reader accounts.
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthServiceError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthServiceError>;

    /// Insert a new account. A taken email yields `UserAlreadyExists`.
    async fn create(&self, user: &AuthUser) -> Result<(), AuthServiceError>;

    async fn set_enabled(&self, id: Uuid, enabled: bool) -> Result<(), AuthServiceError>;
    async fn update_password(&self, id: Uuid, password_hash: &str)
    -> Result<(), AuthServiceError>;
}

/// Store for verification codes. The `code` column is unique store-wide.
pub trait VerificationCodeRepository: Send + Sync {
    async fn find_by_code(&self, code: &str) -> Result<Option<VerificationCode>, AuthServiceError>;

    async fn find_by_owner_and_purpose(
        &self,
        user_id: Uuid,
        purpose: CodePurpose,
    ) -> Result<Vec<VerificationCode>, AuthServiceError>;

    /// Delete every code of `code.user_id` with `code.purpose`, then insert `code`,
    /// atomically. Returns how many codes were purged.
    ///
    /// A collision on the code value yields `DuplicateCode` and leaves the store unchanged.
    async fn replace_for_owner(&self, code: &VerificationCode) -> Result<u64, AuthServiceError>;

    /// Mark the code used and delete it in one transaction.
    async fn consume(&self, id: Uuid) -> Result<(), AuthServiceError>;

    /// Consume the code and enable its owner in the same transaction.
    async fn consume_and_enable_owner(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<(), AuthServiceError>;

    /// Returns `true` if a row was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, AuthServiceError>;

    /// Bulk-delete every code whose `expires_at` is before `cutoff`. Returns the count.
    async fn delete_expired_before(&self, cutoff: DateTime<Utc>)
    -> Result<u64, AuthServiceError>;
}

/// Outbound email delivery for verification codes.
pub trait EmailGateway: Send + Sync {
    async fn send_verification_code(
        &self,
        to: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthServiceError>;

    async fn send_password_reset(
        &self,
        to: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthServiceError>;
}
