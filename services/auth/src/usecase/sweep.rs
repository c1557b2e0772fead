use chrono::{DateTime, Utc};
use tracing::info;

use crate::domain::repository::VerificationCodeRepository;
use crate::error::AuthServiceError;

// ── SweepExpiredCodes ────────────────────────────────────────────────────────

/// Store-wide deletion of expired codes. Space reclamation only: `validate` rejects
/// expired codes on its own, so nothing depends on when this last ran.
pub struct SweepExpiredCodesUseCase<C: VerificationCodeRepository> {
    pub codes: C,
}

impl<C: VerificationCodeRepository> SweepExpiredCodesUseCase<C> {
    /// Delete every code that expired before `now`. Returns the number deleted.
    pub async fn execute(&self, now: DateTime<Utc>) -> Result<u64, AuthServiceError> {
        let deleted = self.codes.delete_expired_before(now).await?;
        info!(deleted, cutoff = %now, "expired verification codes swept");
        Ok(deleted)
    }
}
