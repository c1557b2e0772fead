use sea_orm::DatabaseConnection;

use crate::domain::types::CodeTtl;
use crate::infra::db::{DbUserRepository, DbVerificationCodeRepository};
use crate::infra::mail::Mailer;
use crate::usecase::code::CodeService;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub mailer: Mailer,
    pub jwt_secret: String,
    pub code_ttl: CodeTtl,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn code_repo(&self) -> DbVerificationCodeRepository {
        DbVerificationCodeRepository {
            db: self.db.clone(),
        }
    }

    pub fn code_service(&self) -> CodeService<DbVerificationCodeRepository, Mailer> {
        CodeService {
            codes: self.code_repo(),
            mailer: self.mailer.clone(),
            ttl: self.code_ttl,
        }
    }
}
