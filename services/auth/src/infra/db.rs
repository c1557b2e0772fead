use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, QueryFilter, QuerySelect, SqlErr, TransactionError, TransactionTrait,
};
use uuid::Uuid;

use mangareader_auth_schema::{users, verification_codes};

use crate::domain::repository::{UserRepository, VerificationCodeRepository};
use crate::domain::types::{AuthUser, CodePurpose, VerificationCode};
use crate::error::AuthServiceError;

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        model.map(user_from_model).transpose()
    }

    async fn create(&self, user: &AuthUser) -> Result<(), AuthServiceError> {
        users::ActiveModel {
            id: Set(user.id),
            username: Set(user.username.clone()),
            email: Set(user.email.clone()),
            password_hash: Set(user.password_hash.clone()),
            role: Set(i16::from(user.role)),
            enabled: Set(user.enabled),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        }
        .insert(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AuthServiceError::UserAlreadyExists
            } else {
                anyhow::Error::new(e).context("create user").into()
            }
        })?;
        Ok(())
    }

    async fn set_enabled(&self, id: Uuid, enabled: bool) -> Result<(), AuthServiceError> {
        users::ActiveModel {
            id: Set(id),
            enabled: Set(enabled),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("set user enabled")?;
        Ok(())
    }

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), AuthServiceError> {
        users::ActiveModel {
            id: Set(id),
            password_hash: Set(password_hash.to_owned()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update user password")?;
        Ok(())
    }
}

fn user_from_model(model: users::Model) -> Result<AuthUser, AuthServiceError> {
    let role = u8::try_from(model.role)
        .map_err(|_| anyhow::anyhow!("role out of u8 range: {}", model.role))?;
    Ok(AuthUser {
        id: model.id,
        username: model.username,
        email: model.email,
        password_hash: model.password_hash,
        role,
        enabled: model.enabled,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── VerificationCode repository ──────────────────────────────────────────────

#[derive(Clone)]
pub struct DbVerificationCodeRepository {
    pub db: DatabaseConnection,
}

impl VerificationCodeRepository for DbVerificationCodeRepository {
    async fn find_by_code(&self, code: &str) -> Result<Option<VerificationCode>, AuthServiceError> {
        let model = verification_codes::Entity::find()
            .filter(verification_codes::Column::Code.eq(code))
            .one(&self.db)
            .await
            .context("find verification code")?;
        model.map(code_from_model).transpose()
    }

    async fn find_by_owner_and_purpose(
        &self,
        user_id: Uuid,
        purpose: CodePurpose,
    ) -> Result<Vec<VerificationCode>, AuthServiceError> {
        let models = verification_codes::Entity::find()
            .filter(verification_codes::Column::UserId.eq(user_id))
            .filter(verification_codes::Column::Purpose.eq(purpose.as_str()))
            .all(&self.db)
            .await
            .context("list verification codes by owner")?;
        models.into_iter().map(code_from_model).collect()
    }

    async fn replace_for_owner(&self, code: &VerificationCode) -> Result<u64, AuthServiceError> {
        self.db
            .transaction::<_, u64, DbErr>(|txn| {
                let code = code.clone();
                Box::pin(async move {
                    // Row lock on the owner serialises concurrent issuance for the same account.
                    users::Entity::find_by_id(code.user_id)
                        .lock_exclusive()
                        .one(txn)
                        .await?
                        .ok_or_else(|| DbErr::RecordNotFound(format!("user {}", code.user_id)))?;

                    let purged = verification_codes::Entity::delete_many()
                        .filter(verification_codes::Column::UserId.eq(code.user_id))
                        .filter(verification_codes::Column::Purpose.eq(code.purpose.as_str()))
                        .exec(txn)
                        .await?
                        .rows_affected;

                    insert_code(txn, &code).await?;
                    Ok(purged)
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Transaction(err) if is_unique_violation(&err) => {
                    AuthServiceError::DuplicateCode
                }
                TransactionError::Transaction(DbErr::RecordNotFound(_)) => {
                    AuthServiceError::UserNotFound
                }
                other => anyhow::Error::new(other)
                    .context("replace verification code")
                    .into(),
            })
    }

    async fn consume(&self, id: Uuid) -> Result<(), AuthServiceError> {
        self.db
            .transaction::<_, (), DbErr>(|txn| Box::pin(async move { consume_in(txn, id).await }))
            .await
            .map_err(|e| map_consume_error(e, "consume verification code"))
    }

    async fn consume_and_enable_owner(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<(), AuthServiceError> {
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                Box::pin(async move {
                    consume_in(txn, id).await?;
                    users::ActiveModel {
                        id: Set(user_id),
                        enabled: Set(true),
                        updated_at: Set(Utc::now()),
                        ..Default::default()
                    }
                    .update(txn)
                    .await
                    .map_err(|e| match e {
                        DbErr::RecordNotUpdated => DbErr::RecordNotFound(format!("user {user_id}")),
                        other => other,
                    })?;
                    Ok(())
                })
            })
            .await
            .map_err(|e| map_consume_error(e, "activate code owner"))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AuthServiceError> {
        let result = verification_codes::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete verification code")?;
        Ok(result.rows_affected > 0)
    }

    async fn delete_expired_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, AuthServiceError> {
        let result = verification_codes::Entity::delete_many()
            .filter(verification_codes::Column::ExpiresAt.lt(cutoff))
            .exec(&self.db)
            .await
            .context("delete expired verification codes")?;
        Ok(result.rows_affected)
    }
}

async fn consume_in(txn: &DatabaseTransaction, id: Uuid) -> Result<(), DbErr> {
    verification_codes::ActiveModel {
        id: Set(id),
        used: Set(true),
        ..Default::default()
    }
    .update(txn)
    .await?;
    verification_codes::Entity::delete_by_id(id)
        .exec(txn)
        .await?;
    Ok(())
}

fn map_consume_error(err: TransactionError<DbErr>, context: &'static str) -> AuthServiceError {
    match err {
        // Lost a race with another consumer, a purge or the sweep.
        TransactionError::Transaction(DbErr::RecordNotUpdated) => AuthServiceError::CodeNotFound,
        TransactionError::Transaction(DbErr::RecordNotFound(_)) => AuthServiceError::UserNotFound,
        other => anyhow::Error::new(other).context(context).into(),
    }
}

async fn insert_code(txn: &DatabaseTransaction, code: &VerificationCode) -> Result<(), DbErr> {
    verification_codes::ActiveModel {
        id: Set(code.id),
        user_id: Set(code.user_id),
        purpose: Set(code.purpose.as_str().to_owned()),
        code: Set(code.code.clone()),
        expires_at: Set(code.expires_at),
        used: Set(code.used),
        created_at: Set(code.created_at),
    }
    .insert(txn)
    .await?;
    Ok(())
}

fn code_from_model(model: verification_codes::Model) -> Result<VerificationCode, AuthServiceError> {
    let purpose = CodePurpose::from_db(&model.purpose)
        .ok_or_else(|| anyhow::anyhow!("unknown code purpose: {}", model.purpose))?;
    Ok(VerificationCode {
        id: model.id,
        user_id: model.user_id,
        purpose,
        code: model.code,
        expires_at: model.expires_at,
        used: model.used,
        created_at: model.created_at,
    })
}
