use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::repository::UserRepository;
use crate::domain::types::AuthUser;
use crate::error::AuthServiceError;
use crate::usecase::account::normalize_email;
use crate::usecase::password::verify_password_blocking;

/// Access-token JWT lifetime in seconds (4 hours).
pub const ACCESS_TOKEN_EXP: u64 = 14400;

/// JWT claims of an access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub role: u8,
    pub exp: u64,
}

/// Sign an HS256 access token. Returns the token and its `exp`.
pub fn issue_access_token(
    user: &AuthUser,
    secret: &str,
) -> Result<(String, u64), AuthServiceError> {
    let exp = Utc::now().timestamp().unsigned_abs() + ACCESS_TOKEN_EXP;
    let claims = TokenClaims {
        sub: user.id.to_string(),
        role: user.role,
        exp,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthServiceError::Internal(e.into()))?;
    Ok((token, exp))
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct LoginOutput {
    pub user_id: Uuid,
    pub access_token: String,
    pub access_token_exp: u64,
}

pub struct LoginUseCase<U: UserRepository> {
    pub users: U,
    pub jwt_secret: String,
}

impl<U: UserRepository> LoginUseCase<U> {
    pub async fn execute(&self, input: LoginInput) -> Result<LoginOutput, AuthServiceError> {
        let user = self
            .users
            .find_by_email(&normalize_email(&input.email))
            .await?
            .ok_or(AuthServiceError::UserNotFound)?;

        if !user.enabled {
            return Err(AuthServiceError::UserNotEnabled);
        }

        if !verify_password_blocking(user.password_hash.clone(), input.password).await {
            return Err(AuthServiceError::InvalidCredential);
        }

        let (access_token, access_token_exp) = issue_access_token(&user, &self.jwt_secret)?;
        Ok(LoginOutput {
            user_id: user.id,
            access_token,
            access_token_exp,
        })
    }
}
