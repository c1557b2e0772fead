use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::account::{
    ActivateAccountUseCase, ForgotPasswordUseCase, RegisterInput, RegisterUseCase,
    ResendActivationUseCase, ResetPasswordInput, ResetPasswordUseCase,
};
use crate::usecase::token::{LoginInput, LoginUseCase};

// Absent fields deserialize as empty strings so the use case reports `MissingData`.

// ── POST /auth/register ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AuthServiceError> {
    let usecase = RegisterUseCase {
        users: state.user_repo(),
        codes: state.code_service(),
    };
    let user_id = usecase
        .execute(RegisterInput {
            username: body.username,
            email: body.email,
            password: body.password,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(RegisterResponse { user_id })))
}

// ── POST /auth/activate ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ActivateRequest {
    #[serde(default)]
    pub code: String,
}

pub async fn activate(
    State(state): State<AppState>,
    Json(body): Json<ActivateRequest>,
) -> Result<StatusCode, AuthServiceError> {
    let code = body.code.trim();
    if code.is_empty() {
        return Err(AuthServiceError::MissingData);
    }
    let usecase = ActivateAccountUseCase {
        users: state.user_repo(),
        codes: state.code_service(),
    };
    usecase.execute(code).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /auth/forgot-password, /auth/resend-activate ─────────────────────────

#[derive(Deserialize)]
pub struct EmailRequest {
    #[serde(default)]
    pub email: String,
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<EmailRequest>,
) -> Result<StatusCode, AuthServiceError> {
    if body.email.trim().is_empty() {
        return Err(AuthServiceError::MissingData);
    }
    let usecase = ForgotPasswordUseCase {
        users: state.user_repo(),
        codes: state.code_service(),
    };
    usecase.execute(&body.email).await?;
    Ok(StatusCode::CREATED)
}

pub async fn resend_activation(
    State(state): State<AppState>,
    Json(body): Json<EmailRequest>,
) -> Result<StatusCode, AuthServiceError> {
    if body.email.trim().is_empty() {
        return Err(AuthServiceError::MissingData);
    }
    let usecase = ResendActivationUseCase {
        users: state.user_repo(),
        codes: state.code_service(),
    };
    usecase.execute(&body.email).await?;
    Ok(StatusCode::CREATED)
}

// ── POST /auth/reset-password ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub password: String,
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<StatusCode, AuthServiceError> {
    let code = body.code.trim();
    if code.is_empty() {
        return Err(AuthServiceError::MissingData);
    }
    let usecase = ResetPasswordUseCase {
        users: state.user_repo(),
        codes: state.code_service(),
    };
    usecase
        .execute(ResetPasswordInput {
            code: code.to_owned(),
            password: body.password,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /auth/login ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token_type: &'static str,
    pub access_token: String,
    pub access_token_exp: u64,
    pub user_id: Uuid,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthServiceError> {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(AuthServiceError::MissingData);
    }
    let usecase = LoginUseCase {
        users: state.user_repo(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let output = usecase
        .execute(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await?;
    Ok(Json(LoginResponse {
        token_type: "Bearer",
        access_token: output.access_token,
        access_token_exp: output.access_token_exp,
        user_id: output.user_id,
    }))
}
