use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Auth service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("user not found")]
    UserNotFound,
    #[error("user already exists")]
    UserAlreadyExists,
    #[error("user not enabled")]
    UserNotEnabled,
    #[error("user already enabled")]
    UserAlreadyEnabled,
    #[error("invalid credential")]
    InvalidCredential,
    #[error("missing data")]
    MissingData,
    #[error("code not found")]
    CodeNotFound,
    #[error("code not valid")]
    InvalidCode,
    #[error("code already used")]
    CodeAlreadyUsed,
    #[error("code expired")]
    CodeExpired,
    #[error("code not unique")]
    DuplicateCode,
    #[error("email delivery failed")]
    DeliveryFailed(#[source] anyhow::Error),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AuthServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::UserAlreadyExists => "USER_ALREADY_EXISTS",
            Self::UserNotEnabled => "USER_NOT_ENABLED",
            Self::UserAlreadyEnabled => "USER_ALREADY_ENABLED",
            Self::InvalidCredential => "INVALID_CREDENTIAL",
            Self::MissingData => "MISSING_DATA",
            Self::CodeNotFound => "CODE_NOT_FOUND",
            Self::InvalidCode => "INVALID_CODE",
            Self::CodeAlreadyUsed => "CODE_ALREADY_USED",
            Self::CodeExpired => "CODE_EXPIRED",
            Self::DuplicateCode => "DUPLICATE_CODE",
            Self::DeliveryFailed(_) => "DELIVERY_FAILED",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for AuthServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::UserAlreadyExists | Self::UserAlreadyEnabled | Self::DuplicateCode => {
                StatusCode::CONFLICT
            }
            Self::UserNotEnabled => StatusCode::FORBIDDEN,
            Self::InvalidCredential => StatusCode::UNAUTHORIZED,
            Self::MissingData
            | Self::CodeNotFound
            | Self::InvalidCode
            | Self::CodeAlreadyUsed
            | Self::CodeExpired => StatusCode::BAD_REQUEST,
            Self::DeliveryFailed(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // 4xx are expected client errors and already visible in the TraceLayer span.
        match &self {
            Self::Internal(e) => tracing::error!(error = ?e, kind = "INTERNAL", "internal error"),
            Self::DeliveryFailed(e) => {
                tracing::error!(error = ?e, kind = "DELIVERY_FAILED", "email delivery failed")
            }
            _ => {}
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
