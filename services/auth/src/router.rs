use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use mangareader_core::health::healthz;
use mangareader_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    account::{activate, forgot_password, login, register, resend_activation, reset_password},
    health::readyz,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Account lifecycle
        .route("/auth/register", post(register))
        .route("/auth/activate", post(activate))
        .route("/auth/resend-activate", post(resend_activation))
        // Password reset
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
        // Token
        .route("/auth/login", post(login))
        .with_state(state)
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
}
