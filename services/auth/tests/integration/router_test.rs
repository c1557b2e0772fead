use axum::http::StatusCode;
use axum_test::TestServer;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};

use mangareader_auth::domain::types::CodeTtl;
use mangareader_auth::infra::mail::{LogMailer, MailTransport, Mailer};
use mangareader_auth::router::build_router;
use mangareader_auth::state::AppState;
use mangareader_core::middleware::X_REQUEST_ID;

fn server() -> TestServer {
    let state = AppState {
        db: DatabaseConnection::Disconnected,
        mailer: Mailer {
            from: "no-reply@example.com".to_owned(),
            transport: MailTransport::Log(LogMailer),
        },
        jwt_secret: "test-secret".to_owned(),
        code_ttl: CodeTtl::default(),
    };
    TestServer::new(build_router(state)).unwrap()
}

#[tokio::test]
async fn should_answer_liveness_with_request_id() {
    let response = server().get("/healthz").await;
    response.assert_status_ok();
    assert!(response.maybe_header(X_REQUEST_ID).is_some());
}

#[tokio::test]
async fn should_report_not_ready_without_database() {
    server()
        .get("/readyz")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn should_reject_register_with_missing_fields() {
    let response = server()
        .post("/auth/register")
        .json(&json!({ "email": "reader@example.com" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["kind"], "MISSING_DATA");
}

#[tokio::test]
async fn should_reject_empty_activation_code() {
    server()
        .post("/auth/activate")
        .json(&json!({ "code": "  " }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn should_reject_login_without_password() {
    let response = server()
        .post("/auth/login")
        .json(&json!({ "email": "reader@example.com" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["kind"], "MISSING_DATA");
}
