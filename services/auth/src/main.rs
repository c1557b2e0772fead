use sea_orm::Database;
use tracing::info;

use mangareader_auth::config::AuthConfig;
use mangareader_auth::infra::mail::Mailer;
use mangareader_auth::router::build_router;
use mangareader_auth::state::AppState;
use mangareader_auth::sweeper::spawn_code_sweeper;
use mangareader_core::tracing::init_tracing;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = AuthConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let mailer = Mailer::from_config(&config.mail);
    if config.mail.api_url.is_none() {
        info!("MAIL_API_URL not set, emails will only be logged");
    }

    let state = AppState {
        db,
        mailer,
        jwt_secret: config.jwt_secret.clone(),
        code_ttl: config.code_ttl(),
    };

    let _sweeper = spawn_code_sweeper(state.code_repo(), config.code_sweep_interval());

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.auth_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("auth service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
