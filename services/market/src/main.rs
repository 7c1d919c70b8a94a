use sea_orm::Database;
use tracing::info;

use agora_auth_types::identity::JwtSecret;
use agora_core::tracing::init_tracing;

use agora_market::config::MarketConfig;
use agora_market::infra::mailer::{SmtpNotifier, SmtpSettings};
use agora_market::router::build_router;
use agora_market::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = MarketConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let notifier = match config.smtp_host {
        Some(host) => SmtpNotifier::new(
            Some(SmtpSettings {
                host,
                username: config.smtp_username,
                password: config.smtp_password,
            }),
            config.mail_from,
        ),
        None => SmtpNotifier::disabled(config.mail_from),
    };

    let state = AppState {
        db,
        jwt_secret: JwtSecret(config.jwt_secret),
        notifier,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.market_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("market service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
