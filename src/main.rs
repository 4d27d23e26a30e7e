use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use sjba_server::config::{Config, RateLimiter};
use sjba_server::models::newsletter::PgSignupStore;
use sjba_server::routes::create_routes;
use sjba_server::services::mailchimp::MailchimpClient;
use sjba_server::services::mailer::Mailer;
use sjba_server::state::AppState;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Successfully connected to database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    tracing::info!("Migrations run successfully");

    let mailing_list = Arc::new(MailchimpClient::new(config.mailchimp.clone()));
    match mailing_list.ping().await {
        Ok(()) => tracing::info!("Mailchimp connection successful"),
        Err(err) => tracing::warn!(error = %err, "Mailchimp connection failed"),
    }

    let mailer = Arc::new(Mailer::new(config.mailgun.clone()));
    let signup_store = Arc::new(PgSignupStore::new(pool.clone()));
    let rate_limiter = Arc::new(RateLimiter::new(
        Duration::from_secs(config.rate_limit_window_secs),
        config.rate_limit_max_requests,
    ));

    let port = config.port;
    let state = AppState {
        pool,
        config: Arc::new(config),
        mailing_list,
        signup_store,
        mailer,
        rate_limiter,
    };

    let app = create_routes(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("🚀 Server running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server failed");
}
