use sqlx::postgres::PgPoolOptions;

use jobboard_api::config;
use jobboard_api::state::AppState;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("starting jobboard API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        panic!("JWT_SECRET must be set");
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .unwrap_or_else(|e| panic!("failed to connect to {}: {}", config.database.url, e));

    let state = AppState::new(
        pool,
        config.security.jwt_secret.clone(),
        config.security.jwt_expiry_hours,
        config.security.password_work_factor,
    );

    let app = jobboard_api::app(state);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
