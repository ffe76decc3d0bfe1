use axum::{routing::get, Router};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod sql;
pub mod state;

use crate::middleware::{
    authenticate_jwt, require_admin, require_admin_or_self, require_authenticated,
};
use crate::state::AppState;

/// Build the full application router. Identity extraction runs on every
/// request; the stricter guards are layered per route group.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(auth_routes())
        .merge(company_routes())
        .merge(user_routes())
        .merge(job_routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            authenticate_jwt,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use axum::routing::post;
    use handlers::auth;

    let public = Router::new()
        .route("/auth/token", post(auth::login))
        .route("/auth/register", post(auth::register));

    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        .route_layer(axum::middleware::from_fn(require_authenticated));

    public.merge(protected)
}

fn company_routes() -> Router<AppState> {
    use axum::routing::{patch, post};
    use handlers::companies;

    let admin = Router::new()
        .route("/companies", post(companies::create))
        .route(
            "/companies/:handle",
            patch(companies::update).delete(companies::remove),
        )
        .route_layer(axum::middleware::from_fn(require_admin));

    let open = Router::new()
        .route("/companies", get(companies::list))
        .route("/companies/:handle", get(companies::get));

    open.merge(admin)
}

fn user_routes() -> Router<AppState> {
    use axum::routing::post;
    use handlers::users;

    let admin = Router::new()
        .route("/users", post(users::create).get(users::list))
        .route_layer(axum::middleware::from_fn(require_admin));

    let admin_or_self = Router::new()
        .route(
            "/users/:username",
            get(users::get).patch(users::update).delete(users::remove),
        )
        .route("/users/:username/jobs/:id", post(users::apply))
        .route_layer(axum::middleware::from_fn(require_admin_or_self));

    admin.merge(admin_or_self)
}

fn job_routes() -> Router<AppState> {
    use axum::routing::{patch, post};
    use handlers::jobs;

    let admin = Router::new()
        .route("/jobs", post(jobs::create))
        .route("/jobs/:id", patch(jobs::update).delete(jobs::remove))
        .route_layer(axum::middleware::from_fn(require_admin));

    let open = Router::new()
        .route("/jobs", get(jobs::list))
        .route("/jobs/:id", get(jobs::get));

    open.merge(admin)
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": { "status": "degraded", "timestamp": now, "database_error": e.to_string() }
            })),
        ),
    }
}
