use sqlx::PgPool;

/// Shared application state handed to handlers and middleware through axum's
/// `State` extractor. The JWT secret is injected here rather than read from
/// ambient globals so the authorization chain is testable with fabricated
/// secrets.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub password_work_factor: u32,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        jwt_secret: impl Into<String>,
        jwt_expiry_hours: u64,
        password_work_factor: u32,
    ) -> Self {
        Self {
            pool,
            jwt_secret: jwt_secret.into(),
            jwt_expiry_hours,
            password_work_factor,
        }
    }
}
