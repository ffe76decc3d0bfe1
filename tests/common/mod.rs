use sqlx::postgres::PgPoolOptions;

use jobboard_api::auth::{issue_token, Claims};
use jobboard_api::state::AppState;

pub const TEST_SECRET: &str = "integration-test-secret";

/// App state with a lazy pool that never connects. The guard-chain tests
/// exercise middleware only, so no query ever runs.
pub fn test_state() -> AppState {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://postgres@127.0.0.1:1/unused")
        .expect("lazy pool");

    AppState::new(pool, TEST_SECRET, 1, 1)
}

pub fn token_for(username: &str, is_admin: bool) -> String {
    let claims = Claims::new(username.to_string(), is_admin, 1);
    issue_token(&claims, TEST_SECRET).expect("token")
}
