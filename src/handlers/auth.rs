use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{issue_token, Claims};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Identity};
use crate::models::user::{NewUser, User};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// POST /auth/token - exchange username/password for a JWT
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Value> {
    let user = User::authenticate(&state.pool, &body.username, &body.password).await?;
    let token = issue(&user, &state)?;

    Ok(ApiResponse::success(json!({ "token": token })))
}

/// POST /auth/register - self-registration; never creates admins
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<Value> {
    let data = NewUser {
        username: body.username,
        password: body.password,
        first_name: body.first_name,
        last_name: body.last_name,
        email: body.email,
        is_admin: false,
    };

    let user = User::register(&state.pool, &data, state.password_work_factor).await?;
    let token = issue(&user, &state)?;

    Ok(ApiResponse::created(json!({ "token": token })))
}

/// GET /auth/me - identity of the authenticated caller
pub async fn me(Extension(identity): Extension<Identity>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "username": identity.username,
        "isAdmin": identity.is_admin,
    })))
}

fn issue(user: &User, state: &AppState) -> Result<String, ApiError> {
    let claims = Claims::new(user.username.clone(), user.is_admin, state.jwt_expiry_hours);
    issue_token(&claims, &state.jwt_secret).map_err(|e| {
        tracing::error!("token issuance failed: {}", e);
        ApiError::internal_server_error("failed to issue token")
    })
}
