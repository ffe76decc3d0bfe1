use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Map, Value};

use crate::middleware::{ApiResponse, ApiResult};
use crate::models::user::{NewUser, User};
use crate::state::AppState;

/// POST /users - create a user, possibly an admin (admin only). Unlike
/// self-registration this is for admins provisioning accounts.
pub async fn create(State(state): State<AppState>, Json(body): Json<NewUser>) -> ApiResult<Value> {
    let user = User::register(&state.pool, &body, state.password_work_factor).await?;
    Ok(ApiResponse::created(json!({ "user": user })))
}

/// GET /users - list users (admin only)
pub async fn list(State(state): State<AppState>) -> ApiResult<Value> {
    let users = User::find_all(&state.pool).await?;
    Ok(ApiResponse::success(json!({ "users": users })))
}

/// GET /users/:username - user detail with applications (admin or self)
pub async fn get(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Value> {
    let user = User::get(&state.pool, &username).await?;
    Ok(ApiResponse::success(json!({ "user": user })))
}

/// PATCH /users/:username - partial update (admin or self)
pub async fn update(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(patch): Json<Map<String, Value>>,
) -> ApiResult<Value> {
    let user = User::update(&state.pool, &username, &patch, state.password_work_factor).await?;
    Ok(ApiResponse::success(json!({ "user": user })))
}

/// DELETE /users/:username - delete a user (admin or self)
pub async fn remove(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Value> {
    User::remove(&state.pool, &username).await?;
    Ok(ApiResponse::success(json!({ "deleted": username })))
}

/// POST /users/:username/jobs/:id - apply to a job (admin or self)
pub async fn apply(
    State(state): State<AppState>,
    Path((username, job_id)): Path<(String, i32)>,
) -> ApiResult<Value> {
    User::apply_to_job(&state.pool, &username, job_id).await?;
    Ok(ApiResponse::success(json!({ "applied": job_id })))
}
