use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Map, Value};

use crate::middleware::{ApiResponse, ApiResult};
use crate::models::job::{Job, JobFilters, NewJob};
use crate::state::AppState;

/// POST /jobs - create a job (admin only)
pub async fn create(State(state): State<AppState>, Json(body): Json<NewJob>) -> ApiResult<Value> {
    let job = Job::create(&state.pool, &body).await?;
    Ok(ApiResponse::created(json!({ "job": job })))
}

/// GET /jobs - list jobs, with optional filters (anonymous ok)
pub async fn list(
    State(state): State<AppState>,
    Query(filters): Query<JobFilters>,
) -> ApiResult<Value> {
    let jobs = Job::find_all(&state.pool, &filters).await?;
    Ok(ApiResponse::success(json!({ "jobs": jobs })))
}

/// GET /jobs/:id - job detail with its company (anonymous ok)
pub async fn get(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<Value> {
    let job = Job::get(&state.pool, id).await?;
    Ok(ApiResponse::success(json!({ "job": job })))
}

/// PATCH /jobs/:id - partial update (admin only)
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(patch): Json<Map<String, Value>>,
) -> ApiResult<Value> {
    let job = Job::update(&state.pool, id, &patch).await?;
    Ok(ApiResponse::success(json!({ "job": job })))
}

/// DELETE /jobs/:id - delete a job (admin only)
pub async fn remove(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<Value> {
    Job::remove(&state.pool, id).await?;
    Ok(ApiResponse::success(json!({ "deleted": id })))
}
