use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Map, Value};

use crate::middleware::{ApiResponse, ApiResult};
use crate::models::company::{Company, CompanyFilters, NewCompany};
use crate::state::AppState;

/// POST /companies - create a company (admin only)
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<NewCompany>,
) -> ApiResult<Value> {
    let company = Company::create(&state.pool, &body).await?;
    Ok(ApiResponse::created(json!({ "company": company })))
}

/// GET /companies - list companies, with optional filters (anonymous ok)
pub async fn list(
    State(state): State<AppState>,
    Query(filters): Query<CompanyFilters>,
) -> ApiResult<Value> {
    let companies = Company::find_all(&state.pool, &filters).await?;
    Ok(ApiResponse::success(json!({ "companies": companies })))
}

/// GET /companies/:handle - company detail with its jobs (anonymous ok)
pub async fn get(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> ApiResult<Value> {
    let company = Company::get(&state.pool, &handle).await?;
    Ok(ApiResponse::success(json!({ "company": company })))
}

/// PATCH /companies/:handle - partial update (admin only)
pub async fn update(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    Json(patch): Json<Map<String, Value>>,
) -> ApiResult<Value> {
    let company = Company::update(&state.pool, &handle, &patch).await?;
    Ok(ApiResponse::success(json!({ "company": company })))
}

/// DELETE /companies/:handle - delete a company (admin only)
pub async fn remove(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> ApiResult<Value> {
    Company::remove(&state.pool, &handle).await?;
    Ok(ApiResponse::success(json!({ "deleted": handle })))
}
