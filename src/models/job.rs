use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use sqlx::{FromRow, PgPool};

use crate::error::ApiError;
use crate::models::company::Company;
use crate::sql::{bind_value, compile, FieldNameMap};

const JOB_COLUMNS: &str = "id, title, salary, equity, company_handle";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<f64>,
    pub company_handle: String,
}

/// Job plus the company offering it, as returned by the detail endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetail {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<f64>,
    pub company: Company,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<f64>,
    pub company_handle: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFilters {
    pub title: Option<String>,
    pub min_salary: Option<i32>,
    pub has_equity: Option<bool>,
}

/// Fields a PATCH body may touch. Neither the id nor the company moves.
const UPDATABLE_FIELDS: &[&str] = &["title", "salary", "equity"];

impl Job {
    pub async fn create(pool: &PgPool, data: &NewJob) -> Result<Job, ApiError> {
        let company =
            sqlx::query_scalar::<_, String>("SELECT handle FROM companies WHERE handle = $1")
                .bind(&data.company_handle)
                .fetch_optional(pool)
                .await?;

        if company.is_none() {
            return Err(ApiError::not_found(format!(
                "no company: {}",
                data.company_handle
            )));
        }

        let sql = format!(
            "INSERT INTO jobs (title, salary, equity, company_handle) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            JOB_COLUMNS
        );

        let job = sqlx::query_as::<_, Job>(&sql)
            .bind(&data.title)
            .bind(data.salary)
            .bind(data.equity)
            .bind(&data.company_handle)
            .fetch_one(pool)
            .await?;

        Ok(job)
    }

    /// List jobs, optionally narrowed by title substring, minimum salary,
    /// and whether the job carries equity.
    pub async fn find_all(pool: &PgPool, filters: &JobFilters) -> Result<Vec<Job>, ApiError> {
        let mut conditions: Vec<String> = vec![];
        let mut params: Vec<Value> = vec![];

        if let Some(min_salary) = filters.min_salary {
            params.push(json!(min_salary));
            conditions.push(format!("salary >= ${}", params.len()));
        }
        if filters.has_equity == Some(true) {
            conditions.push("equity > 0".to_string());
        }
        if let Some(title) = &filters.title {
            params.push(json!(format!("%{}%", title)));
            conditions.push(format!("title ILIKE ${}", params.len()));
        }

        let mut sql = format!("SELECT {} FROM jobs", JOB_COLUMNS);
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY title");

        let mut q = sqlx::query_as::<_, Job>(&sql);
        for p in params.iter() {
            q = bind_value(q, p);
        }

        Ok(q.fetch_all(pool).await?)
    }

    pub async fn find_by_company(pool: &PgPool, handle: &str) -> Result<Vec<Job>, ApiError> {
        let sql = format!(
            "SELECT {} FROM jobs WHERE company_handle = $1 ORDER BY id",
            JOB_COLUMNS
        );
        let jobs = sqlx::query_as::<_, Job>(&sql)
            .bind(handle)
            .fetch_all(pool)
            .await?;
        Ok(jobs)
    }

    /// Fetch a job and its company. `NotFound` when the id is unknown.
    pub async fn get(pool: &PgPool, id: i32) -> Result<JobDetail, ApiError> {
        let sql = format!("SELECT {} FROM jobs WHERE id = $1", JOB_COLUMNS);
        let job = sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("no job: {}", id)))?;

        let company = sqlx::query_as::<_, Company>(
            "SELECT handle, name, description, num_employees, logo_url \
             FROM companies WHERE handle = $1",
        )
        .bind(&job.company_handle)
        .fetch_one(pool)
        .await?;

        Ok(JobDetail {
            id: job.id,
            title: job.title,
            salary: job.salary,
            equity: job.equity,
            company,
        })
    }

    /// Apply a partial patch. Only fields present in the patch change.
    pub async fn update(pool: &PgPool, id: i32, patch: &Map<String, Value>) -> Result<Job, ApiError> {
        crate::models::ensure_allowed_fields(patch, UPDATABLE_FIELDS)?;

        // column names match the external field names here
        let compiled = compile(patch, &FieldNameMap::new())?;
        let sql = format!(
            "UPDATE jobs SET {} WHERE id = ${} RETURNING {}",
            compiled.set_clause,
            compiled.next_param_index(),
            JOB_COLUMNS
        );

        let mut q = sqlx::query_as::<_, Job>(&sql);
        for v in compiled.values.iter() {
            q = bind_value(q, v);
        }
        q = q.bind(id);

        q.fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("no job: {}", id)))
    }

    pub async fn remove(pool: &PgPool, id: i32) -> Result<(), ApiError> {
        let deleted = sqlx::query_scalar::<_, i32>("DELETE FROM jobs WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        match deleted {
            Some(_) => Ok(()),
            None => Err(ApiError::not_found(format!("no job: {}", id))),
        }
    }
}
