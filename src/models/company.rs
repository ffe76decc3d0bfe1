use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use sqlx::{FromRow, PgPool};

use crate::error::ApiError;
use crate::models::job::Job;
use crate::sql::{bind_value, compile, FieldNameMap};

const COMPANY_COLUMNS: &str =
    "handle, name, description, num_employees, logo_url";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

/// Company plus its open jobs, as returned by the detail endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<Job>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyFilters {
    pub name: Option<String>,
    pub min_employees: Option<i32>,
    pub max_employees: Option<i32>,
}

fn update_field_map() -> FieldNameMap {
    FieldNameMap::from([("numEmployees", "num_employees"), ("logoUrl", "logo_url")])
}

/// Fields a PATCH body may touch. The handle is immutable.
const UPDATABLE_FIELDS: &[&str] = &["name", "description", "numEmployees", "logoUrl"];

impl Company {
    pub async fn create(pool: &PgPool, data: &NewCompany) -> Result<Company, ApiError> {
        let existing = sqlx::query_scalar::<_, String>("SELECT handle FROM companies WHERE handle = $1")
            .bind(&data.handle)
            .fetch_optional(pool)
            .await?;

        if existing.is_some() {
            return Err(ApiError::bad_request(format!(
                "company already exists: {}",
                data.handle
            )));
        }

        let sql = format!(
            "INSERT INTO companies (handle, name, description, num_employees, logo_url) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            COMPANY_COLUMNS
        );

        let company = sqlx::query_as::<_, Company>(&sql)
            .bind(&data.handle)
            .bind(&data.name)
            .bind(&data.description)
            .bind(data.num_employees)
            .bind(&data.logo_url)
            .fetch_one(pool)
            .await?;

        Ok(company)
    }

    /// List companies, optionally narrowed by name substring and employee
    /// count bounds.
    pub async fn find_all(pool: &PgPool, filters: &CompanyFilters) -> Result<Vec<Company>, ApiError> {
        if let (Some(min), Some(max)) = (filters.min_employees, filters.max_employees) {
            if min > max {
                return Err(ApiError::bad_request(
                    "minEmployees cannot be greater than maxEmployees",
                ));
            }
        }

        let mut conditions: Vec<String> = vec![];
        let mut params: Vec<Value> = vec![];

        if let Some(min) = filters.min_employees {
            params.push(json!(min));
            conditions.push(format!("num_employees >= ${}", params.len()));
        }
        if let Some(max) = filters.max_employees {
            params.push(json!(max));
            conditions.push(format!("num_employees <= ${}", params.len()));
        }
        if let Some(name) = &filters.name {
            params.push(json!(format!("%{}%", name)));
            conditions.push(format!("name ILIKE ${}", params.len()));
        }

        let mut sql = format!("SELECT {} FROM companies", COMPANY_COLUMNS);
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY name");

        let mut q = sqlx::query_as::<_, Company>(&sql);
        for p in params.iter() {
            q = bind_value(q, p);
        }

        Ok(q.fetch_all(pool).await?)
    }

    /// Fetch a company and its jobs. `NotFound` when the handle is unknown.
    pub async fn get(pool: &PgPool, handle: &str) -> Result<CompanyDetail, ApiError> {
        let sql = format!("SELECT {} FROM companies WHERE handle = $1", COMPANY_COLUMNS);
        let company = sqlx::query_as::<_, Company>(&sql)
            .bind(handle)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("no company: {}", handle)))?;

        let jobs = Job::find_by_company(pool, handle).await?;

        Ok(CompanyDetail { company, jobs })
    }

    /// Apply a partial patch. Only fields present in the patch change.
    pub async fn update(
        pool: &PgPool,
        handle: &str,
        patch: &Map<String, Value>,
    ) -> Result<Company, ApiError> {
        crate::models::ensure_allowed_fields(patch, UPDATABLE_FIELDS)?;

        let compiled = compile(patch, &update_field_map())?;
        let sql = format!(
            "UPDATE companies SET {} WHERE handle = ${} RETURNING {}",
            compiled.set_clause,
            compiled.next_param_index(),
            COMPANY_COLUMNS
        );

        let mut q = sqlx::query_as::<_, Company>(&sql);
        for v in compiled.values.iter() {
            q = bind_value(q, v);
        }
        q = q.bind(handle);

        q.fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("no company: {}", handle)))
    }

    pub async fn remove(pool: &PgPool, handle: &str) -> Result<(), ApiError> {
        let deleted =
            sqlx::query_scalar::<_, String>("DELETE FROM companies WHERE handle = $1 RETURNING handle")
                .bind(handle)
                .fetch_optional(pool)
                .await?;

        match deleted {
            Some(_) => Ok(()),
            None => Err(ApiError::not_found(format!("no company: {}", handle))),
        }
    }
}
