use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::{FromRow, PgPool};

use crate::auth::password::{hash_password, verify_password};
use crate::error::ApiError;
use crate::sql::{bind_value, compile, FieldNameMap};

const USER_COLUMNS: &str = "username, first_name, last_name, email, is_admin";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

/// Internal row shape carrying the stored password hash. Never serialized.
#[derive(Debug, FromRow)]
struct UserRow {
    username: String,
    password: String,
    first_name: String,
    last_name: String,
    email: String,
    is_admin: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            is_admin: row.is_admin,
        }
    }
}

/// User plus the ids of jobs they have applied to.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub applications: Vec<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

fn update_field_map() -> FieldNameMap {
    FieldNameMap::from([("firstName", "first_name"), ("lastName", "last_name")])
}

/// Fields a PATCH body may touch. The admin flag is deliberately absent:
/// privilege changes go through the admin-only create path.
const UPDATABLE_FIELDS: &[&str] = &["firstName", "lastName", "email", "password"];

impl User {
    /// Create a user with a hashed password. The caller decides whether
    /// `is_admin` may be set; the self-registration route always clears it.
    pub async fn register(
        pool: &PgPool,
        data: &NewUser,
        work_factor: u32,
    ) -> Result<User, ApiError> {
        let existing =
            sqlx::query_scalar::<_, String>("SELECT username FROM users WHERE username = $1")
                .bind(&data.username)
                .fetch_optional(pool)
                .await?;

        if existing.is_some() {
            return Err(ApiError::bad_request(format!(
                "username taken: {}",
                data.username
            )));
        }

        let hashed = hash_password(&data.password, work_factor);
        let sql = format!(
            "INSERT INTO users (username, password, first_name, last_name, email, is_admin) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            USER_COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(&data.username)
            .bind(&hashed)
            .bind(&data.first_name)
            .bind(&data.last_name)
            .bind(&data.email)
            .bind(data.is_admin)
            .fetch_one(pool)
            .await?;

        Ok(user)
    }

    /// Check a username/password pair. A missing user and a wrong password
    /// fail identically.
    pub async fn authenticate(
        pool: &PgPool,
        username: &str,
        password: &str,
    ) -> Result<User, ApiError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT username, password, first_name, last_name, email, is_admin \
             FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        match row {
            Some(row) if verify_password(password, &row.password) => Ok(row.into()),
            _ => Err(ApiError::unauthorized("invalid username/password")),
        }
    }

    pub async fn find_all(pool: &PgPool) -> Result<Vec<User>, ApiError> {
        let sql = format!("SELECT {} FROM users ORDER BY username", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).fetch_all(pool).await?)
    }

    /// Fetch a user and their job applications. `NotFound` when unknown.
    pub async fn get(pool: &PgPool, username: &str) -> Result<UserDetail, ApiError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("no user: {}", username)))?;

        let applications = sqlx::query_scalar::<_, i32>(
            "SELECT job_id FROM applications WHERE username = $1 ORDER BY job_id",
        )
        .bind(username)
        .fetch_all(pool)
        .await?;

        Ok(UserDetail { user, applications })
    }

    /// Apply a partial patch. A new password is hashed before it reaches
    /// the SET-clause compiler; plaintext is never stored.
    pub async fn update(
        pool: &PgPool,
        username: &str,
        patch: &Map<String, Value>,
        work_factor: u32,
    ) -> Result<User, ApiError> {
        crate::models::ensure_allowed_fields(patch, UPDATABLE_FIELDS)?;

        let mut patch = patch.clone();
        if let Some(value) = patch.get_mut("password") {
            let plaintext = value
                .as_str()
                .ok_or_else(|| ApiError::bad_request("password must be a string"))?;
            *value = Value::String(hash_password(plaintext, work_factor));
        }

        let compiled = compile(&patch, &update_field_map())?;
        let sql = format!(
            "UPDATE users SET {} WHERE username = ${} RETURNING {}",
            compiled.set_clause,
            compiled.next_param_index(),
            USER_COLUMNS
        );

        let mut q = sqlx::query_as::<_, User>(&sql);
        for v in compiled.values.iter() {
            q = bind_value(q, v);
        }
        q = q.bind(username);

        q.fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("no user: {}", username)))
    }

    pub async fn remove(pool: &PgPool, username: &str) -> Result<(), ApiError> {
        let deleted = sqlx::query_scalar::<_, String>(
            "DELETE FROM users WHERE username = $1 RETURNING username",
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        match deleted {
            Some(_) => Ok(()),
            None => Err(ApiError::not_found(format!("no user: {}", username))),
        }
    }

    /// Record a job application. Both sides must exist; duplicates are a
    /// caller error.
    pub async fn apply_to_job(pool: &PgPool, username: &str, job_id: i32) -> Result<(), ApiError> {
        let job = sqlx::query_scalar::<_, i32>("SELECT id FROM jobs WHERE id = $1")
            .bind(job_id)
            .fetch_optional(pool)
            .await?;
        if job.is_none() {
            return Err(ApiError::not_found(format!("no job: {}", job_id)));
        }

        let user = sqlx::query_scalar::<_, String>("SELECT username FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(pool)
            .await?;
        if user.is_none() {
            return Err(ApiError::not_found(format!("no user: {}", username)));
        }

        sqlx::query("INSERT INTO applications (username, job_id) VALUES ($1, $2)")
            .bind(username)
            .bind(job_id)
            .execute(pool)
            .await?;

        Ok(())
    }
}
