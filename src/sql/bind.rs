use serde_json::Value;
use sqlx::postgres::PgArguments;

/// Bind a JSON scalar to a `query_as` statement. Arrays and objects are not
/// accepted here; patch values are scalars by contract.
pub fn bind_value<'q, T>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, T, PgArguments>,
    v: &'q Value,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, T, PgArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        other => q.bind(other.to_string()),
    }
}
