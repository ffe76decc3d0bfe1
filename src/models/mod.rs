pub mod company;
pub mod job;
pub mod user;

use serde_json::{Map, Value};

use crate::error::ApiError;

/// Reject patch bodies containing fields outside the allowed set. Runs at
/// the model boundary before the patch reaches the SET-clause compiler.
pub fn ensure_allowed_fields(patch: &Map<String, Value>, allowed: &[&str]) -> Result<(), ApiError> {
    for field in patch.keys() {
        if !allowed.contains(&field.as_str()) {
            return Err(ApiError::bad_request(format!(
                "field is not allowed: {}",
                field
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn allowed_fields_pass() {
        let patch = match json!({ "name": "Acme", "description": "d" }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        assert!(ensure_allowed_fields(&patch, &["name", "description", "logoUrl"]).is_ok());
    }

    #[test]
    fn unknown_field_is_rejected() {
        let patch = match json!({ "handle": "acme" }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let err = ensure_allowed_fields(&patch, &["name"]).unwrap_err();
        assert_eq!(err, ApiError::bad_request("field is not allowed: handle"));
    }
}
