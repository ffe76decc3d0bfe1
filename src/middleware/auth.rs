use std::collections::HashMap;

use axum::{
    extract::{Path, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::{verify_token, Claims};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated identity extracted from a verified JWT, carried as a
/// request extension. Strictly request-scoped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub is_admin: bool,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.sub,
            is_admin: claims.is_admin,
        }
    }
}

/// Identity extraction. Runs on every request; if a bearer token is present
/// and verifies against the configured secret, the decoded [`Identity`] is
/// stored on the request. A missing or invalid token leaves the slot empty
/// and the request continues either way. Downstream guards cannot tell the
/// two cases apart, so nothing leaks about why a credential was rejected.
pub async fn authenticate_jwt(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(request.headers()) {
        if let Ok(claims) = verify_token(&token, &state.jwt_secret) {
            request.extensions_mut().insert(Identity::from(claims));
        }
    }

    next.run(request).await
}

/// Guard: an authenticated identity must be present.
pub async fn require_authenticated(request: Request, next: Next) -> Result<Response, ApiError> {
    check_authenticated(request.extensions().get::<Identity>())?;
    Ok(next.run(request).await)
}

/// Guard: an authenticated admin identity must be present. Re-checks
/// identity presence itself rather than assuming `require_authenticated`
/// ran earlier in the chain.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    check_admin(request.extensions().get::<Identity>())?;
    Ok(next.run(request).await)
}

/// Guard: the identity must be an admin, or must match the `:username` path
/// segment of the addressed resource.
pub async fn require_admin_or_self(
    Path(params): Path<HashMap<String, String>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let target = params
        .get("username")
        .ok_or_else(|| ApiError::forbidden("must be an admin or the addressed user"))?;

    check_admin_or_self(request.extensions().get::<Identity>(), target)?;
    Ok(next.run(request).await)
}

/// Continue only if an identity was established.
pub fn check_authenticated(identity: Option<&Identity>) -> Result<(), ApiError> {
    match identity {
        Some(_) => Ok(()),
        None => Err(ApiError::unauthorized("authentication required")),
    }
}

/// Continue only if an admin identity was established. Anonymous and
/// non-admin requests fail the same way.
pub fn check_admin(identity: Option<&Identity>) -> Result<(), ApiError> {
    match identity {
        Some(identity) if identity.is_admin => Ok(()),
        _ => Err(ApiError::forbidden("must be an admin")),
    }
}

/// Continue only if the identity is an admin or names the target user.
/// Username comparison is exact and case-sensitive.
pub fn check_admin_or_self(identity: Option<&Identity>, target: &str) -> Result<(), ApiError> {
    match identity {
        Some(identity) if identity.is_admin || identity.username == target => Ok(()),
        _ => Err(ApiError::forbidden("must be an admin or the addressed user")),
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    // header name lookup is case-insensitive
    let auth_header = headers.get("authorization")?;

    let auth_str = auth_header.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn anon() -> Option<Identity> {
        None
    }

    fn user(name: &str) -> Option<Identity> {
        Some(Identity {
            username: name.to_string(),
            is_admin: false,
        })
    }

    fn admin(name: &str) -> Option<Identity> {
        Some(Identity {
            username: name.to_string(),
            is_admin: true,
        })
    }

    #[test]
    fn authenticated_check_requires_identity() {
        assert_eq!(
            check_authenticated(anon().as_ref()),
            Err(ApiError::unauthorized("authentication required"))
        );
        assert_eq!(check_authenticated(user("u1").as_ref()), Ok(()));
        assert_eq!(check_authenticated(admin("a1").as_ref()), Ok(()));
    }

    #[test]
    fn admin_check_rejects_anonymous_and_non_admin() {
        let forbidden = Err(ApiError::forbidden("must be an admin"));
        assert_eq!(check_admin(anon().as_ref()), forbidden);
        assert_eq!(check_admin(user("u1").as_ref()), forbidden);
        assert_eq!(check_admin(admin("a1").as_ref()), Ok(()));
    }

    #[test]
    fn admin_or_self_allows_matching_user() {
        assert_eq!(check_admin_or_self(user("u1").as_ref(), "u1"), Ok(()));
        assert!(check_admin_or_self(user("u1").as_ref(), "u2").is_err());
        assert!(check_admin_or_self(anon().as_ref(), "u1").is_err());
    }

    #[test]
    fn admin_or_self_allows_any_target_for_admin() {
        assert_eq!(check_admin_or_self(admin("a1").as_ref(), "a1"), Ok(()));
        assert_eq!(check_admin_or_self(admin("a1").as_ref(), "someone-else"), Ok(()));
    }

    #[test]
    fn username_comparison_is_case_sensitive() {
        assert!(check_admin_or_self(user("U1").as_ref(), "u1").is_err());
    }

    #[test]
    fn bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi".to_string()));

        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert("authorization", HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }
}
