mod common;

use anyhow::Result;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::get,
    Extension, Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use jobboard_api::middleware::{
    authenticate_jwt, require_admin, require_admin_or_self, require_authenticated, Identity,
};

/// Handler that reports what the guard chain left on the request.
async fn echo_identity(identity: Option<Extension<Identity>>) -> Json<Value> {
    match identity {
        Some(Extension(identity)) => Json(json!({
            "username": identity.username,
            "isAdmin": identity.is_admin,
        })),
        None => Json(json!({ "anonymous": true })),
    }
}

/// Router wiring each guard combination against a trivial handler, with
/// identity extraction layered globally like the real app.
fn guard_router() -> Router {
    let state = common::test_state();

    Router::new()
        .route("/open", get(echo_identity))
        .route(
            "/authenticated",
            get(echo_identity).route_layer(axum::middleware::from_fn(require_authenticated)),
        )
        .route(
            "/admin",
            get(echo_identity).route_layer(axum::middleware::from_fn(require_admin)),
        )
        .route(
            "/self/:username",
            get(echo_identity).route_layer(axum::middleware::from_fn(require_admin_or_self)),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            authenticate_jwt,
        ))
        .with_state(state)
}

fn request(path: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(path);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Result<Value> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn extraction_alone_never_halts() -> Result<()> {
    // no credential
    let res = guard_router().oneshot(request("/open", None)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await?, json!({ "anonymous": true }));

    // garbage credential: indistinguishable from no credential downstream
    let res = guard_router()
        .oneshot(request("/open", Some("not.a.token")))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await?, json!({ "anonymous": true }));

    Ok(())
}

#[tokio::test]
async fn extraction_populates_identity_from_valid_token() -> Result<()> {
    let token = common::token_for("aliya", false);
    let res = guard_router().oneshot(request("/open", Some(&token))).await?;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        body_json(res).await?,
        json!({ "username": "aliya", "isAdmin": false })
    );
    Ok(())
}

#[tokio::test]
async fn capitalized_authorization_header_is_accepted() -> Result<()> {
    let token = common::token_for("aliya", false);
    let res = guard_router()
        .oneshot(
            Request::builder()
                .uri("/open")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        body_json(res).await?,
        json!({ "username": "aliya", "isAdmin": false })
    );
    Ok(())
}

#[tokio::test]
async fn token_signed_with_wrong_secret_yields_no_identity() -> Result<()> {
    let claims = jobboard_api::auth::Claims::new("aliya".to_string(), true, 1);
    let forged = jobboard_api::auth::issue_token(&claims, "some-other-secret")?;

    let res = guard_router().oneshot(request("/open", Some(&forged))).await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await?, json!({ "anonymous": true }));
    Ok(())
}

#[tokio::test]
async fn require_authenticated_rejects_anonymous() -> Result<()> {
    let res = guard_router().oneshot(request("/authenticated", None)).await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(res).await?;
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn require_authenticated_passes_any_identity() -> Result<()> {
    let token = common::token_for("aliya", false);
    let res = guard_router()
        .oneshot(request("/authenticated", Some(&token)))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn require_admin_rejects_anonymous_and_non_admin() -> Result<()> {
    let res = guard_router().oneshot(request("/admin", None)).await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let token = common::token_for("aliya", false);
    let res = guard_router().oneshot(request("/admin", Some(&token))).await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let body = body_json(res).await?;
    assert_eq!(body["message"], "must be an admin");
    Ok(())
}

#[tokio::test]
async fn require_admin_passes_admin() -> Result<()> {
    let token = common::token_for("root", true);
    let res = guard_router().oneshot(request("/admin", Some(&token))).await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn admin_or_self_allows_matching_user() -> Result<()> {
    let token = common::token_for("aliya", false);
    let res = guard_router()
        .oneshot(request("/self/aliya", Some(&token)))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn admin_or_self_rejects_other_user() -> Result<()> {
    let token = common::token_for("aliya", false);
    let res = guard_router()
        .oneshot(request("/self/bart", Some(&token)))
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn admin_or_self_rejects_anonymous() -> Result<()> {
    let res = guard_router().oneshot(request("/self/aliya", None)).await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn admin_or_self_allows_admin_for_any_target() -> Result<()> {
    let token = common::token_for("root", true);
    let res = guard_router()
        .oneshot(request("/self/aliya", Some(&token)))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn app_router_guards_admin_routes() -> Result<()> {
    // The real application router: admin-gated writes are rejected before
    // any handler or database work happens.
    let app = jobboard_api::app(common::test_state());

    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/companies")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"handle":"acme","name":"Acme"}"#))
                .unwrap(),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let token = common::token_for("aliya", false);
    let res = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/companies/acme")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn app_router_guards_user_routes() -> Result<()> {
    let app = jobboard_api::app(common::test_state());

    // listing users requires admin
    let token = common::token_for("aliya", false);
    let res = app
        .clone()
        .oneshot(request("/users", Some(&token)))
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // another user's record is off limits
    let res = app.oneshot(request("/users/bart", Some(&token))).await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    Ok(())
}
