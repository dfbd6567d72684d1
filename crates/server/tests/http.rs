use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower::ServiceExt;

use server::routes::auth::ServerState;
use server::startup::build_app;

fn auth_config() -> configs::AuthConfig {
    configs::AuthConfig {
        jwt_secret: "test-secret".into(),
        access_ttl_minutes: 60,
        refresh_ttl_days: 7,
        frontend_base_url: "http://localhost:5173".into(),
        secure_cookies: false,
        google_callback_secret: "relay-key".into(),
    }
}

fn offline_app() -> Router {
    build_app(ServerState::new(DatabaseConnection::Disconnected, &auth_config()))
}

async fn body_json(resp: axum::response::Response) -> anyhow::Result<Value> {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn health_is_public() -> anyhow::Result<()> {
    let resp = offline_app()
        .oneshot(Request::builder().uri("/health").body(Body::empty())?)
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await?, json!({"status": "ok"}));
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_credentials() -> anyhow::Result<()> {
    for uri in ["/api/users/me", "/api/orders", "/api/technician/stats", "/admin/stats"] {
        let resp = offline_app()
            .oneshot(Request::builder().uri(uri).body(Body::empty())?)
            .await?;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(
            body_json(resp).await?,
            json!({"error": "Authentication credentials were not provided"})
        );
    }
    Ok(())
}

#[tokio::test]
async fn garbage_token_is_rejected() -> anyhow::Result<()> {
    let req = Request::builder()
        .uri("/api/users/me")
        .header("authorization", "Bearer not-a-jwt")
        .body(Body::empty())?;
    let resp = offline_app().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await?, json!({"error": "Invalid or expired token"}));
    Ok(())
}

#[tokio::test]
async fn logout_clears_cookie() -> anyhow::Result<()> {
    let req = Request::builder()
        .method("POST")
        .uri("/auth/logout")
        .header("cookie", "auth_token=abc")
        .body(Body::empty())?;
    let resp = offline_app().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = resp
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(cookie.starts_with("auth_token="));
    assert_eq!(body_json(resp).await?, json!({"message": "Successfully logged out"}));
    Ok(())
}

#[tokio::test]
async fn openapi_document_is_served() -> anyhow::Result<()> {
    let resp = offline_app()
        .oneshot(Request::builder().uri("/api-docs/openapi.json").body(Body::empty())?)
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let doc = body_json(resp).await?;
    assert!(doc["paths"]["/auth/register"].is_object());
    assert!(doc["paths"]["/admin/stats"].is_object());
    Ok(())
}

#[tokio::test]
async fn metrics_are_exposed() -> anyhow::Result<()> {
    let resp = offline_app()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty())?)
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn google_callback_refuses_forged_profile() -> anyhow::Result<()> {
    let body = serde_json::to_vec(&json!({"email": "boss@shop.test", "email_verified": true}))?;
    for secret in [None, Some("wrong-key")] {
        let mut req = Request::builder()
            .method("POST")
            .uri("/auth/google/callback")
            .header("content-type", "application/json");
        if let Some(s) = secret {
            req = req.header("x-google-callback-secret", s);
        }
        let resp = offline_app().oneshot(req.body(Body::from(body.clone()))?).await?;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        let location = resp.headers().get("location").and_then(|v| v.to_str().ok()).unwrap_or_default();
        assert_eq!(location, "http://localhost:5173/login?error=not_authenticated");
    }
    Ok(())
}

#[tokio::test]
async fn google_callback_is_disabled_without_configured_secret() -> anyhow::Result<()> {
    let cfg = configs::AuthConfig { google_callback_secret: String::new(), ..auth_config() };
    let app = build_app(ServerState::new(DatabaseConnection::Disconnected, &cfg));
    let req = Request::builder()
        .method("POST")
        .uri("/auth/google/callback")
        .header("content-type", "application/json")
        .header("x-google-callback-secret", "")
        .body(Body::from(serde_json::to_vec(&json!({"email": "a@b.co", "email_verified": true}))?))?;
    let resp = app.oneshot(req).await?;
    let location = resp.headers().get("location").and_then(|v| v.to_str().ok()).unwrap_or_default();
    assert!(location.ends_with("/login?error=not_authenticated"));
    Ok(())
}
