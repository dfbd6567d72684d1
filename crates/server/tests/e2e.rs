use std::net::SocketAddr;

use reqwest::StatusCode;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tokio::net::TcpListener;

use server::routes::auth::ServerState;
use server::startup::build_app;

struct TestApp {
    base_url: String,
}

async fn start_server() -> anyhow::Result<TestApp> {
    let cfg = configs::AuthConfig {
        jwt_secret: "test-secret".into(),
        access_ttl_minutes: 60,
        refresh_ttl_days: 7,
        frontend_base_url: "http://localhost:5173".into(),
        secure_cookies: false,
        google_callback_secret: "relay-key".into(),
    };
    let app = build_app(ServerState::new(DatabaseConnection::Disconnected, &cfg));
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("server error: {e}");
        }
    });
    Ok(TestApp { base_url: format!("http://{addr}") })
}

#[tokio::test]
async fn serves_health_over_tcp() -> anyhow::Result<()> {
    let app = start_server().await?;
    let resp = reqwest::get(format!("{}/health", app.base_url)).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn cors_preflight_is_answered() -> anyhow::Result<()> {
    let app = start_server().await?;
    let resp = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("{}/api/orders", app.base_url))
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "POST")
        .send()
        .await?;
    assert!(resp.status().is_success());
    assert!(resp.headers().get("access-control-allow-origin").is_some());
    Ok(())
}

#[tokio::test]
async fn unauthenticated_staff_call_is_rejected() -> anyhow::Result<()> {
    let app = start_server().await?;
    let resp = reqwest::get(format!("{}/admin/orders", app.base_url)).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await?;
    assert_eq!(body["error"], "Authentication credentials were not provided");
    Ok(())
}
