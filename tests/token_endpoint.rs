use annotate_auth::auth::{
    self,
    clock::SystemClock,
    gate::{GateConfig, HeaderSession, SessionStore, SharedSessionStore},
    service::{IssuerConfig, TokenService},
    token::Principal,
};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{header::CACHE_CONTROL, HeaderMap, Request, StatusCode},
    Router,
};
use secrecy::SecretString;
use std::{fs, path::Path, sync::Arc};
use tempfile::TempDir;
use tower::ServiceExt;

#[derive(Debug, serde::Deserialize)]
struct TokenResponse {
    token: String,
}

#[derive(Debug, serde::Deserialize)]
struct RedirectResponse {
    redirect: String,
}

// Session stub standing in for the external user-management layer.
struct StaticSession(Option<Principal>);

impl SessionStore for StaticSession {
    fn current_principal(&self, _headers: &HeaderMap) -> Option<Principal> {
        self.0.clone()
    }
}

fn issuer_config() -> IssuerConfig {
    IssuerConfig {
        consumer_key: "annotateit".to_string(),
        consumer_secret: SecretString::from("s3cr3t".to_string()),
        ttl: 86400,
    }
}

fn spa_bundle() -> Result<TempDir> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("index.html"), "<html>annotateit</html>")?;
    fs::write(dir.path().join("app.js"), "console.log('annotateit');")?;
    Ok(dir)
}

fn test_router(
    service: Arc<TokenService>,
    sessions: SharedSessionStore,
    disabled: bool,
    static_dir: &Path,
) -> Router {
    let gate = GateConfig {
        disabled,
        login_url: "/user/sign-in".to_string(),
    };
    auth::router(service, Arc::new(gate), sessions, static_dir)
}

async fn get(router: Router, uri: &str) -> Result<axum::response::Response> {
    let request = Request::builder().uri(uri).body(Body::empty())?;
    router.oneshot(request).await.context("router call failed")
}

async fn body_bytes(response: axum::response::Response) -> Result<Vec<u8>> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .context("failed to read response body")?;
    Ok(bytes.to_vec())
}

#[tokio::test]
async fn unauthenticated_token_request_gets_redirect_not_token() -> Result<()> {
    let bundle = spa_bundle()?;
    let service = Arc::new(TokenService::new(issuer_config(), Arc::new(SystemClock)));
    let router = test_router(
        Arc::clone(&service),
        Arc::new(StaticSession(None)),
        false,
        bundle.path(),
    );

    let response = get(router, "/user/token").await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(CACHE_CONTROL)
            .and_then(|value| value.to_str().ok()),
        Some("no-store")
    );

    let body = body_bytes(response).await?;
    let reply: RedirectResponse = serde_json::from_slice(&body)?;
    assert_eq!(reply.redirect, "/user/sign-in?next=%2Fuser%2Ftoken");

    // never a token alongside the redirect
    assert!(serde_json::from_slice::<TokenResponse>(&body).is_err());
    Ok(())
}

#[tokio::test]
async fn authenticated_token_request_issues_verifiable_token() -> Result<()> {
    let bundle = spa_bundle()?;
    let service = Arc::new(TokenService::new(issuer_config(), Arc::new(SystemClock)));
    let router = test_router(
        Arc::clone(&service),
        Arc::new(StaticSession(Some(Principal::Id(42)))),
        false,
        bundle.path(),
    );

    let response = get(router, "/user/token").await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_bytes(response).await?;
    let reply: TokenResponse = serde_json::from_slice(&body)?;
    assert_eq!(
        service.verify(&reply.token).ok(),
        Some(Principal::Id(42)),
        "issued token must verify to the session principal"
    );
    Ok(())
}

#[tokio::test]
async fn header_session_feeds_the_gate() -> Result<()> {
    let bundle = spa_bundle()?;
    let service = Arc::new(TokenService::new(issuer_config(), Arc::new(SystemClock)));
    let router = test_router(
        Arc::clone(&service),
        Arc::new(HeaderSession::new("X-Auth-User".to_string())),
        false,
        bundle.path(),
    );

    let request = Request::builder()
        .uri("/user/token")
        .header("X-Auth-User", "42")
        .body(Body::empty())?;
    let response = router.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_bytes(response).await?;
    let reply: TokenResponse = serde_json::from_slice(&body)?;
    assert_eq!(service.verify(&reply.token).ok(), Some(Principal::Id(42)));
    Ok(())
}

#[tokio::test]
async fn disabled_gate_mints_anonymous_tokens() -> Result<()> {
    let bundle = spa_bundle()?;
    let service = Arc::new(TokenService::new(issuer_config(), Arc::new(SystemClock)));
    let router = test_router(
        Arc::clone(&service),
        Arc::new(StaticSession(None)),
        true,
        bundle.path(),
    );

    let response = get(router, "/user/token").await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_bytes(response).await?;
    let reply: TokenResponse = serde_json::from_slice(&body)?;
    assert_eq!(
        service.verify(&reply.token).ok(),
        Some(Principal::Name("anonymous".to_string()))
    );
    Ok(())
}

#[tokio::test]
async fn health_reports_service_identity() -> Result<()> {
    let bundle = spa_bundle()?;
    let service = Arc::new(TokenService::new(issuer_config(), Arc::new(SystemClock)));
    let router = test_router(service, Arc::new(StaticSession(None)), false, bundle.path());

    let response = get(router, "/health").await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_bytes(response).await?;
    let health: serde_json::Value = serde_json::from_slice(&body)?;
    assert_eq!(health["name"], "annotate-auth");
    Ok(())
}

#[tokio::test]
async fn static_bundle_is_served_with_spa_fallback() -> Result<()> {
    let bundle = spa_bundle()?;
    let service = Arc::new(TokenService::new(issuer_config(), Arc::new(SystemClock)));
    let sessions: SharedSessionStore = Arc::new(StaticSession(None));

    let index = get(
        test_router(Arc::clone(&service), Arc::clone(&sessions), false, bundle.path()),
        "/",
    )
    .await?;
    assert_eq!(index.status(), StatusCode::OK);
    assert_eq!(body_bytes(index).await?, b"<html>annotateit</html>");

    let asset = get(
        test_router(Arc::clone(&service), Arc::clone(&sessions), false, bundle.path()),
        "/app.js",
    )
    .await?;
    assert_eq!(asset.status(), StatusCode::OK);
    assert_eq!(body_bytes(asset).await?, b"console.log('annotateit');");

    // unknown paths fall back to index.html for client-side routing
    let fallback = get(
        test_router(service, sessions, false, bundle.path()),
        "/annotations/123",
    )
    .await?;
    assert_eq!(fallback.status(), StatusCode::OK);
    assert_eq!(body_bytes(fallback).await?, b"<html>annotateit</html>");
    Ok(())
}
