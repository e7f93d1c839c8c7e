use anyhow::Result;
use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Method, Request},
    routing::get,
    Extension, Router,
};
use std::{path::Path, sync::Arc};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    services::{ServeDir, ServeFile},
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{debug_span, info, Span};
use ulid::Ulid;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod clock;
pub mod gate;
pub mod handlers;
pub mod service;
pub mod token;

use self::{
    clock::SystemClock,
    gate::{GateConfig, SharedSessionStore},
    service::{IssuerConfig, TokenService},
};

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[derive(OpenApi)]
#[openapi(
    paths(handlers::health::health, handlers::token::token),
    components(
        schemas(handlers::health::Health, handlers::token::Token, handlers::token::LoginRedirect)
    ),
    tags(
        (name = "annotate-auth", description = "Annotator authentication front-end API"),
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Build the application router.
///
/// Everything except `/health` and the OpenAPI routes runs behind the
/// request-id/trace/CORS stack; the static single-page-app bundle is the
/// fallback, with unknown paths rewritten to `index.html` for client-side
/// routing.
pub fn router(
    service: Arc<TokenService>,
    gate: Arc<GateConfig>,
    sessions: SharedSessionStore,
    static_dir: &Path,
) -> Router {
    let cors = CorsLayer::new()
        // the API surface is read-only
        .allow_methods([Method::GET])
        .allow_origin(Any);

    let spa = ServeDir::new(static_dir)
        .not_found_service(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route("/user/token", get(handlers::token))
        .fallback_service(spa)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(service))
                .layer(Extension(gate))
                .layer(Extension(sessions)),
        )
        .route("/health", get(handlers::health).options(handlers::health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

/// Serve the application.
/// # Errors
/// Returns an error if the server fails to start
pub async fn new(
    port: u16,
    issuer: IssuerConfig,
    gate: GateConfig,
    sessions: SharedSessionStore,
    static_dir: std::path::PathBuf,
) -> Result<()> {
    let service = Arc::new(TokenService::new(issuer, Arc::new(SystemClock)));

    let app = router(service, Arc::new(gate), sessions, &static_dir);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

// span
fn make_span(request: &Request<Body>) -> Span {
    let headers = request.headers();
    let path = request.uri().path();
    let request_id = headers
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    debug_span!("http-request", path, ?headers, request_id)
}
