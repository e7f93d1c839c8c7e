use axum::{
    extract::{Extension, OriginalUri},
    http::{header::CACHE_CONTROL, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

use crate::auth::{
    gate::{self, Gate, GateConfig, SharedSessionStore},
    service::TokenService,
};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Token {
    pub token: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRedirect {
    pub redirect: String,
}

#[utoipa::path(
    get,
    path= "/user/token",
    responses (
        (status = 200, description = "Signed bearer token for the session user; \
            unauthenticated callers receive `{\"redirect\": \"<login-url>?next=<url>\"}` \
            instead of a token", body = Token),
        (status = 500, description = "Error signing the token", body = String)
    ),
    tag = "token",
)]
#[instrument(skip(service, gate, sessions, headers))]
pub async fn token(
    Extension(service): Extension<Arc<TokenService>>,
    Extension(gate): Extension<Arc<GateConfig>>,
    Extension(sessions): Extension<SharedSessionStore>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Response {
    let principal = sessions.current_principal(&headers);

    match gate::check(&gate, principal, &uri.to_string()) {
        Gate::Redirect(redirect) => {
            debug!("Unauthenticated token request, redirecting to {redirect}");
            (no_store(), Json(LoginRedirect { redirect })).into_response()
        }
        Gate::Proceed(user) => match service.issue(user) {
            Ok(token) => (no_store(), Json(Token { token })).into_response(),
            Err(err) => {
                error!("Failed to sign token: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to sign token".to_string(),
                )
                    .into_response()
            }
        },
    }
}

// Tokens are credentials, keep them out of shared caches.
fn no_store() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers
}
