//! AJAX-aware login gate.
//!
//! Single-page-app clients cannot follow an HTTP 302 from an XHR, so instead
//! of redirecting, gated endpoints answer unauthenticated callers with a
//! machine-readable `{"redirect": "<login>?next=<url>"}` body. Session state
//! itself belongs to the external user-management layer; this module only
//! consumes it through the [`SessionStore`] seam.

use crate::auth::token::Principal;
use axum::http::HeaderMap;
use std::sync::Arc;

/// Session state supplied by the external user-management layer.
pub trait SessionStore: Send + Sync {
    /// The authenticated principal for this request, if any.
    fn current_principal(&self, headers: &HeaderMap) -> Option<Principal>;

    fn is_authenticated(&self, headers: &HeaderMap) -> bool {
        self.current_principal(headers).is_some()
    }
}

pub type SharedSessionStore = Arc<dyn SessionStore>;

/// Reads the principal from a header injected by the trusted front
/// (the user-management proxy terminates the session and forwards the user id).
#[derive(Debug, Clone)]
pub struct HeaderSession {
    header: String,
}

impl HeaderSession {
    #[must_use]
    pub fn new(header: String) -> Self {
        Self { header }
    }
}

impl SessionStore for HeaderSession {
    fn current_principal(&self, headers: &HeaderMap) -> Option<Principal> {
        let value = headers.get(&self.header)?.to_str().ok()?.trim();
        if value.is_empty() {
            return None;
        }

        Some(value.parse::<i64>().map_or_else(
            |_| Principal::Name(value.to_string()),
            Principal::Id,
        ))
    }
}

#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Escape hatch for test harnesses: skip the login check entirely.
    pub disabled: bool,
    pub login_url: String,
}

/// Outcome of the login gate for one request.
#[derive(Debug, PartialEq, Eq)]
pub enum Gate {
    Proceed(Principal),
    Redirect(String),
}

/// Decide whether a request may reach the protected operation.
pub fn check(config: &GateConfig, principal: Option<Principal>, current_url: &str) -> Gate {
    if config.disabled {
        return Gate::Proceed(principal.unwrap_or_else(|| Principal::Name("anonymous".to_string())));
    }

    match principal {
        Some(principal) => Gate::Proceed(principal),
        None => Gate::Redirect(login_url(&config.login_url, current_url)),
    }
}

/// Build `<login>?next=<current>` with a percent-encoded return URL.
#[must_use]
pub fn login_url(login: &str, next: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("next", next)
        .finish();

    let separator = if login.contains('?') { '&' } else { '?' };
    format!("{login}{separator}{query}")
}
