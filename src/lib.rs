//! # annotate-auth
//!
//! Authentication front-end for the Annotator ecosystem. Account management
//! (registration, login, password reset) lives in an external user-management
//! layer; this service covers the pieces around it:
//!
//! - minting signed JSON Web Tokens (`GET /user/token`) bound to a consumer
//!   key, user id, issue time and TTL, signed with a shared consumer secret,
//! - an AJAX-aware login gate that answers unauthenticated callers with a
//!   machine-readable `{"redirect": ...}` payload instead of an HTTP 302,
//! - serving the single-page-app bundle.
//!
//! Tokens are stateless bearer credentials: the downstream annotation store
//! verifies them offline with the same shared secret, so there is no token
//! registry and no revocation. Rotating the secret invalidates every
//! outstanding token.

pub mod auth;
pub mod cli;
