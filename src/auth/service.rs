//! Token issuance and verification against a fixed issuer identity.

use crate::auth::{
    clock::Clock,
    token::{self, Claims, Principal, TokenError},
};
use anyhow::Result;
use chrono::Duration;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;

/// Issuer identity shared with the verifying annotation store.
///
/// Built once at startup from CLI/env and never mutated afterwards. Rotating
/// the secret invalidates every token issued before the rotation.
#[derive(Debug, Clone)]
pub struct IssuerConfig {
    pub consumer_key: String,
    pub consumer_secret: SecretString,
    /// Token lifetime in seconds, always positive (enforced by the CLI).
    pub ttl: i64,
}

/// Issues and verifies bearer tokens for a single consumer identity.
///
/// Stateless apart from the injected clock: no token registry, no revocation,
/// safe to share across request handlers without locking.
pub struct TokenService {
    config: IssuerConfig,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(config: IssuerConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    /// Mint a signed token for `user`, bound to the configured consumer key
    /// and stamped with the current truncated UTC time.
    pub fn issue(&self, user: Principal) -> Result<String> {
        let claims = Claims {
            consumer_key: self.config.consumer_key.clone(),
            user_id: user,
            issued_at: self.clock.now(),
            ttl: self.config.ttl,
        };

        token::encode(&claims, self.config.consumer_secret.expose_secret())
    }

    /// Check a bearer token and return the principal it was issued to.
    ///
    /// Issued tokens are verified by the downstream annotation store rather
    /// than by this service; the operation exists so the codec contract is
    /// exercised from both directions.
    pub fn verify(&self, token: &str) -> Result<Principal, TokenError> {
        let claims = token::decode(token, self.config.consumer_secret.expose_secret())?;

        if claims.consumer_key != self.config.consumer_key {
            return Err(TokenError::WrongConsumer);
        }

        // A token is still accepted at exactly issuedAt + ttl. A ttl that
        // does not fit the timeline is rejected outright.
        let expires_at = Duration::try_seconds(claims.ttl)
            .and_then(|ttl| claims.issued_at.checked_add_signed(ttl))
            .ok_or(TokenError::MalformedToken)?;
        if self.clock.now() > expires_at {
            return Err(TokenError::Expired);
        }

        Ok(claims.user_id)
    }
}
