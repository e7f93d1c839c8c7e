//! Compact signed token codec.
//!
//! Tokens are JWS compact serializations (RFC 7515): unpadded base64url of a
//! fixed HS256 header, the claims document, and an HMAC-SHA256 signature over
//! `header.claims`, keyed with the consumer secret. The same secret is
//! configured on the annotation store that verifies tokens, so no key exchange
//! is involved; the secret is a high-value shared credential and its
//! distribution is an operational concern, not solved here.
//!
//! Encoding is deterministic: claims serialize in declaration order with no
//! random salt, so a fixed claims set always yields the same token string.

use anyhow::{anyhow, Result};
use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

// Fixed JOSE header, the codec only ever signs with HS256.
const HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

/// Why a token failed verification.
///
/// The variants are distinguished internally for logging and tests only.
/// Anything user-facing must surface [`TokenError::OPAQUE`] instead, so a
/// caller probing the verifier cannot learn which check rejected the token.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token")]
    MalformedToken,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("wrong consumer key")]
    WrongConsumer,
}

impl TokenError {
    /// Single outward-facing failure message shared by all variants.
    pub const OPAQUE: &'static str = "token verification failed";
}

/// Opaque user identifier owned by the external user store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Principal {
    Id(i64),
    Name(String),
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => write!(f, "{name}"),
        }
    }
}

impl From<i64> for Principal {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for Principal {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

/// Claims carried by an issued token.
///
/// Field order is the wire order; `issuedAt` is RFC 3339 UTC with seconds
/// precision and a `Z` suffix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub consumer_key: String,
    pub user_id: Principal,
    #[serde(with = "issued_at_format")]
    pub issued_at: DateTime<Utc>,
    pub ttl: i64,
}

mod issued_at_format {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        issued_at: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&issued_at.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let value = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// Serialize and sign a claims set with the consumer secret.
pub fn encode(claims: &Claims, secret: &str) -> Result<String> {
    let header = Base64UrlUnpadded::encode_string(HEADER.as_bytes());
    let payload = Base64UrlUnpadded::encode_string(&serde_json::to_vec(claims)?);
    let signing_input = format!("{header}.{payload}");

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|err| anyhow!("Invalid signing key: {err}"))?;
    mac.update(signing_input.as_bytes());
    let signature = Base64UrlUnpadded::encode_string(&mac.finalize().into_bytes());

    Ok(format!("{signing_input}.{signature}"))
}

/// Split a token, recompute its signature and return the claims.
///
/// The signature comparison is constant-time (`Mac::verify_slice`). The claims
/// document is only parsed after the signature checks out.
pub fn decode(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let mut parts = token.split('.');
    let (Some(header), Some(payload), Some(signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::MalformedToken);
    };

    let signature =
        Base64UrlUnpadded::decode_vec(signature).map_err(|_| TokenError::MalformedToken)?;

    let signed_len = header.len() + 1 + payload.len();
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| TokenError::InvalidSignature)?;
    mac.update(token[..signed_len].as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| TokenError::InvalidSignature)?;

    let payload =
        Base64UrlUnpadded::decode_vec(payload).map_err(|_| TokenError::MalformedToken)?;

    serde_json::from_slice(&payload).map_err(|_| TokenError::MalformedToken)
}
