//! Session tokens — HS256 JWTs carrying the signed-in Google identity.
//!
//! Replaces a server-side session store: the cookie itself holds the signed
//! claims, validated on every request.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ApiError, ApiResult};

/// Session lifetime: 7 days.
const SESSION_EXPIRY_SECS: i64 = 7 * 24 * 60 * 60;

/// Claims held by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Google `sub` — the owner identity every contract is scoped to.
    pub sub: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

/// Mint a signed session token for a signed-in Google user.
pub fn generate_session_token(
    google_id: &str,
    name: Option<&str>,
    email: Option<&str>,
    secret: &[u8],
) -> ApiResult<String> {
    let now = Utc::now();
    let claims = SessionClaims {
        sub: google_id.to_string(),
        name: name.map(str::to_string),
        email: email.map(str::to_string),
        exp: (now + Duration::seconds(SESSION_EXPIRY_SECS)).timestamp(),
        iat: now.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| ApiError::Internal(format!("jwt encode: {e}")))
}

/// Verify a session token, returning the claims on success.
pub fn verify_session_token(token: &str, secret: &[u8]) -> Option<SessionClaims> {
    let key = DecodingKey::from_secret(secret);
    let mut validation = Validation::default();
    validation.validate_exp = true;
    decode::<SessionClaims>(token, &key, &validation)
        .ok()
        .map(|data| data.claims)
}

/// Resolve the session secret: env var `SESSION_SECRET`, else a random
/// per-process secret (sessions then survive only until restart).
pub fn resolve_session_secret() -> String {
    if let Ok(secret) = std::env::var("SESSION_SECRET")
        && !secret.is_empty()
    {
        return secret;
    }
    warn!("SESSION_SECRET not set, generating a per-process secret");
    rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}
