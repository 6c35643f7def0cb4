//! Advisory decoding of the bearer token payload.
//!
//! The token is a base64-encoded JSON object carrying the identity fields
//! and an expiry timestamp. Nothing here verifies a signature - the decoded
//! fields are a display hint only, and the backend remains the authority
//! for authorization on every request.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use jacaranda_core::{Email, UserId};

/// Decoded token payload.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    /// Expiry as epoch milliseconds.
    pub exp: i64,
}

/// Errors that can occur when decoding a token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token is not valid base64.
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The decoded payload is not the expected JSON shape.
    #[error("invalid payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// The embedded expiry has passed.
    #[error("token expired")]
    Expired,
}

/// Decode a token and validate its expiry against `now`.
///
/// # Errors
///
/// Returns an error if the token is malformed or expired.
pub fn decode(token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
    let bytes = BASE64.decode(token)?;
    let claims: TokenClaims = serde_json::from_slice(&bytes)?;

    if claims.exp <= now.timestamp_millis() {
        return Err(TokenError::Expired);
    }

    Ok(claims)
}
