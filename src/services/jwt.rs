//! Bearer token freshness check.
//!
//! The signature is not verified here; the server does that. This only tells
//! the client whether a token is worth sending.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;

/// True when the token's `exp` claim is in the past, using the system clock.
pub fn is_jwt_expired(token: &str) -> bool {
    is_jwt_expired_at(token, Utc::now().timestamp_millis())
}

/// True when `exp * 1000 < now_ms`. Any token that cannot be decoded counts
/// as expired.
pub fn is_jwt_expired_at(token: &str, now_ms: i64) -> bool {
    match expiry_seconds(token) {
        Some(exp) => exp * 1000.0 < now_ms as f64,
        None => true,
    }
}

/// `exp` from a `header.payload.signature` token; `None` unless there are
/// exactly three non-empty segments and the payload carries a numeric `exp`.
fn expiry_seconds(token: &str) -> Option<f64> {
    let mut segments = token.split('.');
    let header = segments.next()?;
    let payload = segments.next()?;
    let signature = segments.next()?;
    if segments.next().is_some() || header.is_empty() || signature.is_empty() {
        return None;
    }

    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    claims.get("exp")?.as_f64()
}
