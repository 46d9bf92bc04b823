//! Access token inspection
//!
//! Tokens are JWTs when the backend issues them; the `exp` claim is read
//! without verifying the signature. Tokens that are not JWTs, or carry no
//! `exp`, never expire on the client side.

use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

/// Expiry time from the token's `exp` claim
pub fn expires_at(token: &str) -> Option<DateTime<Utc>> {
    let mut parts = token.split('.');
    let (_header, payload, _signature) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claims: Value = serde_json::from_slice(&bytes).ok()?;
    let exp = claims.get("exp")?.as_i64()?;

    Utc.timestamp_opt(exp, 0).single()
}

/// Whether the token can still be sent
pub fn is_usable(token: &str, now: DateTime<Utc>) -> bool {
    if token.trim().is_empty() {
        return false;
    }
    match expires_at(token) {
        Some(exp) => exp > now,
        None => true,
    }
}

#[cfg(test)]
pub(crate) fn make_jwt(exp: i64) -> String {
    let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
    let header = engine.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = engine.encode(format!(r#"{{"sub":"u1","exp":{}}}"#, exp));
    format!("{}.{}.signature", header, payload)
}
