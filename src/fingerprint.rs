//! Weak pseudo-identity for like bookkeeping.
//!
//! A fingerprint is a 32-bit rolling hash of the client IP and user agent.
//! Anyone can forge one by setting headers, and unrelated clients can collide.
//! It is not authentication.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use std::convert::Infallible;

/// Client IP as reported by the proxy: first `x-forwarded-for` hop, then
/// `x-real-ip`, then `"unknown"`.
pub fn client_ip(headers: &HeaderMap) -> &str {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .and_then(|v| v.split(',').next());

    forwarded
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
        })
        .unwrap_or("unknown")
}

/// Fingerprint for an IP and user agent, formatted as `user_<n>`.
pub fn fingerprint(ip: &str, user_agent: &str) -> String {
    let source = format!("{ip}-{user_agent}");

    // hash * 31 + unit over UTF-16 code units, wrapping at 32 bits
    let hash = source.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    });

    format!("user_{}", hash.unsigned_abs())
}

pub fn fingerprint_from_headers(headers: &HeaderMap) -> String {
    let user_agent = headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    fingerprint(client_ip(headers), user_agent)
}

/// Extractor yielding the caller's fingerprint.
pub struct ClientFingerprint(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for ClientFingerprint
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Infallible> {
        Ok(ClientFingerprint(fingerprint_from_headers(&parts.headers)))
    }
}
