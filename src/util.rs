//! Shared utility functions for the license server.

use axum::http::HeaderMap;
use chrono::{DateTime, NaiveDateTime, Utc};

pub const SECONDS_PER_DAY: i64 = 86400;

/// Header carrying the shared admin secret.
pub const ADMIN_KEY_HEADER: &str = "X-Admin-Key";

/// Legacy text format used by older issuer tools.
const LEGACY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn now() -> i64 {
    Utc::now().timestamp()
}

/// Parse a textual timestamp into unix seconds.
///
/// Accepts RFC 3339 (`2030-01-01T00:00:00Z`) and `YYYY-MM-DD HH:MM:SS`,
/// the latter taken as UTC.
pub fn parse_timestamp(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp());
    }
    NaiveDateTime::parse_from_str(text, LEGACY_TIMESTAMP_FORMAT)
        .ok()
        .map(|dt| dt.and_utc().timestamp())
}

/// Extract a Bearer token from the Authorization header.
///
/// Returns the token string without the "Bearer " prefix, or None if
/// the header is missing, malformed, or empty after the prefix.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

/// Extract the admin credential, preferring `X-Admin-Key` over a Bearer token.
pub fn extract_admin_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(ADMIN_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .or_else(|| extract_bearer_token(headers))
}
