//! Cookie header helpers for the affinity token.

use axum::http::{header, header::InvalidHeaderValue, HeaderMap, HeaderValue};
use std::time::Duration;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "lb-session-id";

/// Value of the cookie called `name`, searching every `Cookie` header.
pub fn find_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value binding the client to `session_id`.
pub fn session_cookie(session_id: &str, max_age: Duration) -> Result<HeaderValue, InvalidHeaderValue> {
    let cookie = format!(
        "{}={}; Path=/; HttpOnly; Max-Age={}",
        SESSION_COOKIE,
        session_id,
        max_age.as_secs()
    );
    HeaderValue::from_str(&cookie)
}
