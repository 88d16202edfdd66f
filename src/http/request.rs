//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request IDs (UUID v4) and echo them on responses
//! - Prepare inbound headers for forwarding to a backend
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Hop-by-hop headers and `Host` never reach the backend
//! - Client address appended to `X-Forwarded-For`

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};
use std::net::SocketAddr;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_FORWARDED_HOST: &str = "x-forwarded-host";

/// Headers that describe a single connection and must not be forwarded.
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
    HeaderName::from_static("keep-alive"),
];

/// Layer assigning a fresh `x-request-id` to requests without one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID), MakeRequestUuid)
}

/// Layer copying the request's `x-request-id` onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID))
}

/// The request ID of an inbound request, or "unknown".
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Build the header set sent upstream from the client's headers.
pub fn forward_headers(inbound: &HeaderMap, client: Option<SocketAddr>) -> HeaderMap {
    let mut headers = inbound.clone();

    // Connection-specific headers named in `Connection` go too.
    let listed: Vec<HeaderName> = inbound
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();
    for name in HOP_BY_HOP.iter().chain(listed.iter()) {
        headers.remove(name);
    }

    // The client sets these from the target and the buffered body.
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);

    if let Some(host) = inbound.get(header::HOST) {
        headers.insert(X_FORWARDED_HOST, host.clone());
    }

    if let Some(addr) = client {
        let forwarded_for = match inbound.get(X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
            Some(existing) => format!("{}, {}", existing, addr.ip()),
            None => addr.ip().to_string(),
        };
        if let Ok(value) = HeaderValue::from_str(&forwarded_for) {
            headers.insert(X_FORWARDED_FOR, value);
        }
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inbound() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("balancer.local:4000"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive, x-debug"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert("x-debug", HeaderValue::from_static("1"));
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("12"));
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("req-1"));
        headers
    }

    #[test]
    fn test_strips_hop_by_hop_and_host() {
        let headers = forward_headers(&inbound(), None);
        assert!(headers.get(header::HOST).is_none());
        assert!(headers.get(header::CONNECTION).is_none());
        assert!(headers.get("keep-alive").is_none());
        assert!(headers.get("x-debug").is_none());
        assert!(headers.get(header::CONTENT_LENGTH).is_none());
        assert_eq!(headers.get(header::ACCEPT).unwrap(), "application/json");
        assert_eq!(headers.get(X_REQUEST_ID).unwrap(), "req-1");
        assert_eq!(headers.get(X_FORWARDED_HOST).unwrap(), "balancer.local:4000");
    }

    #[test]
    fn test_forwarded_for_appends() {
        let client: SocketAddr = "10.0.0.7:55000".parse().unwrap();

        let headers = forward_headers(&inbound(), Some(client));
        assert_eq!(headers.get(X_FORWARDED_FOR).unwrap(), "10.0.0.7");

        let mut proxied = inbound();
        proxied.insert(X_FORWARDED_FOR, HeaderValue::from_static("203.0.113.9"));
        let headers = forward_headers(&proxied, Some(client));
        assert_eq!(headers.get(X_FORWARDED_FOR).unwrap(), "203.0.113.9, 10.0.0.7");
    }

    #[test]
    fn test_request_id_fallback() {
        assert_eq!(request_id(&inbound()), "req-1");
        assert_eq!(request_id(&HeaderMap::new()), "unknown");
    }
}
