//! Single-attempt request forwarding.
//!
//! # Responsibilities
//! - Send one request to one backend under a deadline
//! - Buffer the backend's reply
//! - Classify failures (timeout, connection, status, body)
//!
//! # Design Decisions
//! - No retries and no fallback backend
//! - Non-2xx replies are failures, the body is discarded
//! - The deadline covers connect, response head and body

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use std::time::Duration;
use thiserror::Error;

use crate::http::client::{build_client, HttpClient};
use crate::load_balancer::Backend;
use crate::resilience::with_timeout;

/// Largest backend body buffered into the response envelope.
const MAX_REPLY_BYTES: usize = 16 * 1024 * 1024;

/// Why a forward attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForwardError {
    #[error("invalid upstream target {0}")]
    InvalidTarget(String),

    #[error("connection to backend failed: {0}")]
    Connect(String),

    #[error("backend timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("backend responded with status {0}")]
    Status(StatusCode),

    #[error("failed to read backend response: {0}")]
    Body(String),
}

/// A successful backend reply.
#[derive(Debug, Clone)]
pub struct BackendReply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Sends requests to backends.
#[derive(Clone)]
pub struct Forwarder {
    client: HttpClient,
    timeout: Duration,
}

impl Forwarder {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Forward to `backend` at `path_and_query`.
    pub async fn forward(
        &self,
        backend: &Backend,
        method: Method,
        headers: HeaderMap,
        path_and_query: &str,
        body: Bytes,
    ) -> Result<BackendReply, ForwardError> {
        let target = backend.target(path_and_query);
        let mut builder = Request::builder().method(method).uri(target.as_str());
        if let Some(request_headers) = builder.headers_mut() {
            request_headers.extend(headers);
        }
        let request = builder
            .body(Body::from(body))
            .map_err(|_| ForwardError::InvalidTarget(target.clone()))?;

        with_timeout(self.timeout, self.send(request))
            .await
            .map_err(|elapsed| ForwardError::Timeout(elapsed.0))?
    }

    async fn send(&self, request: Request<Body>) -> Result<BackendReply, ForwardError> {
        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| ForwardError::Connect(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ForwardError::Status(status));
        }

        let (parts, body) = response.into_parts();
        let body = axum::body::to_bytes(Body::new(body), MAX_REPLY_BYTES)
            .await
            .map_err(|e| ForwardError::Body(e.to_string()))?;

        Ok(BackendReply {
            status,
            headers: parts.headers,
            body,
        })
    }
}
