//! Response handling and transformation.
//!
//! # Responsibilities
//! - Wrap backend replies in the client-facing JSON envelope
//! - Map dispatch failures to 503 / 500 envelopes
//! - Attach the affinity cookie when a session was created
//!
//! # Design Decisions
//! - Backend bodies are embedded as JSON when they parse, as a string otherwise
//! - The serving backend's url is always named in successful replies

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::dispatch::{BackendReply, Dispatched, Outcome};

const UNAVAILABLE_ERROR: &str = "All servers are unavailable";
const UNAVAILABLE_MESSAGE: &str = "Please try again later";

/// Client-facing envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Envelope {
    Success {
        success: bool,
        data: Value,
        server: String,
    },
    Unavailable {
        success: bool,
        error: String,
        message: String,
    },
    Error {
        success: bool,
        error: String,
    },
}

impl Envelope {
    pub fn success(data: Value, server: impl Into<String>) -> Self {
        Envelope::Success {
            success: true,
            data,
            server: server.into(),
        }
    }

    pub fn unavailable() -> Self {
        Envelope::Unavailable {
            success: false,
            error: UNAVAILABLE_ERROR.to_string(),
            message: UNAVAILABLE_MESSAGE.to_string(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Envelope::Error {
            success: false,
            error: message.into(),
        }
    }
}

/// Interpret a backend body: JSON if it parses, text otherwise.
pub fn body_value(reply: &BackendReply) -> Value {
    serde_json::from_slice(&reply.body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&reply.body).into_owned()))
}

impl IntoResponse for Dispatched {
    fn into_response(self) -> Response {
        let (status, envelope) = match self.outcome {
            Outcome::Served { backend, reply } => {
                (reply.status, Envelope::success(body_value(&reply), backend.url.clone()))
            }
            Outcome::Unavailable => (StatusCode::SERVICE_UNAVAILABLE, Envelope::unavailable()),
            Outcome::Failed { error, .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, Envelope::error(error.to_string()))
            }
        };

        let mut response = (status, Json(envelope)).into_response();
        if let Some(cookie) = self.set_cookie {
            response.headers_mut().insert(header::SET_COOKIE, cookie);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{DispatchError, ForwardError};
    use crate::load_balancer::Backend;
    use axum::body::Bytes;
    use axum::http::{HeaderMap, HeaderValue};
    use std::sync::Arc;

    fn reply(status: StatusCode, body: &'static str) -> BackendReply {
        BackendReply {
            status,
            headers: HeaderMap::new(),
            body: Bytes::from_static(body.as_bytes()),
        }
    }

    async fn json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_body_value() {
        assert_eq!(body_value(&reply(StatusCode::OK, r#"{"id":1}"#)), serde_json::json!({"id": 1}));
        assert_eq!(body_value(&reply(StatusCode::OK, "Response from Server 1")), "Response from Server 1");
        assert_eq!(body_value(&reply(StatusCode::OK, "")), "");
    }

    #[tokio::test]
    async fn test_served_envelope() {
        let backend = Arc::new(Backend::new("http://127.0.0.1:3001", 1).unwrap());
        let response = Dispatched {
            outcome: Outcome::Served {
                backend,
                reply: reply(StatusCode::CREATED, r#"{"ok":true}"#),
            },
            set_cookie: Some(HeaderValue::from_static("lb-session-id=ab; Path=/; HttpOnly; Max-Age=86400")),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(response.headers().get(header::SET_COOKIE).is_some());
        assert_eq!(
            json(response).await,
            serde_json::json!({
                "success": true,
                "data": {"ok": true},
                "server": "http://127.0.0.1:3001"
            })
        );
    }

    #[tokio::test]
    async fn test_unavailable_envelope() {
        let response = Dispatched {
            outcome: Outcome::Unavailable,
            set_cookie: None,
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            json(response).await,
            serde_json::json!({
                "success": false,
                "error": "All servers are unavailable",
                "message": "Please try again later"
            })
        );
    }

    #[tokio::test]
    async fn test_failed_envelope() {
        let response = Dispatched {
            outcome: Outcome::Failed {
                backend: None,
                error: DispatchError::Forward(ForwardError::Status(StatusCode::NOT_FOUND)),
            },
            set_cookie: None,
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "backend responded with status 404 Not Found");
    }
}
