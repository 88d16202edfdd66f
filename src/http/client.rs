//! Outbound HTTP client shared by the health monitor and the forwarder.

use axum::body::Body;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::time::Duration;

/// Plain-HTTP client toward backends.
pub type HttpClient = Client<HttpConnector, Body>;

/// Build a client whose TCP connect is bounded by `connect_timeout`.
pub fn build_client(connect_timeout: Duration) -> HttpClient {
    let mut connector = HttpConnector::new();
    connector.set_connect_timeout(Some(connect_timeout));
    connector.set_nodelay(true);

    Client::builder(TokioExecutor::new()).build(connector)
}
