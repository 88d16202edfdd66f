//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, favicon short-circuit)
//!     → request.rs (request ID, forwarded headers)
//!     → dispatch engine (route, health, affinity, selector, forward)
//!     → response.rs (JSON envelope, affinity cookie)
//!     → Send to client
//! ```

pub mod client;
pub mod request;
pub mod response;
pub mod server;

pub use client::{build_client, HttpClient};
pub use request::X_REQUEST_ID;
pub use response::Envelope;
pub use server::{AppState, HttpServer};
