//! HTTP load balancer library.
//!
//! Routes each inbound request to one healthy backend chosen by path,
//! session affinity and a pluggable selection algorithm, and wraps the
//! backend's reply in a JSON envelope.

// Core subsystems
pub mod config;
pub mod dispatch;
pub mod http;
pub mod routing;

// Traffic management
pub mod affinity;
pub mod health;
pub mod load_balancer;

// Cross-cutting concerns
pub mod admin;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::schema::BalancerConfig;
pub use dispatch::DispatchEngine;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
