//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML/JSON)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → routes ordered most-specific first
//!     → BalancerConfig (validated, immutable)
//!     → handed to the dispatch engine at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AdminConfig, Algorithm, BalancerConfig, CompactConfig, CompactHealthCheck, HealthCheckConfig,
    ListenerConfig,
    ObservabilityConfig, RouteConfig, ServerConfig, SessionConfig, TimeoutConfig,
};
