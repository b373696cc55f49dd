//! Utility modules for common functionality.
//!
//! - http: Retryable HTTP client construction
//! - logging: Logging setup and the shared error context
//! - metrics: Prometheus registry and metrics server
//! - parsing: Parsing and shape validation helpers
//! - tests: Builders for tests

pub mod http;
pub mod logging;
pub mod metrics;
pub mod parsing;
pub mod tests;

pub use http::*;
pub use parsing::*;
