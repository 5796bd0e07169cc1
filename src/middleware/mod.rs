//! Middleware for observability.
//!
//! Access control lives with the auth module; this module only provides
//! request logging with latency tracking.

pub mod logging;

pub use logging::request_logging_simple;
