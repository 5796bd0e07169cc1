//! Hospital Records Backend Library
//!
//! Authentication, role-based access control and user management for the
//! hospital records REST API. Exposed as a library for the binary and tests.

pub mod api;
pub mod auth;
pub mod config;
pub mod middleware;
pub mod users;
