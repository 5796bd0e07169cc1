//! Authentication Module
//! Mission: Password credentials, bearer tokens and per-route access control

pub mod api;
pub mod credentials;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod policy;
pub mod user_store;

pub use jwt::{TokenError, TokenService};
pub use models::{Identity, UserRole};
pub use policy::{AccessError, AccessPolicy};
pub use user_store::{SqliteUserStore, UserStore};
