//! User management: directory rules and `/users` endpoints

pub mod api;
pub mod directory;

pub use directory::{DirectoryError, UserDirectory};
