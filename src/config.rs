//! Process configuration
//!
//! Read once at startup from flags / environment (after `.env` loading) and
//! immutable afterwards. The signing secret is handed to the token service
//! at construction and is not reachable from anywhere else.

use anyhow::{bail, Result};
use clap::Parser;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

pub const MIN_SECRET_LEN: usize = 32;

#[derive(Parser, Clone)]
#[command(name = "hospital-records")]
#[command(about = "Hospital records REST backend - users, authentication and access control")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:3000")]
    pub bind_addr: SocketAddr,

    /// SQLite database file holding user records
    #[arg(long, env = "DATABASE_PATH", default_value = "hospital_records.db")]
    pub database_path: String,

    /// Token signing secret (at least 32 bytes)
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Token validity in hours
    #[arg(long, env = "TOKEN_TTL_HOURS", default_value_t = 24)]
    pub token_ttl_hours: u64,

    /// Password for the `admin` user created when no admin exists
    #[arg(long, env = "BOOTSTRAP_ADMIN_PASSWORD", hide_env_values = true)]
    pub bootstrap_admin_password: Option<String>,
}

/// Validated application configuration
#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_path: String,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub bootstrap_admin_password: Option<String>,
}

impl AppConfig {
    pub fn from_args(args: Args) -> Result<Self> {
        if args.jwt_secret.len() < MIN_SECRET_LEN {
            bail!("JWT_SECRET must be at least {} bytes long", MIN_SECRET_LEN);
        }
        if args.token_ttl_hours == 0 {
            bail!("TOKEN_TTL_HOURS must be positive");
        }

        Ok(Self {
            bind_addr: args.bind_addr,
            database_path: args.database_path,
            jwt_secret: args.jwt_secret,
            token_ttl: Duration::from_secs(args.token_ttl_hours * 3600),
            bootstrap_admin_password: args.bootstrap_admin_password.filter(|p| !p.is_empty()),
        })
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("database_path", &self.database_path)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field(
                "bootstrap_admin_password",
                &self.bootstrap_admin_password.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}
