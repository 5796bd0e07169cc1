//! Hospital Records - REST backend
//! Mission: Serve user records behind token authentication and RBAC

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hospital_records::{
    api::{create_router, AppState},
    auth::{SqliteUserStore, TokenService},
    config::{AppConfig, Args},
    users::UserDirectory,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment and logging
    load_env();
    init_tracing();

    let config = AppConfig::from_args(Args::parse()).context("Invalid configuration")?;

    info!("🚀 Hospital records backend starting");
    info!("⚙️  {:?}", config);

    let store = SqliteUserStore::new(&config.database_path)
        .with_context(|| format!("Failed to open user store at {}", config.database_path))?;
    let directory = Arc::new(UserDirectory::new(Arc::new(store)));
    directory
        .ensure_admin(config.bootstrap_admin_password.as_deref())
        .context("Failed to provision bootstrap admin")?;

    let tokens = Arc::new(TokenService::new(config.jwt_secret.as_bytes(), config.token_ttl));
    info!("🔐 Token service ready ({}s validity)", tokens.validity_secs());

    let app = create_router(AppState { directory, tokens });

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("🎯 API server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn load_env() {
    // 1) Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // 2) Also try the crate directory (when running with --manifest-path from elsewhere)
    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(manifest_env);
    }
}

/// Initialize tracing with env-configurable filtering
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hospital_records=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
