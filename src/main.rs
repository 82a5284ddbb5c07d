use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use inventory_api::app::{app, AppState};
use inventory_api::auth::{PasswordHasher, TokenService};
use inventory_api::config::AppConfig;
use inventory_api::database::{DatabaseManager, PgStore};

const DEFAULT_LOG_FILTER: &str = "info,inventory_api=debug,tower_http=info";

#[derive(Parser, Debug)]
#[command(name = "inventory-api", version, about = "Inventory catalog REST API")]
struct Cli {
    /// Load variables from this dotenv file instead of ./.env
    #[arg(long, value_name = "PATH")]
    env_file: Option<PathBuf>,

    /// Listen port (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Create missing tables before serving
    #[arg(long)]
    init_schema: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A missing .env is fine; a missing explicit --env-file is not.
    match &cli.env_file {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
        }
        None => {
            let _ = dotenvy::dotenv();
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let port_override = cli.port.map(|p| p.to_string());
    let mut config = AppConfig::from_source(&|key: &str| match key {
        "PORT" if port_override.is_some() => port_override.clone(),
        _ => std::env::var(key).ok(),
    })
    .context("invalid configuration")?;
    if cli.init_schema {
        config.database.init_schema = true;
    }

    tracing::info!(
        "Starting Inventory API in {:?} mode (database {})",
        config.environment,
        config.redacted_database_url()
    );

    let database = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    if config.database.init_schema {
        database
            .init_schema()
            .await
            .context("failed to initialize schema")?;
    }

    let store = Arc::new(PgStore::new(database.pool()));
    let hasher = PasswordHasher::new(config.security.bcrypt_cost)
        .context("invalid bcrypt cost")?;
    let state = AppState::new(
        store.clone(),
        store,
        TokenService::from_config(&config.security),
        hasher,
    );

    let router = app(state, &config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Inventory API listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    database.close().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let term = async {
        if let Ok(mut s) = signal::unix::signal(signal::unix::SignalKind::terminate()) {
            s.recv().await;
        }
    };
    #[cfg(not(unix))]
    let term = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl-C, shutting down"),
        _ = term => tracing::info!("Received SIGTERM, shutting down"),
    }
}
