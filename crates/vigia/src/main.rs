//! # vigia
//!
//! Vigia server binary — wires settings, store, and HTTP layer together and
//! starts the server.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use vigia_server::config::ServerConfig;
use vigia_server::server::VigiaServer;
use vigia_store::{new_file, seed_baseline, ConnectionConfig, FleetStore};

/// Vigia vehicle-tracking server.
#[derive(Parser, Debug)]
#[command(name = "vigia", about = "Vigia vehicle-tracking server")]
struct Cli {
    /// Host to bind (overrides settings if specified).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides settings if specified).
    #[arg(long)]
    port: Option<u16>,

    /// Path to the `SQLite` database file (overrides settings if specified).
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Skip inserting the baseline dataset into empty tables.
    #[arg(long)]
    no_seed: bool,
}

fn ensure_parent_dir(path: &std::path::Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let settings = vigia_settings::get_settings();

    // RUST_LOG wins over the settings filter when set.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.logging.filter.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let db_path = args
        .db_path
        .unwrap_or_else(|| PathBuf::from(&settings.database.path));
    ensure_parent_dir(&db_path)?;

    let pool = new_file(
        &db_path.to_string_lossy(),
        &ConnectionConfig {
            pool_size: settings.database.pool_size,
            busy_timeout_ms: u32::try_from(settings.database.busy_timeout_ms).unwrap_or(5_000),
        },
    )
    .context("Failed to open database")?;
    {
        let conn = pool.get().context("Failed to get DB connection")?;
        let applied =
            vigia_store::run_migrations(&conn).context("Failed to run migrations")?;
        tracing::info!(applied, db_path = %db_path.display(), "database ready");
    }

    let store = Arc::new(FleetStore::new(pool));

    if args.no_seed || !settings.database.seed_on_start {
        tracing::info!("baseline seeding skipped");
    } else {
        seed_baseline(&store).context("Failed to seed baseline data")?;
        tracing::info!("baseline data seeded");
    }

    let config = ServerConfig {
        host: args.host.unwrap_or_else(|| settings.server.host.clone()),
        port: args.port.unwrap_or(settings.server.port),
    };
    let server = VigiaServer::new(config.clone(), store);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .context("Failed to bind server")?;
    let addr = listener.local_addr().context("Failed to read bound address")?;
    tracing::info!("Vigia listening on http://{addr}");

    axum::serve(listener, server.router())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl-c");
    } else {
        tracing::info!("Shutting down...");
    }
}
