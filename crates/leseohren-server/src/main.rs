//! Leseohren server: loads configuration, connects to SurrealDB, applies
//! migrations and hosts the registry services until shutdown.

use std::process::ExitCode;

use chrono::Local;
use leseohren_db::DbManager;
use leseohren_server::app::Registry;
use leseohren_server::config::ServerConfig;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("leseohren=info"));
    tracing_subscriber::fmt().with_env_filter(filter).json().init();

    info!("Starting Leseohren server...");

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let db = match DbManager::connect(&config.database).await {
        Ok(db) => db,
        Err(e) => {
            error!(error = %e, "Could not connect to SurrealDB");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = leseohren_db::run_migrations(db.client()).await {
        error!(error = %e, "Migrations failed");
        return ExitCode::FAILURE;
    }

    let registry = Registry::new(db.client(), &config.registry);
    match registry.startup_summary(Local::now().date_naive()).await {
        Ok(summary) => info!(
            categories = summary.categories,
            volunteer_candidates = summary.volunteer_candidates,
            upcoming_events = summary.upcoming_events,
            storage_root = %config.registry.storage_root.display(),
            "Registry services ready"
        ),
        Err(e) => {
            error!(error = %e, "Registry startup check failed");
            return ExitCode::FAILURE;
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }

    info!("Leseohren server stopped.");
    ExitCode::SUCCESS
}
