use std::process::ExitCode;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use showcase_catalog::config::CatalogConfig;
use showcase_worker::janitor;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "showcase_worker=debug,showcase_catalog=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = CatalogConfig::from_env();
    tracing::info!(?config, "Loaded catalog configuration");

    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        tracing::error!("DATABASE_URL must be set");
        return ExitCode::FAILURE;
    };

    // --- Database ---
    let pool = match showcase_db::create_pool(&database_url, config.max_connections).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("Database connection pool created");

    if let Err(e) = showcase_db::health_check(&pool).await {
        tracing::error!(error = %e, "Database health check failed");
        return ExitCode::FAILURE;
    }

    if let Err(e) = showcase_db::run_migrations(&pool).await {
        tracing::error!(error = %e, "Failed to run database migrations");
        return ExitCode::FAILURE;
    }
    tracing::info!("Database migrations applied");

    // --- Maintenance loop ---
    let cancel = CancellationToken::new();
    let job = tokio::spawn(janitor::run(pool.clone(), config, cancel.clone()));

    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received SIGINT (Ctrl-C), stopping worker"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl-C, stopping worker"),
    }

    cancel.cancel();
    if let Err(e) = job.await {
        tracing::error!(error = %e, "Maintenance task panicked");
    }
    pool.close().await;

    tracing::info!("Worker shut down");
    ExitCode::SUCCESS
}
