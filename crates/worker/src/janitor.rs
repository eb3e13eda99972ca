//! Periodic snapshot base and order key maintenance.
//!
//! Runs [`showcase_catalog::maintenance::run_once`] on a fixed interval
//! using `tokio::time::interval`. A failed pass is logged and retried on
//! the next tick.

use std::time::Duration;

use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use showcase_catalog::config::CatalogConfig;
use showcase_catalog::maintenance;

/// Run the maintenance loop until `cancel` is triggered.
pub async fn run(pool: PgPool, config: CatalogConfig, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = config.maintenance_interval.as_secs(),
        retention_days = config.retired_base_retention.num_days(),
        "Catalog maintenance job started"
    );

    let mut interval = tokio::time::interval(tick_period(&config));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Catalog maintenance job stopping");
                break;
            }
            _ = interval.tick() => {
                match maintenance::run_once(&pool, &config).await {
                    Ok(report) => {
                        tracing::debug!(?report, "Catalog maintenance pass finished");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, code = e.code(), "Catalog maintenance pass failed");
                    }
                }
            }
        }
    }
}

/// `tokio::time::interval` rejects a zero period.
fn tick_period(config: &CatalogConfig) -> Duration {
    if config.maintenance_interval.is_zero() {
        let fallback = CatalogConfig::default().maintenance_interval;
        tracing::warn!(
            fallback_secs = fallback.as_secs(),
            "Zero maintenance interval, using default"
        );
        fallback
    } else {
        config.maintenance_interval
    }
}
