//! Housekeeping for snapshot bases and order keys.
//!
//! Superseded snapshot bases are retired inside the snapshot transaction;
//! from then on they belong to this sweep, which purges them once the
//! retention window has passed. The sweep also retires duplicates left in
//! the template workspace that no template points at, and renumbers
//! collections whose keys have drifted.

use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use showcase_core::ordering::OrderedCollection;
use showcase_core::types::Timestamp;
use showcase_db::repositories::{BaseRepo, SpaceRepo};

use crate::config::CatalogConfig;
use crate::error::CatalogResult;
use crate::ordering::OrderingManager;

/// What a single maintenance pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MaintenanceReport {
    pub orphans_retired: u64,
    pub bases_purged: u64,
    pub templates_renumbered: Option<u64>,
    pub categories_renumbered: Option<u64>,
}

/// Run every maintenance step once.
pub async fn run_once(pool: &PgPool, config: &CatalogConfig) -> CatalogResult<MaintenanceReport> {
    let mut report = MaintenanceReport::default();

    match SpaceRepo::find_template_space(pool).await? {
        Some(workspace) => {
            let now = Utc::now();

            // Give any in-flight snapshot time to commit its pointer swap.
            match orphan_grace(config.big_transaction_timeout).and_then(|g| cutoff(now, g)) {
                Some(created_before) => {
                    report.orphans_retired =
                        BaseRepo::retire_orphaned(pool, workspace.id, created_before).await?;
                }
                None => tracing::warn!(
                    big_transaction_timeout = ?config.big_transaction_timeout,
                    "Orphan grace period out of range, skipping orphan sweep"
                ),
            }

            match cutoff(now, config.retired_base_retention) {
                Some(retired_before) => {
                    report.bases_purged =
                        BaseRepo::purge_retired(pool, workspace.id, retired_before).await?;
                }
                None => tracing::warn!(
                    retention_days = config.retired_base_retention.num_days(),
                    "Retention window out of range, skipping purge"
                ),
            }
        }
        None => {
            tracing::debug!("No template workspace, skipping snapshot base sweep");
        }
    }

    let ordering = OrderingManager::new(pool.clone(), config.transaction_timeout);
    report.templates_renumbered = ordering
        .renumber_if_drifted(OrderedCollection::Templates)
        .await?;
    report.categories_renumbered = ordering
        .renumber_if_drifted(OrderedCollection::TemplateCategories)
        .await?;

    if report != MaintenanceReport::default() {
        tracing::info!(
            orphans_retired = report.orphans_retired,
            bases_purged = report.bases_purged,
            templates_renumbered = ?report.templates_renumbered,
            categories_renumbered = ?report.categories_renumbered,
            "Maintenance pass changed rows"
        );
    }
    Ok(report)
}

/// Twice the snapshot transaction bound, or `None` if that overflows.
fn orphan_grace(big_transaction_timeout: Duration) -> Option<chrono::Duration> {
    big_transaction_timeout
        .checked_mul(2)
        .and_then(|grace| chrono::Duration::from_std(grace).ok())
}

/// `now - age`, or `None` when the result is not a representable timestamp.
fn cutoff(now: Timestamp, age: chrono::Duration) -> Option<Timestamp> {
    now.checked_sub_signed(age)
}
