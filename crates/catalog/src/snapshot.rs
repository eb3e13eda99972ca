//! Snapshot lifecycle: duplicate the live source, swap the pointer, retire
//! the superseded duplicate.
//!
//! All three steps share one transaction. If any of them fails, or the
//! configured timeout elapses, the transaction is dropped uncommitted and
//! the template, the previous base and the new duplicate are exactly as they
//! were before the call.

use std::sync::Arc;
use std::time::Duration;

use sqlx::{PgConnection, PgPool};
use showcase_core::error::CoreError;
use showcase_core::snapshot::{self, Snapshot};
use showcase_core::types::{DbId, Timestamp};
use showcase_db::models::template::{Template, UpdateTemplate};
use showcase_db::repositories::{BaseRepo, SpaceRepo, TemplateRepo};

use crate::collaborators::{BaseDuplicator, DuplicateBaseRequest};
use crate::error::{bounded, CatalogError, CatalogResult};

/// Orchestrates snapshot creation and guards publishing.
#[derive(Clone)]
pub struct SnapshotManager {
    pool: PgPool,
    duplicator: Arc<dyn BaseDuplicator>,
    timeout: Duration,
}

impl SnapshotManager {
    /// `timeout` bounds the whole snapshot transaction, duplication included.
    pub fn new(pool: PgPool, duplicator: Arc<dyn BaseDuplicator>, timeout: Duration) -> Self {
        Self {
            pool,
            duplicator,
            timeout,
        }
    }

    /// Replace the template's snapshot with a fresh duplicate of its source
    /// base, retiring the previous duplicate.
    #[tracing::instrument(skip(self))]
    pub async fn create_snapshot(&self, template_id: DbId) -> CatalogResult<Template> {
        let result = bounded(self.timeout, self.create_snapshot_in_tx(template_id)).await;
        if let Err(err) = &result {
            tracing::warn!(template_id, error = %err, "Snapshot rolled back");
        }
        result
    }

    async fn create_snapshot_in_tx(&self, template_id: DbId) -> CatalogResult<Template> {
        let mut tx = self.pool.begin().await?;

        // Re-read inside the transaction; the row stays locked until commit.
        let source = TemplateRepo::lock_snapshot_source(&mut *tx, template_id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Template", template_id))?;
        let from_base_id = source
            .base_id
            .ok_or(CoreError::MissingSource { template_id })?;
        let previous = source.snapshot.map(|json| json.0);

        let workspace = SpaceRepo::find_template_space(&mut *tx)
            .await?
            .ok_or(CoreError::NoTemplateWorkspace)?;

        let request = DuplicateBaseRequest {
            from_base_id,
            space_id: workspace.id,
            with_records: true,
            name: snapshot::requested_snapshot_name(&source.name),
        };
        let duplicated = self.duplicator.duplicate_base(&mut *tx, &request).await?;
        tracing::debug!(
            template_id,
            from_base_id,
            new_base_id = duplicated.id,
            "Base duplicated"
        );

        let snapshot_time: Timestamp = sqlx::query_scalar("SELECT NOW()")
            .fetch_one(&mut *tx)
            .await?;

        if let Some(previous) = &previous {
            if previous.base_id == duplicated.id {
                return Err(CoreError::Internal(format!(
                    "Duplicator returned the current snapshot base {} for template {template_id}",
                    duplicated.id
                ))
                .into());
            }
            retire_previous_base(&mut *tx, template_id, previous, snapshot_time).await?;
        }

        let snapshot = Snapshot {
            base_id: duplicated.id,
            space_id: duplicated.space_id,
            name: snapshot::recorded_snapshot_name(&duplicated.name, &request.name),
            snapshot_time,
        };
        let template = TemplateRepo::set_snapshot(&mut *tx, template_id, &snapshot)
            .await?
            .ok_or_else(|| CatalogError::not_found("Template", template_id))?;

        tx.commit().await?;

        tracing::info!(
            template_id,
            base_id = snapshot.base_id,
            previous_base_id = ?previous.as_ref().map(|p| p.base_id),
            "Template snapshot created"
        );
        Ok(template)
    }

    /// Reject an update that publishes a template with no snapshot.
    ///
    /// Locks the template row on `conn`, so the caller's subsequent write in
    /// the same transaction sees the state that was checked.
    pub async fn validate_publish(
        conn: &mut PgConnection,
        template_id: DbId,
        update: &UpdateTemplate,
    ) -> CatalogResult<Template> {
        let template = TemplateRepo::find_by_id_for_update(&mut *conn, template_id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Template", template_id))?;
        snapshot::validate_publish(template_id, update.is_published, template.snapshot_ref())?;
        Ok(template)
    }
}

/// Soft-delete the base the previous snapshot pointed at.
///
/// A base already retired, or removed entirely, is left as it is.
async fn retire_previous_base(
    conn: &mut PgConnection,
    template_id: DbId,
    previous: &Snapshot,
    now: Timestamp,
) -> CatalogResult<()> {
    let Some(base) = BaseRepo::find_by_id(&mut *conn, previous.base_id).await? else {
        tracing::warn!(
            template_id,
            base_id = previous.base_id,
            "Previous snapshot base no longer exists"
        );
        return Ok(());
    };

    if base.state().retire(now).is_ok() {
        BaseRepo::retire(&mut *conn, base.id).await?;
        tracing::debug!(template_id, base_id = base.id, "Previous snapshot base retired");
    } else {
        tracing::debug!(
            template_id,
            base_id = base.id,
            "Previous snapshot base was already retired"
        );
    }
    Ok(())
}
