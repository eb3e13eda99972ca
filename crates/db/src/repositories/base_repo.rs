//! Repository for the `bases` table.
//!
//! Covers the slice of base lifecycle the catalog owns: creating rows for
//! duplicates, retiring superseded snapshot bases, and the maintenance
//! sweeps over the template workspace.

use sqlx::{PgExecutor, PgPool};
use showcase_core::types::{DbId, Timestamp};

use crate::models::base::{Base, CreateBase};

const COLUMNS: &str = "id, space_id, name, deleted_at, created_at, updated_at";

/// Provides lifecycle operations for bases.
pub struct BaseRepo;

impl BaseRepo {
    /// Insert a new active base, returning the created row.
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        input: &CreateBase,
    ) -> Result<Base, sqlx::Error> {
        let query = format!(
            "INSERT INTO bases (space_id, name) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Base>(&query)
            .bind(input.space_id)
            .bind(&input.name)
            .fetch_one(executor)
            .await
    }

    /// Find a base by ID, including retired rows.
    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
    ) -> Result<Option<Base>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bases WHERE id = $1");
        sqlx::query_as::<_, Base>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Soft-delete a base. Returns `true` only if it was active.
    pub async fn retire<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE bases SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Retire active bases in `space_id` created before `created_before`
    /// that no template references, either as a snapshot or as a source.
    ///
    /// Returns the number of bases retired.
    pub async fn retire_orphaned(
        pool: &PgPool,
        space_id: DbId,
        created_before: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE bases b SET deleted_at = NOW() \
             WHERE b.space_id = $1 \
               AND b.deleted_at IS NULL \
               AND b.created_at < $2 \
               AND NOT EXISTS ( \
                   SELECT 1 FROM templates t \
                   WHERE (t.snapshot ->> 'baseId')::BIGINT = b.id \
                      OR t.base_id = b.id \
               )",
        )
        .bind(space_id)
        .bind(created_before)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Hard-delete bases in `space_id` retired before `retired_before`.
    ///
    /// Bases still referenced by a template snapshot are never purged.
    /// Returns the number of bases removed.
    pub async fn purge_retired(
        pool: &PgPool,
        space_id: DbId,
        retired_before: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM bases b \
             WHERE b.space_id = $1 \
               AND b.deleted_at IS NOT NULL \
               AND b.deleted_at < $2 \
               AND NOT EXISTS ( \
                   SELECT 1 FROM templates t \
                   WHERE (t.snapshot ->> 'baseId')::BIGINT = b.id \
               )",
        )
        .bind(space_id)
        .bind(retired_before)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
