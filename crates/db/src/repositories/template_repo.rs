//! Repository for the `templates` table.

use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};
use showcase_core::snapshot::Snapshot;
use showcase_core::types::DbId;

use crate::models::template::{CreateTemplate, SnapshotSource, Template, UpdateTemplate};

const COLUMNS: &str = "id, category_id, name, description, markdown_description, base_id, \
     cover, snapshot, is_published, usage_count, sort_order, created_by, created_at, updated_at";

/// Provides CRUD operations for templates.
///
/// Methods that take a generic executor can run on the pool or inside a
/// caller-owned transaction (`&mut *tx`).
pub struct TemplateRepo;

impl TemplateRepo {
    /// Insert a new template at `sort_order`, returning the created row.
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        created_by: DbId,
        sort_order: f64,
        input: &CreateTemplate,
    ) -> Result<Template, sqlx::Error> {
        let query = format!(
            "INSERT INTO templates \
                (name, description, markdown_description, category_id, base_id, cover, \
                 sort_order, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.markdown_description)
            .bind(input.category_id)
            .bind(input.base_id)
            .bind(input.cover.as_ref().map(Json))
            .bind(sort_order)
            .bind(created_by)
            .fetch_one(executor)
            .await
    }

    /// Find a template by ID.
    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
    ) -> Result<Option<Template>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM templates WHERE id = $1");
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find a template by ID and lock the row until the transaction ends.
    pub async fn find_by_id_for_update<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
    ) -> Result<Option<Template>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM templates WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Re-read the snapshot inputs of a template, locking the row.
    pub async fn lock_snapshot_source<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
    ) -> Result<Option<SnapshotSource>, sqlx::Error> {
        sqlx::query_as::<_, SnapshotSource>(
            "SELECT base_id, name, snapshot FROM templates WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// List all templates by `(sort_order, id)`.
    pub async fn list(pool: &PgPool) -> Result<Vec<Template>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM templates ORDER BY sort_order ASC, id ASC");
        sqlx::query_as::<_, Template>(&query).fetch_all(pool).await
    }

    /// List published templates by `(sort_order, id)`.
    pub async fn list_published(pool: &PgPool) -> Result<Vec<Template>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM templates \
             WHERE is_published = true \
             ORDER BY sort_order ASC, id ASC"
        );
        sqlx::query_as::<_, Template>(&query).fetch_all(pool).await
    }

    /// Update a template. Only provided fields are applied.
    ///
    /// Clearable columns (`Option<Option<T>>`) use `CASE WHEN provided`, so
    /// `Some(None)` writes NULL and `None` keeps the current value.
    pub async fn update<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
        input: &UpdateTemplate,
    ) -> Result<Option<Template>, sqlx::Error> {
        let query = format!(
            "UPDATE templates SET \
                name = COALESCE($2, name), \
                description = CASE WHEN $3 THEN $4 ELSE description END, \
                markdown_description = CASE WHEN $5 THEN $6 ELSE markdown_description END, \
                category_id = CASE WHEN $7 THEN $8 ELSE category_id END, \
                base_id = COALESCE($9, base_id), \
                cover = CASE WHEN $10 THEN $11 ELSE cover END, \
                is_published = COALESCE($12, is_published) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.description.is_some())
            .bind(input.description.as_ref().and_then(|v| v.as_deref()))
            .bind(input.markdown_description.is_some())
            .bind(input.markdown_description.as_ref().and_then(|v| v.as_deref()))
            .bind(input.category_id.is_some())
            .bind(input.category_id.flatten())
            .bind(input.base_id)
            .bind(input.cover.is_some())
            .bind(input.cover.as_ref().and_then(|v| v.as_ref()).map(Json))
            .bind(input.is_published)
            .fetch_optional(executor)
            .await
    }

    /// Overwrite the snapshot pointer, returning the updated row.
    pub async fn set_snapshot<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
        snapshot: &Snapshot,
    ) -> Result<Option<Template>, sqlx::Error> {
        let query = format!(
            "UPDATE templates SET snapshot = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .bind(Json(snapshot))
            .fetch_optional(executor)
            .await
    }

    /// Atomically bump `usage_count`, returning the new value.
    ///
    /// The increment happens in the database, so concurrent callers never
    /// lose updates.
    pub async fn increment_usage_count(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<i64>, sqlx::Error> {
        let row: Option<(i64,)> = sqlx::query_as(
            "UPDATE templates SET usage_count = usage_count + 1 \
             WHERE id = $1 \
             RETURNING usage_count",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|r| r.0))
    }

    /// Hard-delete a template by ID. Returns `true` if a row was removed.
    ///
    /// The source base and any snapshot base are left alone.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM templates WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
