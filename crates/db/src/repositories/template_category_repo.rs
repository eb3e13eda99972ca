//! Repository for the `template_categories` table.

use sqlx::{PgExecutor, PgPool};
use showcase_core::types::DbId;

use crate::models::template_category::{
    CreateTemplateCategory, TemplateCategory, UpdateTemplateCategory,
};

const COLUMNS: &str = "id, name, sort_order, created_by, created_at, updated_at";

/// Provides CRUD operations for template categories.
pub struct TemplateCategoryRepo;

impl TemplateCategoryRepo {
    /// Insert a new category at `sort_order`, returning the created row.
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        created_by: DbId,
        sort_order: f64,
        input: &CreateTemplateCategory,
    ) -> Result<TemplateCategory, sqlx::Error> {
        let query = format!(
            "INSERT INTO template_categories (name, sort_order, created_by) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TemplateCategory>(&query)
            .bind(&input.name)
            .bind(sort_order)
            .bind(created_by)
            .fetch_one(executor)
            .await
    }

    /// Find a category by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TemplateCategory>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM template_categories WHERE id = $1");
        sqlx::query_as::<_, TemplateCategory>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all categories by `(sort_order, id)`.
    pub async fn list(pool: &PgPool) -> Result<Vec<TemplateCategory>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM template_categories ORDER BY sort_order ASC, id ASC"
        );
        sqlx::query_as::<_, TemplateCategory>(&query)
            .fetch_all(pool)
            .await
    }

    /// Update a category. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTemplateCategory,
    ) -> Result<Option<TemplateCategory>, sqlx::Error> {
        let query = format!(
            "UPDATE template_categories SET name = COALESCE($2, name) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TemplateCategory>(&query)
            .bind(id)
            .bind(&input.name)
            .fetch_optional(pool)
            .await
    }

    /// Delete a category by ID. Templates in it keep existing with no
    /// category. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM template_categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
