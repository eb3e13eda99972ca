//! Repository for the `spaces` table.

use sqlx::{PgExecutor, PgPool};

use crate::models::space::{CreateSpace, Space};

const COLUMNS: &str = "id, name, is_template, created_at, updated_at";

/// Provides lookups for spaces.
pub struct SpaceRepo;

impl SpaceRepo {
    /// Insert a new space, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSpace) -> Result<Space, sqlx::Error> {
        let query = format!(
            "INSERT INTO spaces (name, is_template) \
             VALUES ($1, COALESCE($2, false)) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Space>(&query)
            .bind(&input.name)
            .bind(input.is_template)
            .fetch_one(pool)
            .await
    }

    /// The template workspace. If several spaces are flagged, the oldest wins.
    pub async fn find_template_space<'e, E: PgExecutor<'e>>(
        executor: E,
    ) -> Result<Option<Space>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM spaces WHERE is_template = true ORDER BY id ASC LIMIT 1"
        );
        sqlx::query_as::<_, Space>(&query)
            .fetch_optional(executor)
            .await
    }
}
