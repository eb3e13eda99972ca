//! Template category model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use showcase_core::types::{DbId, Timestamp};

/// A row from the `template_categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TemplateCategory {
    pub id: DbId,
    pub name: String,
    pub sort_order: f64,
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new category.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTemplateCategory {
    pub name: String,
}

/// DTO for updating an existing category. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTemplateCategory {
    pub name: Option<String>,
}
