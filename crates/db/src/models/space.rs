//! Space (workspace) model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use showcase_core::types::{DbId, Timestamp};

/// A row from the `spaces` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Space {
    pub id: DbId,
    pub name: String,
    /// Marks the template workspace that owns snapshot duplicates.
    pub is_template: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new space.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSpace {
    pub name: String,
    pub is_template: Option<bool>,
}
