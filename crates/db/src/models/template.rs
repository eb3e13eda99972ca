//! Template model and DTOs.

use serde::{Deserialize, Deserializer, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use showcase_core::cover::Cover;
use showcase_core::snapshot::Snapshot;
use showcase_core::types::{DbId, Timestamp};

/// A row from the `templates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Template {
    pub id: DbId,
    pub category_id: Option<DbId>,
    pub name: String,
    pub description: Option<String>,
    pub markdown_description: Option<String>,
    /// Live source base the snapshot is duplicated from.
    pub base_id: Option<DbId>,
    pub cover: Option<Json<Cover>>,
    /// Written only by the snapshot protocol.
    pub snapshot: Option<Json<Snapshot>>,
    pub is_published: bool,
    pub usage_count: i64,
    pub sort_order: f64,
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Template {
    pub fn snapshot_ref(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref().map(|json| &json.0)
    }

    pub fn cover_ref(&self) -> Option<&Cover> {
        self.cover.as_ref().map(|json| &json.0)
    }
}

/// The fields the snapshot protocol re-reads inside its transaction.
#[derive(Debug, Clone, FromRow)]
pub struct SnapshotSource {
    pub base_id: Option<DbId>,
    pub name: String,
    pub snapshot: Option<Json<Snapshot>>,
}

/// DTO for creating a new template.
///
/// `sort_order`, `created_by`, `snapshot` and `usage_count` are not
/// caller-settable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTemplate {
    pub name: String,
    pub description: Option<String>,
    pub markdown_description: Option<String>,
    pub category_id: Option<DbId>,
    pub base_id: Option<DbId>,
    pub cover: Option<Cover>,
}

/// DTO for updating an existing template. All fields are optional.
///
/// Clearable columns use `Option<Option<T>>`: an absent field leaves the
/// column alone, an explicit `null` sets it to NULL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTemplate {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub markdown_description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub category_id: Option<Option<DbId>>,
    pub base_id: Option<DbId>,
    #[serde(default, deserialize_with = "present")]
    pub cover: Option<Option<Cover>>,
    pub is_published: Option<bool>,
}

/// Wraps any present value, `null` included, in `Some`.
fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}
