//! Base (container) model.
//!
//! Only the columns the catalog needs are modelled here; duplicating a
//! base's contents is the duplicator collaborator's concern.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use showcase_core::snapshot::ContainerState;
use showcase_core::types::{DbId, Timestamp};

/// A row from the `bases` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Base {
    pub id: DbId,
    pub space_id: DbId,
    pub name: String,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Base {
    pub fn state(&self) -> ContainerState {
        ContainerState::from_deleted_at(self.deleted_at)
    }
}

/// DTO for creating a new base.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBase {
    pub space_id: DbId,
    pub name: String,
}
