//! Snapshot value types and the rules around them.
//!
//! A [`Snapshot`] points at a base that was duplicated from a template's
//! live source into the template workspace. The base it points at is owned
//! by the snapshot until a newer snapshot supersedes it, at which point the
//! base is retired (soft-deleted) in the same transaction.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Name requested for the duplicate when the template itself has none.
pub const DEFAULT_SNAPSHOT_NAME: &str = "template snapshot";

/// Frozen pointer to the most recent duplicate of a template's source base.
///
/// Persisted as JSONB: `{ "baseId", "spaceId", "name", "snapshotTime" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub base_id: DbId,
    pub space_id: DbId,
    pub name: String,
    pub snapshot_time: Timestamp,
}

/// Lifecycle of a base (container).
///
/// Stored as a nullable `deleted_at` column; this is the one place that
/// interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Active,
    Retired { at: Timestamp },
}

impl ContainerState {
    pub fn from_deleted_at(deleted_at: Option<Timestamp>) -> Self {
        match deleted_at {
            Some(at) => Self::Retired { at },
            None => Self::Active,
        }
    }

    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    /// Transition to `Retired`. Retiring twice is rejected.
    pub fn retire(self, at: Timestamp) -> Result<Self, CoreError> {
        match self {
            Self::Active => Ok(Self::Retired { at }),
            Self::Retired { at: previous } => Err(CoreError::Validation(format!(
                "Base was already retired at {previous}"
            ))),
        }
    }
}

/// Name to request from the duplicator for a template called `template_name`.
pub fn requested_snapshot_name(template_name: &str) -> String {
    let trimmed = template_name.trim();
    if trimmed.is_empty() {
        DEFAULT_SNAPSHOT_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Name recorded on the snapshot: the duplicate's own name, unless the
/// duplicator returned an empty one.
pub fn recorded_snapshot_name(duplicated_name: &str, requested_name: &str) -> String {
    if duplicated_name.trim().is_empty() {
        requested_name.to_string()
    } else {
        duplicated_name.to_string()
    }
}

/// Publishing requires an existing snapshot.
///
/// `requested` is the `is_published` value of a pending update; only
/// `Some(true)` is checked. Unpublishing is always allowed.
pub fn validate_publish(
    template_id: DbId,
    requested: Option<bool>,
    current: Option<&Snapshot>,
) -> Result<(), CoreError> {
    match (requested, current) {
        (Some(true), None) => Err(CoreError::PublishPrecondition { template_id }),
        _ => Ok(()),
    }
}
