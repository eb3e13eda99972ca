//! Contracts for the systems the catalog consumes but does not implement.
//!
//! The acting user is not a collaborator: every operation that records an
//! author takes an explicit `actor_id`.

use async_trait::async_trait;
use sqlx::PgConnection;
use showcase_core::cover::AssetCategory;
use showcase_core::types::DbId;

/// Input to [`BaseDuplicator::duplicate_base`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateBaseRequest {
    pub from_base_id: DbId,
    /// Space that will own the copy.
    pub space_id: DbId,
    /// Copy records as well as structure.
    pub with_records: bool,
    pub name: String,
}

/// The base a duplication produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicatedBase {
    pub id: DbId,
    pub space_id: DbId,
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DuplicationError {
    #[error("Source base {0} does not exist")]
    SourceNotFound(DbId),

    #[error("Database error during duplication: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Failed(String),
}

/// Deep-copies a base.
///
/// Runs on the caller's connection so the copy joins the caller's
/// transaction and is rolled back with it.
#[async_trait]
pub trait BaseDuplicator: Send + Sync {
    async fn duplicate_base(
        &self,
        conn: &mut PgConnection,
        request: &DuplicateBaseRequest,
    ) -> Result<DuplicatedBase, DuplicationError>;
}

#[derive(Debug, thiserror::Error)]
#[error("Failed to resolve preview URL for {bucket}/{path}: {reason}")]
pub struct PreviewUrlError {
    pub bucket: String,
    pub path: String,
    pub reason: String,
}

/// Produces presigned, time-limited URLs for stored assets.
#[async_trait]
pub trait PreviewUrlResolver: Send + Sync {
    async fn resolve_preview_url(
        &self,
        bucket: &str,
        path: &str,
        token: &str,
    ) -> Result<String, PreviewUrlError>;
}

/// Names the bucket used for an asset category when a row has none.
pub trait BucketResolver: Send + Sync {
    fn default_bucket_for(&self, category: AssetCategory) -> String;
}

/// [`BucketResolver`] backed by a configured bucket name.
#[derive(Debug, Clone)]
pub struct ConfiguredBuckets {
    template_bucket: String,
}

impl ConfiguredBuckets {
    pub fn new(template_bucket: impl Into<String>) -> Self {
        Self {
            template_bucket: template_bucket.into(),
        }
    }
}

impl BucketResolver for ConfiguredBuckets {
    fn default_bucket_for(&self, category: AssetCategory) -> String {
        match category {
            AssetCategory::Template => self.template_bucket.clone(),
        }
    }
}
