//! Cover image references for templates.

use serde::{Deserialize, Serialize};

/// Stored image reference, persisted as JSONB `{ bucket?, path, token }`.
///
/// Older rows were written without a bucket; readers fall back to the
/// bucket configured for [`AssetCategory::Template`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cover {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    pub path: String,
    pub token: String,
}

impl Cover {
    /// The explicit bucket, or `default` for legacy rows.
    pub fn bucket_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.bucket.as_deref().unwrap_or(default)
    }
}

/// A cover together with its best-effort presigned preview URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverPreview {
    #[serde(flatten)]
    pub cover: Cover,
    pub presigned_url: Option<String>,
}

/// Kind of stored asset, used to pick a default bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetCategory {
    Template,
}

impl AssetCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Template => "template",
        }
    }
}
