//! Best-effort cover preview URLs for template listings.
//!
//! Each cover is resolved on its own. A failure leaves that row's
//! `presigned_url` empty and never fails the listing.

use futures::future::join_all;
use serde::Serialize;
use showcase_core::cover::{Cover, CoverPreview};
use showcase_core::types::DbId;
use showcase_db::models::template::Template;

use crate::collaborators::PreviewUrlResolver;

/// A template as returned by list operations.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateView {
    #[serde(flatten)]
    pub template: Template,
    /// `None` when the template has no cover.
    pub cover_preview: Option<CoverPreview>,
}

/// Attach a preview to every template with a cover, resolving them
/// concurrently. Input order is preserved.
pub async fn attach_previews(
    templates: Vec<Template>,
    resolver: &dyn PreviewUrlResolver,
    default_bucket: &str,
) -> Vec<TemplateView> {
    let views = templates.into_iter().map(|template| async move {
        let cover_preview = match template.cover_ref() {
            Some(cover) => Some(resolve_cover(resolver, template.id, cover, default_bucket).await),
            None => None,
        };
        TemplateView {
            template,
            cover_preview,
        }
    });
    join_all(views).await
}

async fn resolve_cover(
    resolver: &dyn PreviewUrlResolver,
    template_id: DbId,
    cover: &Cover,
    default_bucket: &str,
) -> CoverPreview {
    let bucket = cover.bucket_or(default_bucket);
    let presigned_url = match resolver
        .resolve_preview_url(bucket, &cover.path, &cover.token)
        .await
    {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::warn!(template_id, error = %e, "Cover preview unavailable");
            None
        }
    };
    CoverPreview {
        cover: cover.clone(),
        presigned_url,
    }
}
