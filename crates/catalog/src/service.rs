//! Catalog operations over templates and template categories.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use showcase_core::cover::AssetCategory;
use showcase_core::ordering::OrderedCollection;
use showcase_core::types::DbId;
use showcase_db::models::template::{CreateTemplate, Template, UpdateTemplate};
use showcase_db::models::template_category::{
    CreateTemplateCategory, TemplateCategory, UpdateTemplateCategory,
};
use showcase_db::repositories::{TemplateCategoryRepo, TemplateRepo};

use crate::collaborators::{BaseDuplicator, BucketResolver, PreviewUrlResolver};
use crate::config::CatalogConfig;
use crate::error::{bounded, CatalogError, CatalogResult};
use crate::ordering::OrderingManager;
use crate::preview::{attach_previews, TemplateView};
use crate::snapshot::SnapshotManager;

/// Entry point for callers of the catalog.
///
/// Cheap to clone; all state is behind the pool or an `Arc`.
#[derive(Clone)]
pub struct CatalogService {
    pool: PgPool,
    ordering: OrderingManager,
    snapshots: SnapshotManager,
    previews: Arc<dyn PreviewUrlResolver>,
    buckets: Arc<dyn BucketResolver>,
    transaction_timeout: Duration,
}

impl CatalogService {
    pub fn new(
        pool: PgPool,
        config: &CatalogConfig,
        duplicator: Arc<dyn BaseDuplicator>,
        previews: Arc<dyn PreviewUrlResolver>,
        buckets: Arc<dyn BucketResolver>,
    ) -> Self {
        Self {
            ordering: OrderingManager::new(pool.clone(), config.transaction_timeout),
            snapshots: SnapshotManager::new(
                pool.clone(),
                duplicator,
                config.big_transaction_timeout,
            ),
            pool,
            previews,
            buckets,
            transaction_timeout: config.transaction_timeout,
        }
    }

    pub fn ordering(&self) -> &OrderingManager {
        &self.ordering
    }

    pub fn snapshots(&self) -> &SnapshotManager {
        &self.snapshots
    }

    // -----------------------------------------------------------------------
    // Templates
    // -----------------------------------------------------------------------

    /// Create a template at the end of the list.
    pub async fn create_template(
        &self,
        actor_id: DbId,
        input: &CreateTemplate,
    ) -> CatalogResult<Template> {
        bounded(self.transaction_timeout, async {
            let mut tx = self.pool.begin().await?;
            let order =
                OrderingManager::next_append_order(&mut *tx, OrderedCollection::Templates).await?;
            let template = TemplateRepo::create(&mut *tx, actor_id, order, input).await?;
            tx.commit().await?;
            tracing::info!(template_id = template.id, actor_id, order, "Template created");
            Ok(template)
        })
        .await
    }

    pub async fn get_template(&self, id: DbId) -> CatalogResult<Template> {
        TemplateRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Template", id))
    }

    /// All templates by `(sort_order, id)`, with cover previews.
    pub async fn list_templates(&self) -> CatalogResult<Vec<TemplateView>> {
        let templates = TemplateRepo::list(&self.pool).await?;
        Ok(self.with_previews(templates).await)
    }

    /// Published templates by `(sort_order, id)`, with cover previews.
    pub async fn list_published_templates(&self) -> CatalogResult<Vec<TemplateView>> {
        let templates = TemplateRepo::list_published(&self.pool).await?;
        Ok(self.with_previews(templates).await)
    }

    /// Apply a partial update.
    ///
    /// Publishing is checked against the stored snapshot in the same
    /// transaction as the write; a rejected update writes nothing.
    pub async fn update_template(
        &self,
        id: DbId,
        input: &UpdateTemplate,
    ) -> CatalogResult<Template> {
        bounded(self.transaction_timeout, async {
            let mut tx = self.pool.begin().await?;
            SnapshotManager::validate_publish(&mut *tx, id, input).await?;
            let template = TemplateRepo::update(&mut *tx, id, input)
                .await?
                .ok_or_else(|| CatalogError::not_found("Template", id))?;
            tx.commit().await?;
            tracing::info!(template_id = id, is_published = template.is_published, "Template updated");
            Ok(template)
        })
        .await
    }

    /// Remove the catalog row. Bases are not touched.
    pub async fn delete_template(&self, id: DbId) -> CatalogResult<()> {
        if !TemplateRepo::delete(&self.pool, id).await? {
            return Err(CatalogError::not_found("Template", id));
        }
        tracing::info!(template_id = id, "Template deleted");
        Ok(())
    }

    /// Move a template before all others, returning its new key.
    pub async fn pin_top_template(&self, id: DbId) -> CatalogResult<f64> {
        self.ordering
            .pin_to_top(OrderedCollection::Templates, id)
            .await
    }

    /// Record one use of a template, returning the new count.
    pub async fn increment_usage_count(&self, id: DbId) -> CatalogResult<i64> {
        TemplateRepo::increment_usage_count(&self.pool, id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Template", id))
    }

    /// See [`SnapshotManager::create_snapshot`].
    pub async fn create_snapshot(&self, id: DbId) -> CatalogResult<Template> {
        self.snapshots.create_snapshot(id).await
    }

    async fn with_previews(&self, templates: Vec<Template>) -> Vec<TemplateView> {
        let default_bucket = self.buckets.default_bucket_for(AssetCategory::Template);
        attach_previews(templates, self.previews.as_ref(), &default_bucket).await
    }

    // -----------------------------------------------------------------------
    // Categories
    // -----------------------------------------------------------------------

    /// Create a category at the end of the list.
    pub async fn create_category(
        &self,
        actor_id: DbId,
        input: &CreateTemplateCategory,
    ) -> CatalogResult<TemplateCategory> {
        bounded(self.transaction_timeout, async {
            let mut tx = self.pool.begin().await?;
            let order = OrderingManager::next_append_order(
                &mut *tx,
                OrderedCollection::TemplateCategories,
            )
            .await?;
            let category = TemplateCategoryRepo::create(&mut *tx, actor_id, order, input).await?;
            tx.commit().await?;
            tracing::info!(category_id = category.id, actor_id, order, "Template category created");
            Ok(category)
        })
        .await
    }

    pub async fn get_category(&self, id: DbId) -> CatalogResult<TemplateCategory> {
        TemplateCategoryRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| CatalogError::not_found("TemplateCategory", id))
    }

    pub async fn list_categories(&self) -> CatalogResult<Vec<TemplateCategory>> {
        Ok(TemplateCategoryRepo::list(&self.pool).await?)
    }

    pub async fn update_category(
        &self,
        id: DbId,
        input: &UpdateTemplateCategory,
    ) -> CatalogResult<TemplateCategory> {
        TemplateCategoryRepo::update(&self.pool, id, input)
            .await?
            .ok_or_else(|| CatalogError::not_found("TemplateCategory", id))
    }

    pub async fn delete_category(&self, id: DbId) -> CatalogResult<()> {
        if !TemplateCategoryRepo::delete(&self.pool, id).await? {
            return Err(CatalogError::not_found("TemplateCategory", id));
        }
        tracing::info!(category_id = id, "Template category deleted");
        Ok(())
    }

    pub async fn pin_top_category(&self, id: DbId) -> CatalogResult<f64> {
        self.ordering
            .pin_to_top(OrderedCollection::TemplateCategories, id)
            .await
    }
}
