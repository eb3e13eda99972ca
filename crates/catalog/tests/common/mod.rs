//! Shared fixtures for catalog integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use showcase_catalog::collaborators::{
    BaseDuplicator, ConfiguredBuckets, DuplicateBaseRequest, DuplicatedBase, DuplicationError,
    PreviewUrlError, PreviewUrlResolver,
};
use showcase_catalog::config::CatalogConfig;
use showcase_catalog::service::CatalogService;
use showcase_db::models::base::{Base, CreateBase};
use showcase_db::models::space::{CreateSpace, Space};
use showcase_db::models::template::{CreateTemplate, Template};
use showcase_db::repositories::{BaseRepo, SpaceRepo};

pub const ACTOR: i64 = 7;

// ---------------------------------------------------------------------------
// Duplicators
// ---------------------------------------------------------------------------

/// How a [`FakeDuplicator`] behaves after inserting its copy.
#[derive(Debug, Clone, Copy)]
pub enum Behaviour {
    Succeed,
    /// Insert the copy, then report failure.
    FailAfterInsert,
    /// Insert the copy, then stall for this long.
    Stall(Duration),
    /// Insert the copy, then delete every template built from the source,
    /// so the pointer swap finds no row.
    DeleteTemplates,
}

/// Inserts a `bases` row in the target space on the caller's connection,
/// the way a real duplicator would before copying contents.
pub struct FakeDuplicator {
    behaviour: Behaviour,
    pub requests: Mutex<Vec<DuplicateBaseRequest>>,
}

impl FakeDuplicator {
    pub fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl BaseDuplicator for FakeDuplicator {
    async fn duplicate_base(
        &self,
        conn: &mut PgConnection,
        request: &DuplicateBaseRequest,
    ) -> Result<DuplicatedBase, DuplicationError> {
        self.requests.lock().unwrap().push(request.clone());

        let source = BaseRepo::find_by_id(&mut *conn, request.from_base_id)
            .await?
            .ok_or(DuplicationError::SourceNotFound(request.from_base_id))?;

        let copy = BaseRepo::create(
            &mut *conn,
            &CreateBase {
                space_id: request.space_id,
                name: request.name.clone(),
            },
        )
        .await?;

        match self.behaviour {
            Behaviour::Succeed => {}
            Behaviour::FailAfterInsert => {
                return Err(DuplicationError::Failed(format!(
                    "copy of base {} interrupted",
                    source.id
                )));
            }
            Behaviour::Stall(delay) => tokio::time::sleep(delay).await,
            Behaviour::DeleteTemplates => {
                sqlx::query("DELETE FROM templates WHERE base_id = $1")
                    .bind(request.from_base_id)
                    .execute(&mut *conn)
                    .await?;
            }
        }

        Ok(DuplicatedBase {
            id: copy.id,
            space_id: copy.space_id,
            name: copy.name,
        })
    }
}

// ---------------------------------------------------------------------------
// Preview signer
// ---------------------------------------------------------------------------

/// Signs every path except those containing "broken".
pub struct FakeSigner;

#[async_trait]
impl PreviewUrlResolver for FakeSigner {
    async fn resolve_preview_url(
        &self,
        bucket: &str,
        path: &str,
        token: &str,
    ) -> Result<String, PreviewUrlError> {
        if path.contains("broken") {
            return Err(PreviewUrlError {
                bucket: bucket.to_string(),
                path: path.to_string(),
                reason: "object missing".to_string(),
            });
        }
        Ok(format!("https://assets.test/{bucket}/{path}?token={token}"))
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn service_with(pool: &PgPool, duplicator: Arc<FakeDuplicator>) -> CatalogService {
    service_with_config(pool, duplicator, CatalogConfig::default())
}

pub fn service_with_config(
    pool: &PgPool,
    duplicator: Arc<FakeDuplicator>,
    config: CatalogConfig,
) -> CatalogService {
    CatalogService::new(
        pool.clone(),
        &config,
        duplicator,
        Arc::new(FakeSigner),
        Arc::new(ConfiguredBuckets::new(config.template_bucket.clone())),
    )
}

pub fn service(pool: &PgPool) -> CatalogService {
    service_with(pool, FakeDuplicator::new(Behaviour::Succeed))
}

pub async fn template_space(pool: &PgPool) -> Space {
    SpaceRepo::create(
        pool,
        &CreateSpace {
            name: "Templates".to_string(),
            is_template: Some(true),
        },
    )
    .await
    .unwrap()
}

/// A live base in an ordinary workspace, to be used as a template source.
pub async fn source_base(pool: &PgPool) -> Base {
    let space = SpaceRepo::create(
        pool,
        &CreateSpace {
            name: "Team".to_string(),
            is_template: None,
        },
    )
    .await
    .unwrap();
    BaseRepo::create(
        pool,
        &CreateBase {
            space_id: space.id,
            name: "CRM".to_string(),
        },
    )
    .await
    .unwrap()
}

pub async fn template_from(service: &CatalogService, name: &str, base: Option<&Base>) -> Template {
    service
        .create_template(
            ACTOR,
            &CreateTemplate {
                name: name.to_string(),
                base_id: base.map(|b| b.id),
                ..Default::default()
            },
        )
        .await
        .unwrap()
}

pub async fn bases_in(pool: &PgPool, space_id: i64) -> Vec<Base> {
    sqlx::query_as::<_, Base>(
        "SELECT id, space_id, name, deleted_at, created_at, updated_at \
         FROM bases WHERE space_id = $1 ORDER BY id",
    )
    .bind(space_id)
    .fetch_all(pool)
    .await
    .unwrap()
}
