//! Integration tests for template and category persistence.
//!
//! Exercises the repository layer against a real database:
//! - JSONB cover/snapshot columns round-trip as structured values
//! - Partial updates leave untouched columns alone
//! - Usage count increments are atomic under concurrency
//! - The published-needs-snapshot check constraint
//! - Category deletion detaches templates instead of removing them

use chrono::Utc;
use sqlx::PgPool;
use showcase_core::cover::Cover;
use showcase_core::snapshot::Snapshot;
use showcase_db::models::base::CreateBase;
use showcase_db::models::space::CreateSpace;
use showcase_db::models::template::{CreateTemplate, UpdateTemplate};
use showcase_db::models::template_category::{CreateTemplateCategory, UpdateTemplateCategory};
use showcase_db::repositories::{BaseRepo, SpaceRepo, TemplateCategoryRepo, TemplateRepo};

const ACTOR: i64 = 42;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_template(name: &str) -> CreateTemplate {
    CreateTemplate {
        name: name.to_string(),
        description: Some("crud test".to_string()),
        ..Default::default()
    }
}

fn sample_cover() -> Cover {
    Cover {
        bucket: None,
        path: "template/cover.png".to_string(),
        token: "tok-1".to_string(),
    }
}

async fn snapshot_for(pool: &PgPool) -> Snapshot {
    let space = SpaceRepo::create(
        pool,
        &CreateSpace {
            name: "Templates".to_string(),
            is_template: Some(true),
        },
    )
    .await
    .unwrap();
    let base = BaseRepo::create(
        pool,
        &CreateBase {
            space_id: space.id,
            name: "copy".to_string(),
        },
    )
    .await
    .unwrap();
    Snapshot {
        base_id: base.id,
        space_id: space.id,
        name: base.name,
        snapshot_time: Utc::now(),
    }
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_and_find_template(pool: PgPool) {
    let input = CreateTemplate {
        cover: Some(sample_cover()),
        ..new_template("CRM")
    };
    let created = TemplateRepo::create(&pool, ACTOR, 1.0, &input).await.unwrap();

    assert_eq!(created.name, "CRM");
    assert_eq!(created.created_by, ACTOR);
    assert_eq!(created.sort_order, 1.0);
    assert_eq!(created.usage_count, 0);
    assert!(!created.is_published);
    assert!(created.snapshot_ref().is_none());

    let found = TemplateRepo::find_by_id(&pool, created.id)
        .await
        .unwrap()
        .expect("template should exist");
    assert_eq!(found.cover_ref(), Some(&sample_cover()));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_missing_template_returns_none(pool: PgPool) {
    let found = TemplateRepo::find_by_id(&pool, 999_999).await.unwrap();
    assert!(found.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_partial_update_keeps_other_columns(pool: PgPool) {
    let created = TemplateRepo::create(&pool, ACTOR, 1.0, &new_template("Before"))
        .await
        .unwrap();

    let update = UpdateTemplate {
        name: Some("After".to_string()),
        ..Default::default()
    };
    let updated = TemplateRepo::update(&pool, created.id, &update)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.name, "After");
    assert_eq!(updated.description.as_deref(), Some("crud test"));
    assert_eq!(updated.created_by, ACTOR);
    assert_eq!(updated.sort_order, 1.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_clears_nullable_columns(pool: PgPool) {
    let category = TemplateCategoryRepo::create(
        &pool,
        ACTOR,
        1.0,
        &CreateTemplateCategory {
            name: "Design".to_string(),
        },
    )
    .await
    .unwrap();
    let input = CreateTemplate {
        cover: Some(sample_cover()),
        category_id: Some(category.id),
        markdown_description: Some("# Intro".to_string()),
        ..new_template("Clearable")
    };
    let created = TemplateRepo::create(&pool, ACTOR, 1.0, &input).await.unwrap();

    let update = UpdateTemplate {
        cover: Some(None),
        category_id: Some(None),
        description: Some(None),
        ..Default::default()
    };
    let updated = TemplateRepo::update(&pool, created.id, &update)
        .await
        .unwrap()
        .unwrap();

    assert!(updated.cover_ref().is_none());
    assert_eq!(updated.category_id, None);
    assert_eq!(updated.description, None);
    // Absent fields are untouched.
    assert_eq!(updated.markdown_description.as_deref(), Some("# Intro"));
    assert_eq!(updated.name, "Clearable");

    let (cover_is_null,): (bool,) =
        sqlx::query_as("SELECT cover IS NULL FROM templates WHERE id = $1")
            .bind(created.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(cover_is_null);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_replaces_cover(pool: PgPool) {
    let input = CreateTemplate {
        cover: Some(sample_cover()),
        ..new_template("Recovered")
    };
    let created = TemplateRepo::create(&pool, ACTOR, 1.0, &input).await.unwrap();

    let replacement = Cover {
        bucket: Some("public".to_string()),
        path: "template/new.png".to_string(),
        token: "tok-2".to_string(),
    };
    let update = UpdateTemplate {
        cover: Some(Some(replacement.clone())),
        ..Default::default()
    };
    let updated = TemplateRepo::update(&pool, created.id, &update)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.cover_ref(), Some(&replacement));
    assert_eq!(updated.description.as_deref(), Some("crud test"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_missing_template_returns_none(pool: PgPool) {
    let result = TemplateRepo::update(&pool, 999_999, &UpdateTemplate::default())
        .await
        .unwrap();
    assert!(result.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_set_snapshot_round_trips_json(pool: PgPool) {
    let created = TemplateRepo::create(&pool, ACTOR, 1.0, &new_template("Snap"))
        .await
        .unwrap();
    let snapshot = snapshot_for(&pool).await;

    let updated = TemplateRepo::set_snapshot(&pool, created.id, &snapshot)
        .await
        .unwrap()
        .unwrap();
    let stored = updated.snapshot_ref().unwrap();
    assert_eq!(stored.base_id, snapshot.base_id);
    assert_eq!(stored.space_id, snapshot.space_id);
    assert_eq!(stored.name, "copy");

    let (base_id_text,): (Option<String>,) =
        sqlx::query_as("SELECT snapshot ->> 'baseId' FROM templates WHERE id = $1")
            .bind(created.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(base_id_text, Some(snapshot.base_id.to_string()));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_publish_without_snapshot_violates_check(pool: PgPool) {
    let created = TemplateRepo::create(&pool, ACTOR, 1.0, &new_template("Unsnapped"))
        .await
        .unwrap();

    let update = UpdateTemplate {
        is_published: Some(true),
        ..Default::default()
    };
    let err = TemplateRepo::update(&pool, created.id, &update)
        .await
        .unwrap_err();
    let db_err = err.as_database_error().expect("should be a database error");
    assert_eq!(db_err.code().as_deref(), Some("23514"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_usage_increments_are_not_lost(pool: PgPool) {
    let created = TemplateRepo::create(&pool, ACTOR, 1.0, &new_template("Popular"))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..20 {
        let pool = pool.clone();
        let id = created.id;
        handles.push(tokio::spawn(async move {
            TemplateRepo::increment_usage_count(&pool, id).await.unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let found = TemplateRepo::find_by_id(&pool, created.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.usage_count, 20);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_increment_missing_template_returns_none(pool: PgPool) {
    let result = TemplateRepo::increment_usage_count(&pool, 999_999)
        .await
        .unwrap();
    assert!(result.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_template_keeps_source_base(pool: PgPool) {
    let space = SpaceRepo::create(
        &pool,
        &CreateSpace {
            name: "Work".to_string(),
            is_template: None,
        },
    )
    .await
    .unwrap();
    let base = BaseRepo::create(
        &pool,
        &CreateBase {
            space_id: space.id,
            name: "live".to_string(),
        },
    )
    .await
    .unwrap();
    let input = CreateTemplate {
        base_id: Some(base.id),
        ..new_template("Backed")
    };
    let created = TemplateRepo::create(&pool, ACTOR, 1.0, &input).await.unwrap();

    assert!(TemplateRepo::delete(&pool, created.id).await.unwrap());
    assert!(!TemplateRepo::delete(&pool, created.id).await.unwrap());

    let still_there = BaseRepo::find_by_id(&pool, base.id).await.unwrap().unwrap();
    assert!(still_there.state().is_active());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_published_filters_and_orders(pool: PgPool) {
    let snapshot = snapshot_for(&pool).await;
    let a = TemplateRepo::create(&pool, ACTOR, 2.0, &new_template("A")).await.unwrap();
    let b = TemplateRepo::create(&pool, ACTOR, 1.0, &new_template("B")).await.unwrap();
    let _hidden = TemplateRepo::create(&pool, ACTOR, 0.0, &new_template("Hidden"))
        .await
        .unwrap();

    let publish = UpdateTemplate {
        is_published: Some(true),
        ..Default::default()
    };
    for id in [a.id, b.id] {
        TemplateRepo::set_snapshot(&pool, id, &snapshot).await.unwrap();
        TemplateRepo::update(&pool, id, &publish).await.unwrap();
    }

    let published = TemplateRepo::list_published(&pool).await.unwrap();
    let ids: Vec<i64> = published.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![b.id, a.id]);
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_category_crud(pool: PgPool) {
    let created = TemplateCategoryRepo::create(
        &pool,
        ACTOR,
        1.0,
        &CreateTemplateCategory {
            name: "Sales".to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(created.created_by, ACTOR);

    let renamed = TemplateCategoryRepo::update(
        &pool,
        created.id,
        &UpdateTemplateCategory {
            name: Some("Revenue".to_string()),
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(renamed.name, "Revenue");
    assert_eq!(renamed.sort_order, 1.0);

    assert!(TemplateCategoryRepo::delete(&pool, created.id).await.unwrap());
    assert!(TemplateCategoryRepo::find_by_id(&pool, created.id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleting_category_detaches_templates(pool: PgPool) {
    let category = TemplateCategoryRepo::create(
        &pool,
        ACTOR,
        1.0,
        &CreateTemplateCategory {
            name: "Ops".to_string(),
        },
    )
    .await
    .unwrap();
    let input = CreateTemplate {
        category_id: Some(category.id),
        ..new_template("Runbook")
    };
    let template = TemplateRepo::create(&pool, ACTOR, 1.0, &input).await.unwrap();

    TemplateCategoryRepo::delete(&pool, category.id).await.unwrap();

    let found = TemplateRepo::find_by_id(&pool, template.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.category_id, None);
}
