//! Association manager: many-to-many links between content and taxonomy.
//!
//! Every operation is replace-not-merge: the content item's full link set is
//! deleted and rewritten, so omitting a previously attached term detaches
//! it. Mutations take the caller's open transaction, so a content row write
//! and its association rewrite commit or roll back together, and a reader
//! never observes a new title with an old tag set.

use anyhow::{Context, Result};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{PublishError, PublishResult};
use crate::models::{Category, Tag};
use crate::services::taxonomy::{self, TaxonomyKind};

/// Replace a content item's category set.
///
/// Every id must reference an existing category; unknown ids are collected
/// into one validation error before anything is deleted.
pub async fn set_categories(
    conn: &mut PgConnection,
    content_id: Uuid,
    category_ids: &[Uuid],
) -> PublishResult<()> {
    let mut errors = Vec::new();
    for id in category_ids {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
                .bind(id)
                .fetch_one(&mut *conn)
                .await?;
        if !exists {
            errors.push(format!("Unknown category: {id}"));
        }
    }
    if !errors.is_empty() {
        return Err(PublishError::Validation(errors));
    }

    sqlx::query("DELETE FROM content_category_links WHERE content_id = $1")
        .bind(content_id)
        .execute(&mut *conn)
        .await?;

    for id in category_ids {
        sqlx::query(
            "INSERT INTO content_category_links (content_id, category_id) \
             VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(content_id)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Replace a content item's tag set from free-text names.
///
/// Each name resolves through the taxonomy store's lookup-or-create, so new
/// names transparently become tag rows. Blank names are skipped. Returns
/// the resolved tag ids in input order.
pub async fn set_tags(
    conn: &mut PgConnection,
    content_id: Uuid,
    tag_names: &[String],
) -> PublishResult<Vec<Uuid>> {
    sqlx::query("DELETE FROM content_tag_links WHERE content_id = $1")
        .bind(content_id)
        .execute(&mut *conn)
        .await?;

    let mut tag_ids = Vec::with_capacity(tag_names.len());
    for name in tag_names {
        if name.trim().is_empty() {
            continue;
        }

        let tag_id = taxonomy::find_or_create(conn, TaxonomyKind::Tag, name).await?;

        sqlx::query(
            "INSERT INTO content_tag_links (content_id, tag_id) \
             VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(content_id)
        .bind(tag_id)
        .execute(&mut *conn)
        .await?;

        tag_ids.push(tag_id);
    }

    Ok(tag_ids)
}

/// Remove every association row for a content item. Called inside the
/// deletion transaction, since links have no independent existence.
pub async fn remove_all(conn: &mut PgConnection, content_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM content_category_links WHERE content_id = $1")
        .bind(content_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query("DELETE FROM content_tag_links WHERE content_id = $1")
        .bind(content_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Categories attached to a content item, alphabetically.
pub async fn categories_for(pool: &PgPool, content_id: Uuid) -> Result<Vec<Category>> {
    let categories = sqlx::query_as::<_, Category>(
        r#"
        SELECT c.id, c.name, c.slug
        FROM categories c
        INNER JOIN content_category_links l ON l.category_id = c.id
        WHERE l.content_id = $1
        ORDER BY c.name ASC
        "#,
    )
    .bind(content_id)
    .fetch_all(pool)
    .await
    .context("failed to fetch categories for content item")?;

    Ok(categories)
}

/// Tags attached to a content item, alphabetically.
pub async fn tags_for(pool: &PgPool, content_id: Uuid) -> Result<Vec<Tag>> {
    let tags = sqlx::query_as::<_, Tag>(
        r#"
        SELECT t.id, t.name, t.slug
        FROM tags t
        INNER JOIN content_tag_links l ON l.tag_id = t.id
        WHERE l.content_id = $1
        ORDER BY t.name ASC
        "#,
    )
    .bind(content_id)
    .fetch_all(pool)
    .await
    .context("failed to fetch tags for content item")?;

    Ok(tags)
}
