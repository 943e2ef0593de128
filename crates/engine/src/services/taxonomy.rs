//! Taxonomy store: lookup-or-create, rename, and orphan-safe delete for
//! categories and tags.
//!
//! Categories and tags share one shape and one rule set, so the store is
//! generic over [`TaxonomyKind`]. Uniqueness is enforced by the unique
//! indexes on `lower(name)` and `slug`; `find_or_create` tolerates losing a
//! race by re-reading after a conflict-swallowed insert, so concurrent
//! duplicate requests converge on a single row.

use anyhow::anyhow;
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::error::{PublishError, PublishResult};
use crate::slug::slugify;

/// Which taxonomy table an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxonomyKind {
    Category,
    Tag,
}

impl TaxonomyKind {
    fn table(self) -> &'static str {
        match self {
            TaxonomyKind::Category => "categories",
            TaxonomyKind::Tag => "tags",
        }
    }

    fn link_table(self) -> &'static str {
        match self {
            TaxonomyKind::Category => "content_category_links",
            TaxonomyKind::Tag => "content_tag_links",
        }
    }

    fn link_column(self) -> &'static str {
        match self {
            TaxonomyKind::Category => "category_id",
            TaxonomyKind::Tag => "tag_id",
        }
    }

    fn label(self) -> &'static str {
        match self {
            TaxonomyKind::Category => "Category",
            TaxonomyKind::Tag => "Tag",
        }
    }
}

/// Look up a term by name (case-insensitive) or slug, creating it when
/// absent. Returns the id of the existing or new row.
///
/// Idempotent under concurrent duplicates: the insert swallows unique
/// conflicts and re-reads, so the second caller observes the first caller's
/// row.
pub async fn find_or_create(
    conn: &mut PgConnection,
    kind: TaxonomyKind,
    name: &str,
) -> PublishResult<Uuid> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PublishError::validation(format!(
            "{} name is required",
            kind.label()
        )));
    }

    let slug = slugify(name);
    if slug.is_empty() {
        return Err(PublishError::validation(format!(
            "{} name must contain letters or numbers",
            kind.label()
        )));
    }

    if let Some(id) = lookup(conn, kind, name, &slug).await? {
        return Ok(id);
    }

    let id = Uuid::now_v7();
    let inserted = sqlx::query(&format!(
        "INSERT INTO {} (id, name, slug) VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
        kind.table()
    ))
    .bind(id)
    .bind(name)
    .bind(&slug)
    .execute(&mut *conn)
    .await?;

    if inserted.rows_affected() == 1 {
        info!(kind = kind.label(), name, %id, "taxonomy term created");
        return Ok(id);
    }

    // Lost the race: a concurrent request created the row between our
    // lookup and insert. Observe it instead of failing.
    lookup(conn, kind, name, &slug)
        .await?
        .ok_or_else(|| PublishError::Internal(anyhow!("taxonomy row vanished after conflict")))
}

async fn lookup(
    conn: &mut PgConnection,
    kind: TaxonomyKind,
    name: &str,
    slug: &str,
) -> Result<Option<Uuid>, sqlx::Error> {
    sqlx::query_scalar(&format!(
        "SELECT id FROM {} WHERE lower(name) = lower($1) OR slug = $2 LIMIT 1",
        kind.table()
    ))
    .bind(name)
    .bind(slug)
    .fetch_optional(&mut *conn)
    .await
}

/// Rename a term in place, re-deriving its slug. Associations reference the
/// id and are unaffected.
pub async fn rename(
    pool: &PgPool,
    kind: TaxonomyKind,
    id: Uuid,
    new_name: &str,
) -> PublishResult<()> {
    let new_name = new_name.trim();
    if new_name.is_empty() {
        return Err(PublishError::validation(format!(
            "{} name is required",
            kind.label()
        )));
    }

    let slug = slugify(new_name);
    if slug.is_empty() {
        return Err(PublishError::validation(format!(
            "{} name must contain letters or numbers",
            kind.label()
        )));
    }

    let collides: bool = sqlx::query_scalar(&format!(
        "SELECT EXISTS(\
            SELECT 1 FROM {} \
            WHERE (lower(name) = lower($1) OR slug = $2) AND id <> $3\
         )",
        kind.table()
    ))
    .bind(new_name)
    .bind(&slug)
    .bind(id)
    .fetch_one(pool)
    .await?;

    if collides {
        return Err(PublishError::validation(format!(
            "A {} with that name already exists",
            kind.label().to_lowercase()
        )));
    }

    let result = sqlx::query(&format!(
        "UPDATE {} SET name = $1, slug = $2 WHERE id = $3",
        kind.table()
    ))
    .bind(new_name)
    .bind(&slug)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(PublishError::NotFound);
    }

    info!(kind = kind.label(), %id, name = new_name, "taxonomy term renamed");
    Ok(())
}

/// Delete a term and every association row referencing it, in one
/// transaction. The linked content items are otherwise unchanged.
pub async fn delete(pool: &PgPool, kind: TaxonomyKind, id: Uuid) -> PublishResult<()> {
    let mut tx = pool.begin().await?;

    let links = sqlx::query(&format!(
        "DELETE FROM {} WHERE {} = $1",
        kind.link_table(),
        kind.link_column()
    ))
    .bind(id)
    .execute(&mut *tx)
    .await?;

    let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", kind.table()))
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        // Nothing to delete; drop the transaction without committing
        return Err(PublishError::NotFound);
    }

    tx.commit().await?;

    info!(
        kind = kind.label(),
        %id,
        links_removed = links.rows_affected(),
        "taxonomy term deleted"
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn kind_tables() {
        assert_eq!(TaxonomyKind::Category.table(), "categories");
        assert_eq!(TaxonomyKind::Tag.table(), "tags");
        assert_eq!(TaxonomyKind::Category.link_table(), "content_category_links");
        assert_eq!(TaxonomyKind::Tag.link_table(), "content_tag_links");
        assert_eq!(TaxonomyKind::Category.link_column(), "category_id");
        assert_eq!(TaxonomyKind::Tag.link_column(), "tag_id");
    }
}
