//! Content item model: blog posts and static pages.
//!
//! Posts and pages share one table discriminated by `kind`. Slugs are
//! unique per kind and enforced by a unique index; the publisher resolves
//! collisions before insert (see `services::publisher`).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// Draft status value.
pub const STATUS_DRAFT: i16 = 0;

/// Published status value.
pub const STATUS_PUBLISHED: i16 = 1;

/// Content kind discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Post,
    Page,
}

impl ContentKind {
    /// Value stored in the `kind` column.
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Post => "post",
            ContentKind::Page => "page",
        }
    }
}

impl std::str::FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post" => Ok(ContentKind::Post),
            "page" => Ok(ContentKind::Page),
            other => Err(format!("unknown content kind: {other}")),
        }
    }
}

/// Content record (post or page).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContentItem {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// Kind discriminator ("post" or "page").
    pub kind: String,

    /// Display title.
    pub title: String,

    /// URL slug, unique within its kind.
    pub slug: String,

    /// Full body markup.
    pub body: String,

    /// Short summary, derived from body when not supplied.
    pub excerpt: String,

    /// Meta description for search engines, derived from excerpt when not supplied.
    pub seo_description: String,

    /// Reference path returned by the upload collaborator.
    pub hero_image: Option<String>,

    /// Publication status (0 = draft, 1 = published).
    pub status: i16,

    /// Unix timestamp when created.
    pub created: i64,

    /// Unix timestamp when last changed.
    pub changed: i64,
}

const COLUMNS: &str =
    "id, kind, title, slug, body, excerpt, seo_description, hero_image, status, created, changed";

impl ContentItem {
    /// Check if this item is published.
    pub fn is_published(&self) -> bool {
        self.status == STATUS_PUBLISHED
    }

    /// Find a content item by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        let item = sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM content_items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch content item by id")?;

        Ok(item)
    }

    /// Find a content item by kind and slug.
    pub async fn find_by_slug(pool: &PgPool, kind: ContentKind, slug: &str) -> Result<Option<Self>> {
        let item = sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM content_items WHERE kind = $1 AND slug = $2"
        ))
        .bind(kind.as_str())
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("failed to fetch content item by slug")?;

        Ok(item)
    }

    /// List items of a kind, optionally filtered by status, newest first.
    pub async fn list(
        pool: &PgPool,
        kind: ContentKind,
        status: Option<i16>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>> {
        let items = match status {
            Some(status) => {
                sqlx::query_as::<_, Self>(&format!(
                    "SELECT {COLUMNS} FROM content_items \
                     WHERE kind = $1 AND status = $2 \
                     ORDER BY created DESC LIMIT $3 OFFSET $4"
                ))
                .bind(kind.as_str())
                .bind(status)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Self>(&format!(
                    "SELECT {COLUMNS} FROM content_items \
                     WHERE kind = $1 \
                     ORDER BY created DESC LIMIT $2 OFFSET $3"
                ))
                .bind(kind.as_str())
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await
            }
        }
        .context("failed to list content items")?;

        Ok(items)
    }

    /// Count items of a kind, optionally filtered by status.
    pub async fn count(pool: &PgPool, kind: ContentKind, status: Option<i16>) -> Result<i64> {
        let count: i64 = match status {
            Some(status) => {
                sqlx::query_scalar(
                    "SELECT COUNT(*) FROM content_items WHERE kind = $1 AND status = $2",
                )
                .bind(kind.as_str())
                .bind(status)
                .fetch_one(pool)
                .await
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM content_items WHERE kind = $1")
                    .bind(kind.as_str())
                    .fetch_one(pool)
                    .await
            }
        }
        .context("failed to count content items")?;

        Ok(count)
    }

    /// Check whether a slug is already taken within a kind, excluding one row
    /// (the row being updated).
    pub async fn slug_exists(
        conn: &mut PgConnection,
        kind: ContentKind,
        slug: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(\
                SELECT 1 FROM content_items \
                WHERE kind = $1 AND slug = $2 AND ($3::uuid IS NULL OR id <> $3)\
             )",
        )
        .bind(kind.as_str())
        .bind(slug)
        .bind(exclude)
        .fetch_one(conn)
        .await?;

        Ok(exists)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips() {
        assert_eq!(ContentKind::Post.as_str(), "post");
        assert_eq!(ContentKind::Page.as_str(), "page");
        assert_eq!("post".parse::<ContentKind>().unwrap(), ContentKind::Post);
        assert_eq!("page".parse::<ContentKind>().unwrap(), ContentKind::Page);
        assert!("widget".parse::<ContentKind>().is_err());
    }

    #[test]
    fn kind_serde_lowercase() {
        let json = serde_json::to_string(&ContentKind::Page).unwrap();
        assert_eq!(json, "\"page\"");
        let parsed: ContentKind = serde_json::from_str("\"post\"").unwrap();
        assert_eq!(parsed, ContentKind::Post);
    }

    #[test]
    fn published_helper() {
        let item = ContentItem {
            id: Uuid::nil(),
            kind: "post".to_string(),
            title: "Hobby Box Break".to_string(),
            slug: "hobby-box-break".to_string(),
            body: "...".to_string(),
            excerpt: String::new(),
            seo_description: String::new(),
            hero_image: None,
            status: STATUS_PUBLISHED,
            created: 1000,
            changed: 1000,
        };
        assert!(item.is_published());

        let draft = ContentItem { status: STATUS_DRAFT, ..item };
        assert!(!draft.is_published());
    }
}
