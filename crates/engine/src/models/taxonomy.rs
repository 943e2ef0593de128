//! Taxonomy models: categories and tags.
//!
//! Both are free-standing rows referenced by association links, never
//! embedded in content. Names are unique case-insensitively, slugs are
//! unique exactly; both constraints are backed by unique indexes so
//! concurrent `find_or_create` calls cannot create duplicates.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A blog category.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// Human-readable name, unique case-insensitively.
    pub name: String,

    /// URL slug derived from the name.
    pub slug: String,
}

/// A free-text tag.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// Human-readable name, unique case-insensitively.
    pub name: String,

    /// URL slug derived from the name.
    pub slug: String,
}

/// A taxonomy term with its content usage count, for the admin listing.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TermWithCount {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub content_count: i64,
}

impl Category {
    /// Find a category by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        let category =
            sqlx::query_as::<_, Self>("SELECT id, name, slug FROM categories WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await
                .context("failed to fetch category")?;

        Ok(category)
    }

    /// List all categories alphabetically.
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>> {
        let categories =
            sqlx::query_as::<_, Self>("SELECT id, name, slug FROM categories ORDER BY name ASC")
                .fetch_all(pool)
                .await
                .context("failed to list categories")?;

        Ok(categories)
    }

    /// List all categories with the number of content items referencing each.
    pub async fn list_with_counts(pool: &PgPool) -> Result<Vec<TermWithCount>> {
        let terms = sqlx::query_as::<_, TermWithCount>(
            r#"
            SELECT c.id, c.name, c.slug, COUNT(l.content_id) AS content_count
            FROM categories c
            LEFT JOIN content_category_links l ON l.category_id = c.id
            GROUP BY c.id, c.name, c.slug
            ORDER BY c.name ASC
            "#,
        )
        .fetch_all(pool)
        .await
        .context("failed to list categories with counts")?;

        Ok(terms)
    }
}

impl Tag {
    /// Find a tag by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        let tag = sqlx::query_as::<_, Self>("SELECT id, name, slug FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .context("failed to fetch tag")?;

        Ok(tag)
    }

    /// List all tags alphabetically.
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>> {
        let tags = sqlx::query_as::<_, Self>("SELECT id, name, slug FROM tags ORDER BY name ASC")
            .fetch_all(pool)
            .await
            .context("failed to list tags")?;

        Ok(tags)
    }

    /// List all tags with the number of content items referencing each.
    pub async fn list_with_counts(pool: &PgPool) -> Result<Vec<TermWithCount>> {
        let terms = sqlx::query_as::<_, TermWithCount>(
            r#"
            SELECT t.id, t.name, t.slug, COUNT(l.content_id) AS content_count
            FROM tags t
            LEFT JOIN content_tag_links l ON l.tag_id = t.id
            GROUP BY t.id, t.name, t.slug
            ORDER BY t.name ASC
            "#,
        )
        .fetch_all(pool)
        .await
        .context("failed to list tags with counts")?;

        Ok(terms)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn tag_serialization() {
        let tag = Tag {
            id: Uuid::nil(),
            name: "Vintage".to_string(),
            slug: "vintage".to_string(),
        };

        let json = serde_json::to_string(&tag).unwrap();
        assert!(json.contains("vintage"));

        let parsed: Tag = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.name, "Vintage");
    }

    #[test]
    fn term_with_count_shape() {
        let term = TermWithCount {
            id: Uuid::nil(),
            name: "Grading".to_string(),
            slug: "grading".to_string(),
            content_count: 3,
        };
        assert_eq!(term.content_count, 3);
    }
}
