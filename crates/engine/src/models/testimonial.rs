//! Testimonial model.
//!
//! Customer testimonials with a featured flag and the same draft/published
//! workflow as content items. No cross-entity invariants.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Testimonial record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Testimonial {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// Name of the person quoted.
    pub author_name: String,

    /// Optional location ("Trenton, NJ").
    pub author_location: Option<String>,

    /// Testimonial text.
    pub content: String,

    /// Whether to surface on the homepage.
    pub is_featured: bool,

    /// Publication status (0 = draft, 1 = published).
    pub status: i16,

    /// Unix timestamp when created.
    pub created: i64,

    /// Unix timestamp when last changed.
    pub changed: i64,
}

/// Input for creating a testimonial.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTestimonial {
    pub author_name: String,
    pub author_location: Option<String>,
    pub content: String,
    pub is_featured: Option<bool>,
    pub status: Option<i16>,
}

/// Input for updating a testimonial. Absent fields keep previous values.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTestimonial {
    pub author_name: Option<String>,
    pub author_location: Option<String>,
    pub content: Option<String>,
    pub is_featured: Option<bool>,
    pub status: Option<i16>,
}

const COLUMNS: &str = "id, author_name, author_location, content, is_featured, status, created, changed";

impl Testimonial {
    /// Create a new testimonial.
    pub async fn create(pool: &PgPool, input: CreateTestimonial) -> Result<Self> {
        let id = Uuid::now_v7();
        let now = chrono::Utc::now().timestamp();

        let testimonial = sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO testimonials \
                 (id, author_name, author_location, content, is_featured, status, created, changed) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7) \
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&input.author_name)
        .bind(&input.author_location)
        .bind(&input.content)
        .bind(input.is_featured.unwrap_or(false))
        .bind(input.status.unwrap_or(super::content_item::STATUS_PUBLISHED))
        .bind(now)
        .fetch_one(pool)
        .await
        .context("failed to create testimonial")?;

        Ok(testimonial)
    }

    /// Find a testimonial by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        let testimonial = sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM testimonials WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch testimonial")?;

        Ok(testimonial)
    }

    /// Update a testimonial, keeping previous values for absent fields.
    pub async fn update(pool: &PgPool, id: Uuid, input: UpdateTestimonial) -> Result<Option<Self>> {
        let Some(current) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let now = chrono::Utc::now().timestamp();

        let author_name = input.author_name.unwrap_or(current.author_name);
        let author_location = input.author_location.or(current.author_location);
        let content = input.content.unwrap_or(current.content);
        let is_featured = input.is_featured.unwrap_or(current.is_featured);
        let status = input.status.unwrap_or(current.status);

        let updated = sqlx::query_as::<_, Self>(&format!(
            "UPDATE testimonials \
             SET author_name = $1, author_location = $2, content = $3, \
                 is_featured = $4, status = $5, changed = $6 \
             WHERE id = $7 \
             RETURNING {COLUMNS}"
        ))
        .bind(&author_name)
        .bind(&author_location)
        .bind(&content)
        .bind(is_featured)
        .bind(status)
        .bind(now)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to update testimonial")?;

        Ok(updated)
    }

    /// Delete a testimonial.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM testimonials WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete testimonial")?;

        Ok(result.rows_affected() > 0)
    }

    /// List testimonials, newest first.
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Self>> {
        let testimonials = sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM testimonials \
             ORDER BY created DESC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("failed to list testimonials")?;

        Ok(testimonials)
    }

    /// List featured, published testimonials for the homepage.
    pub async fn list_featured(pool: &PgPool, limit: i64) -> Result<Vec<Self>> {
        let testimonials = sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM testimonials \
             WHERE is_featured AND status = 1 \
             ORDER BY created DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(pool)
        .await
        .context("failed to list featured testimonials")?;

        Ok(testimonials)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn create_input_defaults() {
        let input: CreateTestimonial = serde_json::from_str(
            r#"{"author_name":"Pat","content":"Great cards, fast shipping."}"#,
        )
        .unwrap();
        assert!(input.author_location.is_none());
        assert!(input.is_featured.is_none());
        assert!(input.status.is_none());
    }

    #[test]
    fn update_input_partial() {
        let input: UpdateTestimonial = serde_json::from_str(r#"{"is_featured":true}"#).unwrap();
        assert_eq!(input.is_featured, Some(true));
        assert!(input.author_name.is_none());
        assert!(input.content.is_none());
    }
}
