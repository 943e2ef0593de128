//! Site settings: a key/value JSON store plus the per-request snapshot.
//!
//! Settings are read-mostly configuration (posts per page, excerpt length).
//! Handlers load a [`PublishSettings`] snapshot once and pass it into the
//! publisher; nothing re-queries settings mid-transaction.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Site settings record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SiteSettings {
    /// Setting key.
    pub key: String,

    /// Setting value (JSON).
    pub value: serde_json::Value,

    /// When this setting was last updated.
    pub updated: chrono::DateTime<chrono::Utc>,
}

impl SiteSettings {
    /// Get a setting value by key.
    pub async fn get(pool: &PgPool, key: &str) -> Result<Option<serde_json::Value>> {
        let result = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT value FROM site_settings WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(pool)
        .await
        .context("failed to get site setting")?;

        Ok(result)
    }

    /// Set a setting value.
    pub async fn set(pool: &PgPool, key: &str, value: serde_json::Value) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO site_settings (key, value, updated)
            VALUES ($1, $2, NOW())
            ON CONFLICT (key) DO UPDATE SET value = $2, updated = NOW()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(pool)
        .await
        .context("failed to set site setting")?;

        Ok(())
    }

    /// Get all settings as a map.
    pub async fn all(
        pool: &PgPool,
    ) -> Result<std::collections::HashMap<String, serde_json::Value>> {
        let settings =
            sqlx::query_as::<_, SiteSettings>("SELECT key, value, updated FROM site_settings")
                .fetch_all(pool)
                .await
                .context("failed to get all site settings")?;

        Ok(settings.into_iter().map(|s| (s.key, s.value)).collect())
    }
}

/// Immutable snapshot of the settings the publishing engine reads.
#[derive(Debug, Clone, Serialize)]
pub struct PublishSettings {
    /// Posts shown per listing page.
    pub posts_per_page: i64,

    /// Character budget for derived excerpts.
    pub excerpt_length: usize,

    /// Whether the public blog shows the author line.
    pub show_author: bool,

    /// Whether comments are accepted on posts.
    pub allow_comments: bool,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            posts_per_page: 10,
            excerpt_length: 160,
            show_author: true,
            allow_comments: true,
        }
    }
}

impl PublishSettings {
    /// Load the snapshot, falling back to defaults for unset keys.
    pub async fn load(pool: &PgPool) -> Result<Self> {
        let defaults = Self::default();

        // Values feed SQL LIMITs and character budgets; a stored value that
        // slipped past validation falls back to the default instead of
        // breaking every listing
        let posts_per_page = SiteSettings::get(pool, "posts_per_page")
            .await?
            .and_then(|v| v.as_i64())
            .filter(|v| *v > 0)
            .unwrap_or(defaults.posts_per_page);

        let excerpt_length = SiteSettings::get(pool, "excerpt_length")
            .await?
            .and_then(|v| v.as_u64())
            .filter(|v| *v > 0)
            .map(|v| v as usize)
            .unwrap_or(defaults.excerpt_length);

        let show_author = SiteSettings::get(pool, "show_author")
            .await?
            .and_then(|v| v.as_bool())
            .unwrap_or(defaults.show_author);

        let allow_comments = SiteSettings::get(pool, "allow_comments")
            .await?
            .and_then(|v| v.as_bool())
            .unwrap_or(defaults.allow_comments);

        Ok(Self {
            posts_per_page,
            excerpt_length,
            show_author,
            allow_comments,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = PublishSettings::default();
        assert_eq!(settings.posts_per_page, 10);
        assert_eq!(settings.excerpt_length, 160);
        assert!(settings.show_author);
        assert!(settings.allow_comments);
    }
}
