//! Navigation item model.
//!
//! A single flat, explicitly ordered menu list. The `category` column is a
//! free-text grouping label for footer sections, not a foreign key; renaming
//! or merging a group is a bulk string rewrite handled by
//! `services::navigation`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Navigation menu entry.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct NavigationItem {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// Display title. Duplicates are permitted.
    pub title: String,

    /// Relative path or absolute URL.
    pub url: String,

    /// Link target: "_self" (same window) or "_blank" (new tab).
    pub target: String,

    /// Optional icon token for rendering.
    pub icon: Option<String>,

    /// Free-text grouping label (e.g. "Main", "Legal", "Shopping").
    pub category: String,

    /// Optional back-reference to a page content item.
    pub page_id: Option<Uuid>,

    /// Sort position within the menu; ties broken by insertion order.
    pub display_order: i32,

    /// Placement: "header", "footer", or "both".
    pub location: String,

    /// Whether the entry is rendered.
    pub is_active: bool,

    /// Unix timestamp when created.
    pub created: i64,

    /// Unix timestamp when last changed.
    pub changed: i64,
}

const COLUMNS: &str = "id, title, url, target, icon, category, page_id, display_order, location, is_active, created, changed";

impl NavigationItem {
    /// Find a navigation item by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        let item = sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM navigation_items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch navigation item")?;

        Ok(item)
    }

    /// List all navigation items grouped by category, then by display order.
    ///
    /// `created` breaks display-order ties by insertion order.
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>> {
        let items = sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM navigation_items \
             ORDER BY category ASC, display_order ASC, created ASC"
        ))
        .fetch_all(pool)
        .await
        .context("failed to list navigation items")?;

        Ok(items)
    }

    /// List navigation items carrying a category label.
    pub async fn list_by_category(pool: &PgPool, category: &str) -> Result<Vec<Self>> {
        let items = sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM navigation_items \
             WHERE category = $1 \
             ORDER BY display_order ASC, created ASC"
        ))
        .bind(category)
        .fetch_all(pool)
        .await
        .context("failed to list navigation items by category")?;

        Ok(items)
    }

    /// Distinct category labels currently in use, alphabetically.
    pub async fn categories(pool: &PgPool) -> Result<Vec<String>> {
        let labels: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT category FROM navigation_items ORDER BY category ASC",
        )
        .fetch_all(pool)
        .await
        .context("failed to list navigation categories")?;

        Ok(labels)
    }

    /// Count all navigation items.
    pub async fn count(pool: &PgPool) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM navigation_items")
            .fetch_one(pool)
            .await
            .context("failed to count navigation items")?;

        Ok(count)
    }
}
