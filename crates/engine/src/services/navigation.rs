//! Navigation synchronizer.
//!
//! Owns all mutations of the navigation menu: operator upserts, the
//! best-effort attach performed when a page opts into the menu, and the
//! bulk category-label rewrites. No other component performs raw string
//! matches on the `category` column.

use anyhow::{Context, Result};
use serde::Deserialize;
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::error::{PublishError, PublishResult};
use crate::models::NavigationItem;

/// Display order assigned to the first attach when the menu is empty.
const FIRST_ATTACH_ORDER: i32 = 5;

/// Valid `location` values.
const LOCATIONS: &[&str] = &["header", "footer", "both"];

/// Valid `target` values.
const TARGETS: &[&str] = &["_self", "_blank"];

/// Operator input for creating or replacing a menu entry.
#[derive(Debug, Clone, Deserialize)]
pub struct NavigationInput {
    pub title: String,
    pub url: String,
    pub target: Option<String>,
    pub icon: Option<String>,
    pub category: Option<String>,
    pub display_order: Option<i32>,
    pub location: Option<String>,
    pub is_active: Option<bool>,
}

/// Create a menu entry, or fully replace one when `id` is given.
///
/// Duplicate titles and urls are permitted; a link may appear twice with
/// different targets.
pub async fn upsert(
    pool: &PgPool,
    id: Option<Uuid>,
    input: NavigationInput,
) -> PublishResult<NavigationItem> {
    let mut errors = Vec::new();

    let title = input.title.trim().to_string();
    if title.is_empty() {
        errors.push("Title is required".to_string());
    }

    let url = input.url.trim().to_string();
    if url.is_empty() {
        errors.push("URL is required".to_string());
    }

    let location = input.location.unwrap_or_else(|| "header".to_string());
    if !LOCATIONS.contains(&location.as_str()) {
        errors.push(format!("Location must be one of: {}", LOCATIONS.join(", ")));
    }

    let target = input.target.unwrap_or_else(|| "_self".to_string());
    if !TARGETS.contains(&target.as_str()) {
        errors.push(format!("Target must be one of: {}", TARGETS.join(", ")));
    }

    if !errors.is_empty() {
        return Err(PublishError::Validation(errors));
    }

    let category = match input.category {
        Some(c) if !c.trim().is_empty() => c.trim().to_string(),
        _ => "Main".to_string(),
    };
    let display_order = input.display_order.unwrap_or(0);
    let is_active = input.is_active.unwrap_or(true);
    let now = chrono::Utc::now().timestamp();

    let item = match id {
        Some(id) => {
            let updated = sqlx::query_as::<_, NavigationItem>(
                r#"
                UPDATE navigation_items
                SET title = $1, url = $2, target = $3, icon = $4, category = $5,
                    display_order = $6, location = $7, is_active = $8, changed = $9
                WHERE id = $10
                RETURNING id, title, url, target, icon, category, page_id,
                          display_order, location, is_active, created, changed
                "#,
            )
            .bind(&title)
            .bind(&url)
            .bind(&target)
            .bind(&input.icon)
            .bind(&category)
            .bind(display_order)
            .bind(&location)
            .bind(is_active)
            .bind(now)
            .bind(id)
            .fetch_optional(pool)
            .await?;

            updated.ok_or(PublishError::NotFound)?
        }
        None => {
            sqlx::query_as::<_, NavigationItem>(
                r#"
                INSERT INTO navigation_items
                    (id, title, url, target, icon, category, display_order, location, is_active, created, changed)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
                RETURNING id, title, url, target, icon, category, page_id,
                          display_order, location, is_active, created, changed
                "#,
            )
            .bind(Uuid::now_v7())
            .bind(&title)
            .bind(&url)
            .bind(&target)
            .bind(&input.icon)
            .bind(&category)
            .bind(display_order)
            .bind(&location)
            .bind(is_active)
            .bind(now)
            .fetch_one(pool)
            .await?
        }
    };

    info!(id = %item.id, title = %item.title, "navigation item saved");
    Ok(item)
}

/// Delete a menu entry.
pub async fn delete(pool: &PgPool, id: Uuid) -> PublishResult<()> {
    let result = sqlx::query("DELETE FROM navigation_items WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(PublishError::NotFound);
    }

    info!(%id, "navigation item deleted");
    Ok(())
}

/// Add a newly created page to the menu.
///
/// Best-effort secondary step: the page's transaction has already
/// committed, so the caller reports a failure here as a warning instead of
/// rolling anything back. The new entry sorts after every existing one.
pub async fn attach_to_page(
    pool: &PgPool,
    page_id: Uuid,
    title: &str,
    url: &str,
    location: &str,
) -> Result<NavigationItem> {
    let next_order: i32 = sqlx::query_scalar(&format!(
        "SELECT COALESCE(MAX(display_order) + 1, {FIRST_ATTACH_ORDER}) FROM navigation_items"
    ))
    .fetch_one(pool)
    .await
    .context("failed to compute next display order")?;

    let now = chrono::Utc::now().timestamp();
    let item = sqlx::query_as::<_, NavigationItem>(
        r#"
        INSERT INTO navigation_items
            (id, title, url, target, category, page_id, display_order, location, is_active, created, changed)
        VALUES ($1, $2, $3, '_self', 'Main', $4, $5, $6, TRUE, $7, $7)
        RETURNING id, title, url, target, icon, category, page_id,
                  display_order, location, is_active, created, changed
        "#,
    )
    .bind(Uuid::now_v7())
    .bind(title)
    .bind(url)
    .bind(page_id)
    .bind(next_order)
    .bind(location)
    .bind(now)
    .fetch_one(pool)
    .await
    .context("failed to attach page to navigation")?;

    info!(%page_id, nav_id = %item.id, order = next_order, "page attached to navigation");
    Ok(item)
}

/// Remove every menu entry referencing a page. Runs on the page-deletion
/// transaction so the menu never points at a missing page.
pub async fn detach_page(conn: &mut PgConnection, page_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM navigation_items WHERE page_id = $1")
        .bind(page_id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected())
}

/// Rename a category label across every menu entry carrying it.
pub async fn rename_category(pool: &PgPool, old: &str, new: &str) -> PublishResult<u64> {
    let old = old.trim();
    let new = new.trim();
    if new.is_empty() {
        return Err(PublishError::validation("Category name is required"));
    }
    if new == old {
        return Err(PublishError::validation(
            "New category name must differ from the current one",
        ));
    }

    let result = sqlx::query("UPDATE navigation_items SET category = $1, changed = $2 WHERE category = $3")
        .bind(new)
        .bind(chrono::Utc::now().timestamp())
        .bind(old)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(PublishError::NotFound);
    }

    info!(old, new, rows = result.rows_affected(), "navigation category renamed");
    Ok(result.rows_affected())
}

/// Remove a category label by rewriting every entry carrying it to an
/// explicit replacement. Categories are not rows, so after the rewrite
/// nothing is left to drop.
pub async fn reassign_and_remove_category(
    pool: &PgPool,
    old: &str,
    replacement: &str,
) -> PublishResult<u64> {
    let old = old.trim();
    let replacement = replacement.trim();
    if replacement.is_empty() {
        return Err(PublishError::validation("Replacement category is required"));
    }
    if replacement == old {
        return Err(PublishError::validation(
            "Replacement category must differ from the one being removed",
        ));
    }

    let result = sqlx::query("UPDATE navigation_items SET category = $1, changed = $2 WHERE category = $3")
        .bind(replacement)
        .bind(chrono::Utc::now().timestamp())
        .bind(old)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(PublishError::NotFound);
    }

    info!(
        old,
        replacement,
        rows = result.rows_affected(),
        "navigation category reassigned and removed"
    );
    Ok(result.rows_affected())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn input_deserializes_with_defaults_absent() {
        let input: NavigationInput =
            serde_json::from_str(r#"{"title":"eBay Store","url":"https://ebay.example"}"#).unwrap();
        assert!(input.target.is_none());
        assert!(input.category.is_none());
        assert!(input.display_order.is_none());
        assert!(input.location.is_none());
        assert!(input.is_active.is_none());
    }

    // Lazy pool: the calls below must fail validation before any query runs
    fn unreachable_pool() -> PgPool {
        PgPool::connect_lazy("postgres://localhost/cardstack_unreachable").unwrap()
    }

    #[tokio::test]
    async fn rename_compares_labels_after_trimming() {
        let err = rename_category(&unreachable_pool(), " Legal ", "Legal ")
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::Validation(_)));
    }

    #[tokio::test]
    async fn remove_compares_labels_after_trimming() {
        let err = reassign_and_remove_category(&unreachable_pool(), "Shopping ", " Shopping")
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::Validation(_)));
    }

    #[test]
    fn location_and_target_vocabulary() {
        assert!(LOCATIONS.contains(&"header"));
        assert!(LOCATIONS.contains(&"footer"));
        assert!(LOCATIONS.contains(&"both"));
        assert!(TARGETS.contains(&"_self"));
        assert!(TARGETS.contains(&"_blank"));
    }
}
