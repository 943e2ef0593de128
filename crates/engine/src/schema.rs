//! Idempotent startup migrations.
//!
//! Runs once before the server accepts requests. Every statement is safe to
//! re-run (`CREATE TABLE IF NOT EXISTS`, guarded seeds), so a restart against
//! an existing database is a no-op.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

/// DDL statements, in dependency order.
const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS content_items (
        id UUID PRIMARY KEY,
        kind TEXT NOT NULL,
        title TEXT NOT NULL,
        slug TEXT NOT NULL,
        body TEXT NOT NULL,
        excerpt TEXT NOT NULL DEFAULT '',
        seo_description TEXT NOT NULL DEFAULT '',
        hero_image TEXT,
        status SMALLINT NOT NULL DEFAULT 1,
        created BIGINT NOT NULL,
        changed BIGINT NOT NULL
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS content_items_kind_slug ON content_items (kind, slug)",
    r#"
    CREATE TABLE IF NOT EXISTS categories (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        slug TEXT NOT NULL
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS categories_name_lower ON categories (lower(name))",
    "CREATE UNIQUE INDEX IF NOT EXISTS categories_slug ON categories (slug)",
    r#"
    CREATE TABLE IF NOT EXISTS tags (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        slug TEXT NOT NULL
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS tags_name_lower ON tags (lower(name))",
    "CREATE UNIQUE INDEX IF NOT EXISTS tags_slug ON tags (slug)",
    r#"
    CREATE TABLE IF NOT EXISTS content_category_links (
        content_id UUID NOT NULL REFERENCES content_items(id),
        category_id UUID NOT NULL REFERENCES categories(id),
        PRIMARY KEY (content_id, category_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS content_tag_links (
        content_id UUID NOT NULL REFERENCES content_items(id),
        tag_id UUID NOT NULL REFERENCES tags(id),
        PRIMARY KEY (content_id, tag_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS navigation_items (
        id UUID PRIMARY KEY,
        title TEXT NOT NULL,
        url TEXT NOT NULL,
        target TEXT NOT NULL DEFAULT '_self',
        icon TEXT,
        category TEXT NOT NULL DEFAULT 'Main',
        page_id UUID REFERENCES content_items(id),
        display_order INTEGER NOT NULL DEFAULT 0,
        location TEXT NOT NULL DEFAULT 'header',
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        created BIGINT NOT NULL,
        changed BIGINT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS navigation_items_category ON navigation_items (category, display_order)",
    r#"
    CREATE TABLE IF NOT EXISTS testimonials (
        id UUID PRIMARY KEY,
        author_name TEXT NOT NULL,
        author_location TEXT,
        content TEXT NOT NULL,
        is_featured BOOLEAN NOT NULL DEFAULT FALSE,
        status SMALLINT NOT NULL DEFAULT 1,
        created BIGINT NOT NULL,
        changed BIGINT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS site_settings (
        key TEXT PRIMARY KEY,
        value JSONB NOT NULL,
        updated TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
];

/// Baseline menu rows: (title, url, target, category, display_order, location).
const NAVIGATION_SEED: &[(&str, &str, &str, &str, i32, &str)] = &[
    ("Home", "/", "_self", "Main", 1, "both"),
    ("Blog", "/blog", "_self", "Main", 2, "both"),
    ("About", "/about", "_self", "Main", 3, "both"),
    ("Contact", "/contact", "_self", "Main", 4, "both"),
    ("Testimonials", "/testimonials", "_self", "Main", 5, "footer"),
    ("Privacy Policy", "/privacy-policy", "_self", "Legal", 1, "footer"),
    ("Terms of Service", "/terms-of-service", "_self", "Legal", 2, "footer"),
    ("Refund Policy", "/refund-policy", "_self", "Legal", 3, "footer"),
    ("eBay Store", "https://www.ebay.com/str/tristatecards", "_blank", "Shopping", 1, "footer"),
    ("Whatnot", "https://www.whatnot.com/user/tristatecards", "_blank", "Shopping", 2, "footer"),
    ("Featured Items", "/featured", "_self", "Shopping", 3, "footer"),
];

/// Create all tables and indexes, then seed baseline data.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    for statement in STATEMENTS {
        sqlx::query(statement)
            .execute(pool)
            .await
            .context("failed to run migration statement")?;
    }

    seed_navigation(pool).await?;

    info!("database schema ready");
    Ok(())
}

/// Insert the default menu rows if the navigation table is empty.
async fn seed_navigation(pool: &PgPool) -> Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM navigation_items")
        .fetch_one(pool)
        .await
        .context("failed to count navigation items")?;

    if count > 0 {
        return Ok(());
    }

    let now = chrono::Utc::now().timestamp();
    let mut tx = pool.begin().await.context("failed to start transaction")?;

    for (title, url, target, category, display_order, location) in NAVIGATION_SEED {
        sqlx::query(
            r#"
            INSERT INTO navigation_items
                (id, title, url, target, category, display_order, location, is_active, created, changed)
            VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, $8, $8)
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(title)
        .bind(url)
        .bind(target)
        .bind(category)
        .bind(display_order)
        .bind(location)
        .bind(now)
        .execute(&mut *tx)
        .await
        .context("failed to seed navigation item")?;
    }

    tx.commit().await.context("failed to commit transaction")?;

    info!(rows = NAVIGATION_SEED.len(), "seeded default navigation menu");
    Ok(())
}
