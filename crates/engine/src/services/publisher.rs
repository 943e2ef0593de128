//! Publishing orchestrator.
//!
//! Top-level use cases for content: create, update, and delete posts and
//! pages. Each use case validates everything up front (collecting the full
//! violation list), then runs the content write and its association rewrite
//! inside one transaction. Navigation attach for new pages happens after
//! commit as a best-effort secondary effect reported through warnings.

use std::sync::Arc;

use anyhow::anyhow;
use serde::Deserialize;
use sqlx::{PgConnection, PgPool};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{PublishError, PublishResult};
use crate::file::UploadStore;
use crate::models::content_item::{STATUS_DRAFT, STATUS_PUBLISHED};
use crate::models::{ContentItem, ContentKind, PublishSettings};
use crate::services::{associations, navigation};
use crate::slug::{date_suffix, slugify};
use crate::text::derive_excerpt;

/// Operator input for creating or updating content.
///
/// On update, absent fields preserve the stored values; empty-string
/// `excerpt` or `seo_description` requests re-derivation from the body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentInput {
    pub title: Option<String>,
    pub body: Option<String>,
    pub excerpt: Option<String>,
    pub seo_description: Option<String>,
    /// Explicit slug override; slugified before use.
    pub slug: Option<String>,
    /// Reference path from a prior upload; empty string clears it on update.
    pub hero_image: Option<String>,
    pub status: Option<i16>,
    /// Category ids; `None` preserves the current set on update.
    pub categories: Option<Vec<Uuid>>,
    /// Free-text tag names; `None` preserves the current set on update.
    pub tags: Option<Vec<String>>,
}

/// An image handed to the upload collaborator alongside a content write.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Menu attachment requested for a new page.
#[derive(Debug, Clone, Deserialize)]
pub struct NavigationAttach {
    pub location: String,
}

/// Result of a successful publish operation. Warnings carry best-effort
/// secondary failures that did not roll back the primary write.
#[derive(Debug, Clone)]
pub struct PublishOutcome {
    pub item: ContentItem,
    pub warnings: Vec<String>,
}

/// Coordinator for content use cases.
#[derive(Clone)]
pub struct Publisher {
    pool: PgPool,
    uploads: Arc<dyn UploadStore>,
}

impl Publisher {
    /// Create a new publisher.
    pub fn new(pool: PgPool, uploads: Arc<dyn UploadStore>) -> Self {
        Self { pool, uploads }
    }

    /// Create a post or page.
    ///
    /// An upload failure blocks the whole write: the content row is never
    /// created with its intended image missing.
    pub async fn create(
        &self,
        kind: ContentKind,
        input: ContentInput,
        image: Option<ImageUpload>,
        attach: Option<NavigationAttach>,
        settings: &PublishSettings,
    ) -> PublishResult<PublishOutcome> {
        let mut errors = Vec::new();

        let title = input.title.as_deref().unwrap_or("").trim().to_string();
        if title.is_empty() {
            errors.push("Title is required".to_string());
        }

        let body = input.body.as_deref().unwrap_or("").trim().to_string();
        if body.is_empty() {
            errors.push("Content is required".to_string());
        }

        let status = input.status.unwrap_or(STATUS_PUBLISHED);
        if status != STATUS_DRAFT && status != STATUS_PUBLISHED {
            errors.push("Status must be draft or published".to_string());
        }

        let explicit_slug = input.slug.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let candidate = slugify(explicit_slug.unwrap_or(&title));
        if !title.is_empty() && candidate.is_empty() {
            errors.push("Title must contain letters or numbers".to_string());
        }

        if !errors.is_empty() {
            return Err(PublishError::Validation(errors));
        }

        // Upload only after the field checks pass; a rejected write must
        // never leave an orphaned file on disk
        let hero_image = match image {
            Some(upload) => match self.uploads.store(&upload.filename, &upload.data).await {
                Ok(path) => Some(path),
                Err(e) => {
                    return Err(PublishError::validation(format!(
                        "Failed to upload image: {e}"
                    )));
                }
            },
            None => input
                .hero_image
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
        };

        let excerpt = match input.excerpt.as_deref().map(str::trim) {
            Some(e) if !e.is_empty() => e.to_string(),
            _ => derive_excerpt(&body, settings.excerpt_length),
        };
        let seo_description = match input.seo_description.as_deref().map(str::trim) {
            Some(d) if !d.is_empty() => d.to_string(),
            _ => excerpt.clone(),
        };

        let id = Uuid::now_v7();
        let now = chrono::Utc::now().timestamp();

        let mut tx = self.pool.begin().await?;

        let slug = unique_slug(&mut tx, kind, &candidate, None).await?;

        let item = sqlx::query_as::<_, ContentItem>(
            r#"
            INSERT INTO content_items
                (id, kind, title, slug, body, excerpt, seo_description, hero_image, status, created, changed)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            RETURNING id, kind, title, slug, body, excerpt, seo_description, hero_image, status, created, changed
            "#,
        )
        .bind(id)
        .bind(kind.as_str())
        .bind(&title)
        .bind(&slug)
        .bind(&body)
        .bind(&excerpt)
        .bind(&seo_description)
        .bind(&hero_image)
        .bind(status)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(ref category_ids) = input.categories {
            associations::set_categories(&mut tx, id, category_ids).await?;
        }
        if let Some(ref tag_names) = input.tags {
            associations::set_tags(&mut tx, id, tag_names).await?;
        }

        tx.commit().await?;

        info!(content_id = %id, kind = kind.as_str(), slug = %item.slug, "content created");

        let mut warnings = Vec::new();
        if let Some(attach) = attach {
            if kind == ContentKind::Page {
                let url = format!("/{}", item.slug);
                if let Err(e) = navigation::attach_to_page(
                    &self.pool,
                    item.id,
                    &item.title,
                    &url,
                    &attach.location,
                )
                .await
                {
                    warn!(error = %e, page_id = %item.id, "navigation attach failed after page create");
                    warnings.push(
                        "Page saved, but it could not be added to the navigation menu".to_string(),
                    );
                }
            }
        }

        Ok(PublishOutcome { item, warnings })
    }

    /// Update a post or page. Absent input fields preserve stored values;
    /// the slug is re-derived only when the title or an explicit override
    /// changed it.
    pub async fn update(
        &self,
        id: Uuid,
        input: ContentInput,
        image: Option<ImageUpload>,
        settings: &PublishSettings,
    ) -> PublishResult<PublishOutcome> {
        let existing = ContentItem::find_by_id(&self.pool, id)
            .await?
            .ok_or(PublishError::NotFound)?;
        let kind: ContentKind = existing
            .kind
            .parse()
            .map_err(|e: String| PublishError::Internal(anyhow!(e)))?;

        let mut errors = Vec::new();

        let title = match input.title.as_deref().map(str::trim) {
            Some("") => {
                errors.push("Title is required".to_string());
                existing.title.clone()
            }
            Some(t) => t.to_string(),
            None => existing.title.clone(),
        };

        let body = match input.body.as_deref().map(str::trim) {
            Some("") => {
                errors.push("Content is required".to_string());
                existing.body.clone()
            }
            Some(b) => b.to_string(),
            None => existing.body.clone(),
        };

        let status = input.status.unwrap_or(existing.status);
        if status != STATUS_DRAFT && status != STATUS_PUBLISHED {
            errors.push("Status must be draft or published".to_string());
        }

        let explicit_slug = input.slug.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let candidate = match explicit_slug {
            Some(s) => Some(slugify(s)),
            None if title != existing.title => Some(slugify(&title)),
            None => None,
        };
        if let Some(ref c) = candidate {
            if c.is_empty() {
                errors.push("Title must contain letters or numbers".to_string());
            }
        }

        if !errors.is_empty() {
            return Err(PublishError::Validation(errors));
        }

        // Same ordering as create: no disk write until the fields pass
        let hero_image = match image {
            Some(upload) => match self.uploads.store(&upload.filename, &upload.data).await {
                Ok(path) => Some(path),
                Err(e) => {
                    return Err(PublishError::validation(format!(
                        "Failed to upload image: {e}"
                    )));
                }
            },
            None => match input.hero_image.as_deref().map(str::trim) {
                Some("") => None,
                Some(path) => Some(path.to_string()),
                None => existing.hero_image.clone(),
            },
        };

        let excerpt = match input.excerpt.as_deref().map(str::trim) {
            Some("") => derive_excerpt(&body, settings.excerpt_length),
            Some(e) => e.to_string(),
            None => existing.excerpt.clone(),
        };
        let seo_description = match input.seo_description.as_deref().map(str::trim) {
            Some("") => excerpt.clone(),
            Some(d) => d.to_string(),
            None => existing.seo_description.clone(),
        };

        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        let slug = match candidate {
            Some(c) if c != existing.slug => unique_slug(&mut tx, kind, &c, Some(id)).await?,
            _ => existing.slug.clone(),
        };

        let item = sqlx::query_as::<_, ContentItem>(
            r#"
            UPDATE content_items
            SET title = $1, slug = $2, body = $3, excerpt = $4, seo_description = $5,
                hero_image = $6, status = $7, changed = $8
            WHERE id = $9
            RETURNING id, kind, title, slug, body, excerpt, seo_description, hero_image, status, created, changed
            "#,
        )
        .bind(&title)
        .bind(&slug)
        .bind(&body)
        .bind(&excerpt)
        .bind(&seo_description)
        .bind(&hero_image)
        .bind(status)
        .bind(now)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(ref category_ids) = input.categories {
            associations::set_categories(&mut tx, id, category_ids).await?;
        }
        if let Some(ref tag_names) = input.tags {
            associations::set_tags(&mut tx, id, tag_names).await?;
        }

        tx.commit().await?;

        info!(content_id = %id, slug = %item.slug, "content updated");
        Ok(PublishOutcome {
            item,
            warnings: Vec::new(),
        })
    }

    /// Delete a post or page, its association rows, and (for pages) any
    /// menu entries referencing it, all in one transaction.
    pub async fn delete(&self, id: Uuid) -> PublishResult<()> {
        let existing = ContentItem::find_by_id(&self.pool, id)
            .await?
            .ok_or(PublishError::NotFound)?;

        let mut tx = self.pool.begin().await?;

        associations::remove_all(&mut tx, id).await?;

        let nav_removed = if existing.kind == ContentKind::Page.as_str() {
            navigation::detach_page(&mut tx, id).await?
        } else {
            0
        };

        sqlx::query("DELETE FROM content_items WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(content_id = %id, kind = %existing.kind, nav_removed, "content deleted");
        Ok(())
    }
}

/// Candidate sequence tried when a slug collides: the raw candidate, then
/// the compact current-date suffix the site has always produced, then
/// numeric disambiguators on the dated form for same-day collisions.
fn slug_candidates(candidate: &str, date: chrono::NaiveDate) -> Vec<String> {
    let dated = format!("{candidate}-{}", date_suffix(date));

    let mut candidates = Vec::with_capacity(100);
    candidates.push(candidate.to_string());
    candidates.push(dated.clone());
    for i in 2..100 {
        candidates.push(format!("{dated}-{i}"));
    }
    candidates
}

/// Resolve a slug candidate to a unique slug within a kind.
async fn unique_slug(
    conn: &mut PgConnection,
    kind: ContentKind,
    candidate: &str,
    exclude: Option<Uuid>,
) -> Result<String, sqlx::Error> {
    for slug in slug_candidates(candidate, chrono::Utc::now().date_naive()) {
        if !ContentItem::slug_exists(conn, kind, &slug, exclude).await? {
            return Ok(slug);
        }
    }

    // Practically unreachable; guarantees termination
    let fragment = Uuid::now_v7().simple().to_string();
    Ok(format!("{candidate}-{}", &fragment[..8]))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::file::{LocalUploadStore, UploadError};

    // Smallest valid PNG header bytes, enough for content sniffing.
    const PNG_BYTES: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52,
    ];

    /// Counts calls and optionally fails every store.
    struct RecordingStore {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl UploadStore for RecordingStore {
        async fn store(&self, _original_name: &str, _data: &[u8]) -> Result<String, UploadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(UploadError::NotAnImage)
            } else {
                Ok("/uploads/blog/post_000000000000.png".to_string())
            }
        }
    }

    // Lazy pool: never connects unless a query actually runs, so these
    // tests fail loudly if the publisher touches the database.
    fn unreachable_pool() -> PgPool {
        PgPool::connect_lazy("postgres://localhost/cardstack_unreachable").unwrap()
    }

    fn publisher_with(store: Arc<dyn UploadStore>) -> Publisher {
        Publisher::new(unreachable_pool(), store)
    }

    #[tokio::test]
    async fn rejected_create_leaves_no_uploaded_file() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn UploadStore> =
            Arc::new(LocalUploadStore::new(dir.path(), "/uploads/blog"));
        let publisher = publisher_with(store);

        let input = ContentInput {
            body: Some("A body without a title.".to_string()),
            ..Default::default()
        };
        let image = ImageUpload {
            filename: "hero.png".to_string(),
            data: PNG_BYTES.to_vec(),
        };

        let err = publisher
            .create(
                ContentKind::Post,
                input,
                Some(image),
                None,
                &PublishSettings::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::Validation(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn upload_skipped_when_fields_invalid() {
        let store = Arc::new(RecordingStore {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let publisher = publisher_with(store.clone());

        let image = ImageUpload {
            filename: "hero.png".to_string(),
            data: PNG_BYTES.to_vec(),
        };
        let err = publisher
            .create(
                ContentKind::Post,
                ContentInput::default(),
                Some(image),
                None,
                &PublishSettings::default(),
            )
            .await
            .unwrap_err();

        match err {
            PublishError::Validation(msgs) => {
                assert!(msgs.iter().any(|m| m.contains("Title")));
                assert!(msgs.iter().any(|m| m.contains("Content")));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failing_upload_blocks_create() {
        let store = Arc::new(RecordingStore {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        let publisher = publisher_with(store.clone());

        let input = ContentInput {
            title: Some("Mail Day Pickups".to_string()),
            body: Some("Fresh slabs from the show.".to_string()),
            ..Default::default()
        };
        let image = ImageUpload {
            filename: "hero.png".to_string(),
            data: PNG_BYTES.to_vec(),
        };

        let err = publisher
            .create(
                ContentKind::Post,
                input,
                Some(image),
                None,
                &PublishSettings::default(),
            )
            .await
            .unwrap_err();

        match err {
            PublishError::Validation(msgs) => {
                assert_eq!(msgs.len(), 1);
                assert!(msgs[0].contains("Failed to upload image"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn slug_candidate_progression() {
        let date = chrono::NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
        let candidates = slug_candidates("about-us", date);

        assert_eq!(candidates[0], "about-us");
        assert_eq!(candidates[1], "about-us-08292026");
        assert_eq!(candidates[2], "about-us-08292026-2");
        assert_eq!(candidates[3], "about-us-08292026-3");
        assert_eq!(candidates.last().unwrap(), "about-us-08292026-99");
        assert_eq!(candidates.len(), 100);
    }

    #[test]
    fn content_input_all_fields_optional() {
        let input: ContentInput = serde_json::from_str("{}").unwrap();
        assert!(input.title.is_none());
        assert!(input.body.is_none());
        assert!(input.categories.is_none());
        assert!(input.tags.is_none());
    }

    #[test]
    fn content_input_with_taxonomy() {
        let input: ContentInput = serde_json::from_str(
            r#"{"title":"Box Break","body":"...","tags":["vintage","psa 10"],"categories":[]}"#,
        )
        .unwrap();
        assert_eq!(input.tags.as_ref().unwrap().len(), 2);
        assert_eq!(input.categories.as_ref().unwrap().len(), 0);
    }

    #[test]
    fn navigation_attach_deserializes() {
        let attach: NavigationAttach = serde_json::from_str(r#"{"location":"footer"}"#).unwrap();
        assert_eq!(attach.location, "footer");
    }
}
