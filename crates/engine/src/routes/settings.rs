//! Site settings API routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, put};
use axum::Router;
use serde::Deserialize;

use crate::error::{PublishError, PublishResult};
use crate::models::{PublishSettings, SiteSettings};
use crate::state::AppState;

/// Create the settings router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/settings", get(get_settings))
        .route("/api/settings", put(update_settings))
}

/// Partial settings update; absent fields are left unchanged.
#[derive(Deserialize)]
struct UpdateSettingsRequest {
    posts_per_page: Option<i64>,
    excerpt_length: Option<u64>,
    show_author: Option<bool>,
    allow_comments: Option<bool>,
}

async fn get_settings(State(state): State<AppState>) -> PublishResult<Json<PublishSettings>> {
    Ok(Json(PublishSettings::load(state.pool()).await?))
}

/// Range checks before anything is persisted. `posts_per_page` feeds a SQL
/// LIMIT, so a bad value would break every listing endpoint until fixed.
fn validate(request: &UpdateSettingsRequest) -> Vec<String> {
    let mut errors = Vec::new();
    if matches!(request.posts_per_page, Some(v) if v < 1) {
        errors.push("Posts per page must be at least 1".to_string());
    }
    if matches!(request.excerpt_length, Some(0)) {
        errors.push("Excerpt length must be at least 1".to_string());
    }
    errors
}

async fn update_settings(
    State(state): State<AppState>,
    Json(request): Json<UpdateSettingsRequest>,
) -> PublishResult<StatusCode> {
    let errors = validate(&request);
    if !errors.is_empty() {
        return Err(PublishError::Validation(errors));
    }

    if let Some(v) = request.posts_per_page {
        SiteSettings::set(state.pool(), "posts_per_page", serde_json::json!(v)).await?;
    }
    if let Some(v) = request.excerpt_length {
        SiteSettings::set(state.pool(), "excerpt_length", serde_json::json!(v)).await?;
    }
    if let Some(v) = request.show_author {
        SiteSettings::set(state.pool(), "show_author", serde_json::json!(v)).await?;
    }
    if let Some(v) = request.allow_comments {
        SiteSettings::set(state.pool(), "allow_comments", serde_json::json!(v)).await?;
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn request(posts_per_page: Option<i64>, excerpt_length: Option<u64>) -> UpdateSettingsRequest {
        UpdateSettingsRequest {
            posts_per_page,
            excerpt_length,
            show_author: None,
            allow_comments: None,
        }
    }

    #[test]
    fn rejects_non_positive_posts_per_page() {
        assert!(!validate(&request(Some(-5), None)).is_empty());
        assert!(!validate(&request(Some(0), None)).is_empty());
        assert!(validate(&request(Some(10), None)).is_empty());
    }

    #[test]
    fn rejects_zero_excerpt_length() {
        assert!(!validate(&request(None, Some(0))).is_empty());
        assert!(validate(&request(None, Some(160))).is_empty());
    }

    #[test]
    fn absent_fields_pass() {
        assert!(validate(&request(None, None)).is_empty());
    }
}
