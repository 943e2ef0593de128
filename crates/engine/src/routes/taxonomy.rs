//! Taxonomy API routes.
//!
//! REST endpoints for categories and tags: listing with usage counts,
//! lookup-or-create, rename, and cascade delete.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{delete, get, post, put};
use axum::Router;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PublishResult;
use crate::models::{Category, Tag, TermWithCount};
use crate::services::taxonomy::{self, TaxonomyKind};
use crate::state::AppState;

/// Create the taxonomy router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/categories", get(list_categories))
        .route("/api/categories", post(create_category))
        .route("/api/categories/{id}", put(rename_category))
        .route("/api/categories/{id}", delete(delete_category))
        .route("/api/tags", get(list_tags))
        .route("/api/tags", post(create_tag))
        .route("/api/tags/{id}", put(rename_tag))
        .route("/api/tags/{id}", delete(delete_tag))
}

#[derive(Deserialize)]
struct NameRequest {
    name: String,
}

#[derive(Serialize)]
struct TermResponse {
    id: Uuid,
}

async fn find_or_create(state: &AppState, kind: TaxonomyKind, name: &str) -> PublishResult<Uuid> {
    let mut conn = state.pool().acquire().await?;
    taxonomy::find_or_create(&mut conn, kind, name).await
}

// -------------------------------------------------------------------------
// Category handlers
// -------------------------------------------------------------------------

async fn list_categories(State(state): State<AppState>) -> PublishResult<Json<Vec<TermWithCount>>> {
    Ok(Json(Category::list_with_counts(state.pool()).await?))
}

async fn create_category(
    State(state): State<AppState>,
    Json(request): Json<NameRequest>,
) -> PublishResult<(StatusCode, Json<TermResponse>)> {
    let id = find_or_create(&state, TaxonomyKind::Category, &request.name).await?;
    Ok((StatusCode::CREATED, Json(TermResponse { id })))
}

async fn rename_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<NameRequest>,
) -> PublishResult<StatusCode> {
    taxonomy::rename(state.pool(), TaxonomyKind::Category, id, &request.name).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> PublishResult<StatusCode> {
    taxonomy::delete(state.pool(), TaxonomyKind::Category, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// -------------------------------------------------------------------------
// Tag handlers
// -------------------------------------------------------------------------

async fn list_tags(State(state): State<AppState>) -> PublishResult<Json<Vec<TermWithCount>>> {
    Ok(Json(Tag::list_with_counts(state.pool()).await?))
}

async fn create_tag(
    State(state): State<AppState>,
    Json(request): Json<NameRequest>,
) -> PublishResult<(StatusCode, Json<TermResponse>)> {
    let id = find_or_create(&state, TaxonomyKind::Tag, &request.name).await?;
    Ok((StatusCode::CREATED, Json(TermResponse { id })))
}

async fn rename_tag(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<NameRequest>,
) -> PublishResult<StatusCode> {
    taxonomy::rename(state.pool(), TaxonomyKind::Tag, id, &request.name).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_tag(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> PublishResult<StatusCode> {
    taxonomy::delete(state.pool(), TaxonomyKind::Tag, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
