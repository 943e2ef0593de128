//! Content API routes.
//!
//! REST endpoints for posts and pages. Posts carry taxonomy; pages may
//! request a navigation-menu attachment on create, which is best-effort and
//! reported through the `warnings` field of the response.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{delete, get, post, put};
use axum::Router;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PublishError, PublishResult};
use crate::models::{ContentItem, ContentKind, PublishSettings};
use crate::services::publisher::NavigationAttach;
use crate::services::{associations, ContentInput};
use crate::state::AppState;

/// Create the content router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/posts", get(list_posts))
        .route("/api/posts", post(create_post))
        .route("/api/posts/{id}", get(get_post))
        .route("/api/posts/{id}", put(update_post))
        .route("/api/posts/{id}", delete(delete_post))
        .route("/api/pages", get(list_pages))
        .route("/api/pages", post(create_page))
        .route("/api/pages/{id}", get(get_page))
        .route("/api/pages/{id}", put(update_page))
        .route("/api/pages/{id}", delete(delete_page))
}

#[derive(Deserialize)]
struct CreateContentRequest {
    #[serde(flatten)]
    input: ContentInput,
    /// Pages only: attach the new page to the navigation menu.
    navigation: Option<NavigationAttach>,
}

#[derive(Deserialize)]
struct ListQuery {
    status: Option<i16>,
    page: Option<i64>,
}

#[derive(Serialize)]
struct ContentResponse {
    #[serde(flatten)]
    item: ContentItem,
    categories: Vec<crate::models::Category>,
    tags: Vec<crate::models::Tag>,
}

#[derive(Serialize)]
struct PublishResponse {
    item: ContentItem,
    warnings: Vec<String>,
}

#[derive(Serialize)]
struct ListResponse {
    items: Vec<ContentItem>,
    total: i64,
    page: i64,
    per_page: i64,
}

async fn create_content(
    state: AppState,
    kind: ContentKind,
    request: CreateContentRequest,
) -> PublishResult<(StatusCode, Json<PublishResponse>)> {
    let settings = PublishSettings::load(state.pool()).await?;

    let outcome = state
        .publisher()
        .create(kind, request.input, None, request.navigation, &settings)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PublishResponse {
            item: outcome.item,
            warnings: outcome.warnings,
        }),
    ))
}

async fn update_content(
    state: AppState,
    kind: ContentKind,
    id: Uuid,
    input: ContentInput,
) -> PublishResult<Json<PublishResponse>> {
    // Reject cross-kind access (a page id on the post endpoint)
    let existing = ContentItem::find_by_id(state.pool(), id)
        .await?
        .ok_or(PublishError::NotFound)?;
    if existing.kind != kind.as_str() {
        return Err(PublishError::NotFound);
    }

    let settings = PublishSettings::load(state.pool()).await?;
    let outcome = state.publisher().update(id, input, None, &settings).await?;

    Ok(Json(PublishResponse {
        item: outcome.item,
        warnings: outcome.warnings,
    }))
}

async fn get_content(
    state: AppState,
    kind: ContentKind,
    id: Uuid,
) -> PublishResult<Json<ContentResponse>> {
    let item = ContentItem::find_by_id(state.pool(), id)
        .await?
        .ok_or(PublishError::NotFound)?;
    if item.kind != kind.as_str() {
        return Err(PublishError::NotFound);
    }

    let categories = associations::categories_for(state.pool(), id).await?;
    let tags = associations::tags_for(state.pool(), id).await?;

    Ok(Json(ContentResponse {
        item,
        categories,
        tags,
    }))
}

async fn list_content(
    state: AppState,
    kind: ContentKind,
    query: ListQuery,
) -> PublishResult<Json<ListResponse>> {
    let settings = PublishSettings::load(state.pool()).await?;
    let per_page = settings.posts_per_page;
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let items = ContentItem::list(state.pool(), kind, query.status, per_page, offset).await?;
    let total = ContentItem::count(state.pool(), kind, query.status).await?;

    Ok(Json(ListResponse {
        items,
        total,
        page,
        per_page,
    }))
}

async fn delete_content(state: AppState, kind: ContentKind, id: Uuid) -> PublishResult<StatusCode> {
    let existing = ContentItem::find_by_id(state.pool(), id)
        .await?
        .ok_or(PublishError::NotFound)?;
    if existing.kind != kind.as_str() {
        return Err(PublishError::NotFound);
    }

    state.publisher().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// -------------------------------------------------------------------------
// Post handlers
// -------------------------------------------------------------------------

async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> PublishResult<Json<ListResponse>> {
    list_content(state, ContentKind::Post, query).await
}

async fn create_post(
    State(state): State<AppState>,
    Json(request): Json<CreateContentRequest>,
) -> PublishResult<(StatusCode, Json<PublishResponse>)> {
    create_content(state, ContentKind::Post, request).await
}

async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> PublishResult<Json<ContentResponse>> {
    get_content(state, ContentKind::Post, id).await
}

async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ContentInput>,
) -> PublishResult<Json<PublishResponse>> {
    update_content(state, ContentKind::Post, id, input).await
}

async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> PublishResult<StatusCode> {
    delete_content(state, ContentKind::Post, id).await
}

// -------------------------------------------------------------------------
// Page handlers
// -------------------------------------------------------------------------

async fn list_pages(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> PublishResult<Json<ListResponse>> {
    list_content(state, ContentKind::Page, query).await
}

async fn create_page(
    State(state): State<AppState>,
    Json(request): Json<CreateContentRequest>,
) -> PublishResult<(StatusCode, Json<PublishResponse>)> {
    create_content(state, ContentKind::Page, request).await
}

async fn get_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> PublishResult<Json<ContentResponse>> {
    get_content(state, ContentKind::Page, id).await
}

async fn update_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ContentInput>,
) -> PublishResult<Json<PublishResponse>> {
    update_content(state, ContentKind::Page, id, input).await
}

async fn delete_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> PublishResult<StatusCode> {
    delete_content(state, ContentKind::Page, id).await
}
