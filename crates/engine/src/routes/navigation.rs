//! Navigation API routes.
//!
//! REST endpoints for menu entries and the bulk category-label operations
//! (rename, reassign-and-remove).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{delete, get, post, put};
use axum::Router;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PublishResult;
use crate::models::NavigationItem;
use crate::services::navigation::{self, NavigationInput};
use crate::state::AppState;

/// Create the navigation router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/navigation", get(list_items))
        .route("/api/navigation", post(create_item))
        .route("/api/navigation/{id}", put(update_item))
        .route("/api/navigation/{id}", delete(delete_item))
        .route("/api/navigation/categories", get(list_categories))
        .route("/api/navigation/categories/rename", post(rename_category))
        .route("/api/navigation/categories/remove", post(remove_category))
}

#[derive(Deserialize)]
struct RenameCategoryRequest {
    old: String,
    new: String,
}

#[derive(Deserialize)]
struct RemoveCategoryRequest {
    old: String,
    replacement: String,
}

#[derive(Serialize)]
struct RewriteResponse {
    rows_updated: u64,
}

async fn list_items(State(state): State<AppState>) -> PublishResult<Json<Vec<NavigationItem>>> {
    Ok(Json(NavigationItem::list(state.pool()).await?))
}

async fn create_item(
    State(state): State<AppState>,
    Json(input): Json<NavigationInput>,
) -> PublishResult<(StatusCode, Json<NavigationItem>)> {
    let item = navigation::upsert(state.pool(), None, input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<NavigationInput>,
) -> PublishResult<Json<NavigationItem>> {
    let item = navigation::upsert(state.pool(), Some(id), input).await?;
    Ok(Json(item))
}

async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> PublishResult<StatusCode> {
    navigation::delete(state.pool(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_categories(State(state): State<AppState>) -> PublishResult<Json<Vec<String>>> {
    Ok(Json(NavigationItem::categories(state.pool()).await?))
}

async fn rename_category(
    State(state): State<AppState>,
    Json(request): Json<RenameCategoryRequest>,
) -> PublishResult<Json<RewriteResponse>> {
    let rows_updated =
        navigation::rename_category(state.pool(), &request.old, &request.new).await?;
    Ok(Json(RewriteResponse { rows_updated }))
}

async fn remove_category(
    State(state): State<AppState>,
    Json(request): Json<RemoveCategoryRequest>,
) -> PublishResult<Json<RewriteResponse>> {
    let rows_updated =
        navigation::reassign_and_remove_category(state.pool(), &request.old, &request.replacement)
            .await?;
    Ok(Json(RewriteResponse { rows_updated }))
}
