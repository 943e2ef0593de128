//! Testimonial API routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{delete, get, post, put};
use axum::Router;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{PublishError, PublishResult};
use crate::models::testimonial::{CreateTestimonial, UpdateTestimonial};
use crate::models::Testimonial;
use crate::state::AppState;

/// Create the testimonial router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/testimonials", get(list_testimonials))
        .route("/api/testimonials", post(create_testimonial))
        .route("/api/testimonials/featured", get(list_featured))
        .route("/api/testimonials/{id}", get(get_testimonial))
        .route("/api/testimonials/{id}", put(update_testimonial))
        .route("/api/testimonials/{id}", delete(delete_testimonial))
}

#[derive(Deserialize)]
struct ListQuery {
    page: Option<i64>,
}

const PER_PAGE: i64 = 20;

async fn list_testimonials(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> PublishResult<Json<Vec<Testimonial>>> {
    let page = query.page.unwrap_or(1).max(1);
    let testimonials =
        Testimonial::list(state.pool(), PER_PAGE, (page - 1) * PER_PAGE).await?;
    Ok(Json(testimonials))
}

async fn list_featured(State(state): State<AppState>) -> PublishResult<Json<Vec<Testimonial>>> {
    Ok(Json(Testimonial::list_featured(state.pool(), PER_PAGE).await?))
}

async fn create_testimonial(
    State(state): State<AppState>,
    Json(input): Json<CreateTestimonial>,
) -> PublishResult<(StatusCode, Json<Testimonial>)> {
    let mut errors = Vec::new();
    if input.author_name.trim().is_empty() {
        errors.push("Author name is required".to_string());
    }
    if input.content.trim().is_empty() {
        errors.push("Testimonial content is required".to_string());
    }
    if !errors.is_empty() {
        return Err(PublishError::Validation(errors));
    }

    let testimonial = Testimonial::create(state.pool(), input).await?;
    Ok((StatusCode::CREATED, Json(testimonial)))
}

async fn get_testimonial(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> PublishResult<Json<Testimonial>> {
    let testimonial = Testimonial::find_by_id(state.pool(), id)
        .await?
        .ok_or(PublishError::NotFound)?;
    Ok(Json(testimonial))
}

async fn update_testimonial(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateTestimonial>,
) -> PublishResult<Json<Testimonial>> {
    let mut errors = Vec::new();
    if matches!(input.author_name.as_deref().map(str::trim), Some("")) {
        errors.push("Author name is required".to_string());
    }
    if matches!(input.content.as_deref().map(str::trim), Some("")) {
        errors.push("Testimonial content is required".to_string());
    }
    if !errors.is_empty() {
        return Err(PublishError::Validation(errors));
    }

    let testimonial = Testimonial::update(state.pool(), id, input)
        .await?
        .ok_or(PublishError::NotFound)?;
    Ok(Json(testimonial))
}

async fn delete_testimonial(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> PublishResult<StatusCode> {
    let deleted = Testimonial::delete(state.pool(), id).await?;
    if !deleted {
        return Err(PublishError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
