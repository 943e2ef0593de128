//! Image upload API routes.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::post;
use axum::Router;
use serde::Serialize;
use tracing::info;

use crate::error::{PublishError, PublishResult};
use crate::state::AppState;

/// Create the file upload router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/files", post(upload_file))
}

#[derive(Serialize)]
struct UploadResponse {
    path: String,
}

/// Accept a multipart image upload and return its public reference path.
/// The path can then be supplied as `hero_image` when saving content.
async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> PublishResult<(StatusCode, Json<UploadResponse>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PublishError::validation(format!("Invalid upload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(String::from)
            .ok_or_else(|| PublishError::validation("Upload is missing a filename"))?;
        let data = field
            .bytes()
            .await
            .map_err(|e| PublishError::validation(format!("Invalid upload: {e}")))?;

        let path = state
            .uploads()
            .store(&filename, &data)
            .await
            .map_err(|e| PublishError::validation(format!("Failed to upload image: {e}")))?;

        info!(%filename, %path, "image uploaded");
        return Ok((StatusCode::CREATED, Json(UploadResponse { path })));
    }

    Err(PublishError::validation("No file field in upload"))
}
