use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{auth::extractors::CurrentUser, error::AppError, state::AppState};

use super::store::generate_filename;

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

pub const ALLOWED_IMAGE_TYPES: &[&str] =
    &["image/jpeg", "image/png", "image/webp", "image/gif"];

// The transport limit sits above MAX_UPLOAD_BYTES so an oversized file is
// answered with our 400, not a generic 413.
const BODY_LIMIT_BYTES: usize = 8 * 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
}

#[instrument(skip(state, multipart))]
pub async fn upload(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut file = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            let original_name = field.file_name().map(|s| s.to_string());
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_default();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            file = Some((original_name, content_type, data));
            break;
        }
    }

    let Some((original_name, content_type, data)) = file else {
        return Err(AppError::BadRequest("No file provided".into()));
    };

    if !ALLOWED_IMAGE_TYPES.contains(&content_type.as_str()) {
        warn!(user_id = %user_id, %content_type, "upload rejected");
        return Err(AppError::BadRequest("Invalid file type".into()));
    }

    if data.len() > MAX_UPLOAD_BYTES {
        warn!(user_id = %user_id, bytes = data.len(), "upload rejected");
        return Err(AppError::BadRequest("File too large (max 5MB)".into()));
    }

    let filename = generate_filename(original_name.as_deref());
    state.uploads.put(&filename, data).await?;

    info!(user_id = %user_id, %filename, "file uploaded");
    Ok(Json(UploadResponse {
        url: format!("/uploads/{}", filename),
    }))
}
