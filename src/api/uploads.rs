use axum::{
    Json,
    extract::{Multipart, State},
};
use std::sync::Arc;

use super::types::{ApiResponse, UploadDto};
use super::{ApiError, AppState};

/// POST /api/dashboard/uploads
///
/// Takes one image as multipart form data and trades it for a durable URL
/// on the image host. The dashboard calls this once per image and collects
/// the URLs into the post form itself; a failure partway through a batch
/// leaves the earlier images hosted but unreferenced.
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<UploadDto>>, ApiError> {
    let max_bytes = state.max_upload_bytes();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Malformed upload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation(format!("Failed to read upload: {e}")))?;

        if bytes.is_empty() {
            return Err(ApiError::validation("Uploaded file is empty"));
        }
        if bytes.len() > max_bytes {
            return Err(ApiError::validation(format!(
                "File exceeds the {} MB upload limit",
                max_bytes / (1024 * 1024)
            )));
        }

        let host = state.image_host();
        let uploaded = host
            .upload(&filename, bytes.to_vec())
            .await
            .map_err(|e| ApiError::upload_error(host.name(), e.to_string()))?;

        return Ok(Json(ApiResponse::success(UploadDto { url: uploaded.url })));
    }

    Err(ApiError::validation("Please select an image"))
}
