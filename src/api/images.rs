use crate::api::AppState;
use crate::api::middleware::AdminSession;
use crate::api::products::{invalid_form, read_upload};
use crate::domain::catalog::StoredImage;
use crate::error::{AppError, Result};
use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};

pub async fn list_images(State(state): State<AppState>, _session: AdminSession) -> Result<Json<Vec<StoredImage>>> {
    Ok(Json(state.image_service.list().await?))
}

/// Accepts a multipart form with a single `image` file.
pub async fn upload_image(State(state): State<AppState>, _session: AdminSession, mut multipart: Multipart) -> Result<StatusCode> {
    while let Some(field) = multipart.next_field().await.map_err(invalid_form)? {
        if field.name() != Some("image") {
            continue;
        }
        if let Some(image) = read_upload(field).await? {
            state.image_service.upload(image).await?;
            return Ok(StatusCode::CREATED);
        }
    }
    Err(AppError::Validation("Image is required".into()))
}

pub async fn delete_image(State(state): State<AppState>, _session: AdminSession, Path(key): Path<String>) -> Result<StatusCode> {
    state.image_service.delete(&key).await?;
    Ok(StatusCode::NO_CONTENT)
}
