use std::sync::Arc;

use avatar_core::AppError;
use avatar_storage::keys;
use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Serve a stored avatar image
///
/// Only image objects are served; manifests and other metadata are not exposed.
#[utoipa::path(
    get,
    path = "/media/{key}",
    tag = "media",
    params(
        ("key" = String, Path,
            description = "Storage key, e.g. avatars/{owner}/{generation}/80x80.png")
    ),
    responses(
        (status = 200, description = "Image bytes with the stored content type"),
        (status = 404, description = "No such object", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "get_media"))]
pub async fn get_media(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let content_type = keys::content_type_for_key(&key);
    if !content_type.starts_with("image/") {
        return Err(AppError::NotFound(key).into());
    }

    let data = state.storage.download(&key).await?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            // Every upload gets a fresh generation key, so objects never change in place
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable"),
        ],
        data,
    ))
}
