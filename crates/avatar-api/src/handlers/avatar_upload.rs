use std::sync::Arc;

use avatar_core::constants::AVATAR_FIELD;
use avatar_core::{AppError, AvatarView, VariantName};
use avatar_processing::ImageProcessor;
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};

use crate::auth::OwnerContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Upload (replace) the current owner's avatar
///
/// Expects `multipart/form-data` with the image in the `avatar` field. The upload
/// is validated, every variant is generated, and only then does the new avatar
/// replace the old one. Any failure leaves the previous avatar in place.
#[utoipa::path(
    post,
    path = "/settings/avatar",
    tag = "avatar",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Avatar replaced", body = AvatarView),
        (status = 401, description = "Missing owner identity", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 415, description = "Unsupported image type", body = ErrorResponse),
        (status = 422, description = "Missing field, not an image, or conversion failed",
            body = ErrorResponse),
        (status = 503, description = "Variant generation timed out", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, owner, multipart),
    fields(owner_id = %owner.0.id, operation = "upload_avatar")
)]
pub async fn upload_avatar(
    State(state): State<Arc<AppState>>,
    owner: OwnerContext,
    mut multipart: Multipart,
) -> Result<Json<AvatarView>, HttpAppError> {
    let OwnerContext(owner) = owner;

    let mut upload: Option<(Vec<u8>, String)> = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(AVATAR_FIELD) {
            continue;
        }

        let declared = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(multipart_error)?.to_vec();

        // Clients that omit the part's content type get it sniffed from the bytes
        let content_type = declared
            .or_else(|| ImageProcessor::sniff_content_type(&data).map(str::to_string))
            .unwrap_or_else(|| "application/octet-stream".to_string());

        upload = Some((data, content_type));
        break;
    }

    let (data, content_type) = match upload {
        Some((data, content_type)) if !data.is_empty() => (data, content_type),
        _ => return Err(AppError::MissingField(AVATAR_FIELD.to_string()).into()),
    };

    tracing::debug!(
        size_bytes = data.len(),
        content_type = %content_type,
        "Received avatar upload"
    );

    state.avatars.set(owner.id, data, &content_type).await?;

    let view = state.avatars.view(&owner, VariantName::default()).await?;
    Ok(Json(view))
}

fn multipart_error(err: MultipartError) -> HttpAppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        HttpAppError(AppError::PayloadTooLarge(
            "The avatar exceeds the maximum upload size".to_string(),
        ))
    } else {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid multipart body: {}",
            err.body_text()
        )))
    }
}
