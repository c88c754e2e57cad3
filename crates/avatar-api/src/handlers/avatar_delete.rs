use std::sync::Arc;

use avatar_core::{AvatarView, VariantName};
use axum::{extract::State, Json};

use crate::auth::OwnerContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Remove the current owner's avatar
///
/// Idempotent: deleting when no avatar is set succeeds. The response shows the
/// placeholder that is displayed from now on.
#[utoipa::path(
    delete,
    path = "/settings/avatar",
    tag = "avatar",
    responses(
        (status = 200, description = "Avatar removed (or was already absent)", body = AvatarView),
        (status = 401, description = "Missing owner identity", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, owner),
    fields(owner_id = %owner.0.id, operation = "delete_avatar")
)]
pub async fn delete_avatar(
    State(state): State<Arc<AppState>>,
    owner: OwnerContext,
) -> Result<Json<AvatarView>, HttpAppError> {
    let OwnerContext(owner) = owner;

    state.avatars.clear(owner.id).await?;

    let view = state.avatars.view(&owner, VariantName::default()).await?;
    Ok(Json(view))
}
