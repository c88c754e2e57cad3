use std::sync::Arc;

use avatar_core::{AppError, AvatarView, Owner, OwnerId, VariantName};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ResolveQuery {
    /// One of `40x40`, `80x80`, `160x160`; defaults to `80x80`
    pub variant: Option<String>,
    /// Display name used for the placeholder when no avatar is stored
    pub name: Option<String>,
}

/// Resolve the avatar to display for an owner
///
/// Returns the stored variant's URL when the owner has an avatar, otherwise the
/// placeholder generated from `name`. Read-only.
#[utoipa::path(
    get,
    path = "/avatars/{owner_id}",
    tag = "avatar",
    params(
        ("owner_id" = Uuid, Path, description = "Owner (account) ID"),
        ResolveQuery
    ),
    responses(
        (status = 200, description = "Stored variant or placeholder", body = AvatarView),
        (status = 400, description = "Unknown variant or malformed owner id", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, query),
    fields(owner_id = %owner_id, operation = "resolve_avatar")
)]
pub async fn resolve_avatar(
    State(state): State<Arc<AppState>>,
    Path(owner_id): Path<String>,
    Query(query): Query<ResolveQuery>,
) -> Result<Json<AvatarView>, HttpAppError> {
    let owner_id: OwnerId = owner_id
        .parse::<Uuid>()
        .map_err(AppError::from)?
        .into();

    let variant = match query.variant.as_deref() {
        Some(raw) if !raw.is_empty() => raw.parse::<VariantName>().map_err(AppError::from)?,
        _ => VariantName::default(),
    };

    let owner = Owner::new(owner_id, query.name.unwrap_or_default());
    let view = state.avatars.view(&owner, variant).await?;
    Ok(Json(view))
}
