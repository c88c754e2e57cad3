//! OpenAPI documentation, served at `/api/openapi.json`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use avatar_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Avatar API",
        version = "0.1.0",
        description = "Upload, remove and resolve account avatars (40x40, 80x80 and 160x160)."
    ),
    paths(
        handlers::avatar_upload::upload_avatar,
        handlers::avatar_delete::delete_avatar,
        handlers::avatar_resolve::resolve_avatar,
        handlers::media_get::get_media,
    ),
    components(schemas(
        models::AvatarView,
        models::AvatarRef,
        models::VariantName,
        models::OwnerId,
        error::ErrorResponse,
    )),
    tags(
        (name = "avatar", description = "Avatar lifecycle for the signed-in owner"),
        (name = "media", description = "Stored avatar images")
    )
)]
pub struct ApiDoc;

pub fn openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
