//! Shared key generation for storage backends.
//!
//! Key format: `avatars/{owner_id}/slot.json` for the manifest and
//! `avatars/{owner_id}/{generation}/{name}.{ext}` for image objects.

use avatar_core::{OwnerId, VariantName};
use uuid::Uuid;

const ROOT: &str = "avatars";
const MANIFEST_FILE: &str = "slot.json";
const ORIGINAL_STEM: &str = "original";

/// Prefix shared by every object belonging to `owner`.
pub fn slot_prefix(owner: &OwnerId) -> String {
    format!("{}/{}", ROOT, owner)
}

/// Key of the committed slot manifest for `owner`.
pub fn manifest_key(owner: &OwnerId) -> String {
    format!("{}/{}", slot_prefix(owner), MANIFEST_FILE)
}

/// Prefix of one upload generation.
pub fn generation_prefix(owner: &OwnerId, generation: Uuid) -> String {
    format!("{}/{}", slot_prefix(owner), generation)
}

pub fn original_key(owner: &OwnerId, generation: Uuid, extension: &str) -> String {
    format!(
        "{}/{}.{}",
        generation_prefix(owner, generation),
        ORIGINAL_STEM,
        extension
    )
}

pub fn variant_key(
    owner: &OwnerId,
    generation: Uuid,
    variant: VariantName,
    extension: &str,
) -> String {
    format!(
        "{}/{}.{}",
        generation_prefix(owner, generation),
        variant.as_str(),
        extension
    )
}

/// File extension used for a raster content type. Unknown types fall back to `bin`.
pub fn extension_for(content_type: &str) -> &'static str {
    match content_type.to_lowercase().as_str() {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/bmp" => "bmp",
        "application/json" => "json",
        _ => "bin",
    }
}

/// Content type to serve a stored object with, derived from its extension.
pub fn content_type_for_key(storage_key: &str) -> &'static str {
    let extension = storage_key
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}
