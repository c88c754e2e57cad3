pub mod avatar_delete;
pub mod avatar_resolve;
pub mod avatar_upload;
pub mod media_get;
