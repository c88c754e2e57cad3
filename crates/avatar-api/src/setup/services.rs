use crate::state::AppState;
use avatar_core::Config;
use avatar_services::{
    AvatarService, ConversionPipeline, MediaStore, MediaValidator, Storage, UiAvatarsPlaceholder,
};
use std::sync::Arc;

/// Wire the media store, conversion pipeline and placeholder into the avatar service
pub fn initialize_services(config: &Config, storage: Arc<dyn Storage>) -> Arc<AppState> {
    let validator = MediaValidator::new(
        config.max_upload_bytes(),
        config.allowed_content_types().to_vec(),
    );
    let store = Arc::new(MediaStore::new(storage.clone(), validator));

    let avatars = Arc::new(AvatarService::new(
        store,
        Arc::new(ConversionPipeline::new()),
        Arc::new(UiAvatarsPlaceholder::new(config.placeholder_base_url())),
        config.conversion_timeout(),
    ));

    tracing::debug!(
        max_upload_bytes = config.max_upload_bytes(),
        allowed_content_types = %config.allowed_content_types().join(","),
        conversion_timeout_secs = config.conversion_timeout().as_secs(),
        "Avatar service initialized"
    );

    Arc::new(AppState {
        config: config.clone(),
        avatars,
        storage,
    })
}
