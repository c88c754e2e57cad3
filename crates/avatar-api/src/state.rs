//! Application state shared by all handlers.

use avatar_core::Config;
use avatar_services::{AvatarService, Storage};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub avatars: Arc<AvatarService>,
    /// Same backend the avatar service writes to; read directly to serve media bytes.
    pub storage: Arc<dyn Storage>,
}
