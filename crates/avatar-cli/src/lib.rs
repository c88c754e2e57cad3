//! Avatar CLI support: HTTP client for the avatar service and the local crop step.
//!
//! Set AVATAR_API_URL (or API_URL) and AVATAR_OWNER_ID / AVATAR_OWNER_NAME, or pass
//! the matching flags to the `avatar` binary.

pub mod api_client;
pub mod crop;

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
