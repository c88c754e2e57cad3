//! Route configuration and setup.
//!
//! Health checks live in [health](health).

mod health;

use crate::handlers::{avatar_delete, avatar_resolve, avatar_upload, media_get};
use crate::state::AppState;
use avatar_core::Config;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Room for multipart boundaries and part headers on top of the image itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    // The image limit itself is enforced by the validator so oversized files get a
    // FILE_TOO_LARGE error; this only stops unbounded bodies.
    let settings_routes = Router::new()
        .route(
            "/settings/avatar",
            post(avatar_upload::upload_avatar).delete(avatar_delete::delete_avatar),
        )
        .layer(DefaultBodyLimit::max(
            config.max_upload_bytes() + MULTIPART_OVERHEAD_BYTES,
        ));

    let public_routes = Router::new()
        .route("/avatars/{owner_id}", get(avatar_resolve::resolve_avatar))
        .route("/media/{*key}", get(media_get::get_media))
        .route("/health/live", get(health::liveness_check))
        .route("/health/ready", get(health::readiness_check))
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::openapi_spec()) }),
        );

    let app = settings_routes
        .merge(public_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        if config.is_production() {
            tracing::warn!("CORS configured to allow all origins - not recommended for production");
        }
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
