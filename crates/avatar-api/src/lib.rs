//! Avatar API Library
//!
//! HTTP handlers, owner extraction and application setup for the avatar service.

mod api_doc;
mod handlers;
mod telemetry;

pub mod auth;
pub mod error;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use telemetry::init_telemetry;
