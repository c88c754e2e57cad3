//! Avatar Core Library
//!
//! This crate provides the domain models, error types, configuration and constants
//! shared by every avatar component (storage, processing, services, API and CLI).

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{AvatarConfig, BaseConfig, Config};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{AvatarRef, AvatarView, MediaSlot, Owner, OwnerId, VariantName, VariantRecord};
pub use storage_types::StorageBackend;
