//! Avatar Storage Library
//!
//! Storage abstraction plus the local filesystem and in-memory backends.
//!
//! # Storage key format
//!
//! Every object belonging to an owner lives under `avatars/{owner_id}/`:
//!
//! - **Slot manifest**: `avatars/{owner_id}/slot.json`
//! - **Original**: `avatars/{owner_id}/{generation}/original.{ext}`
//! - **Variant**: `avatars/{owner_id}/{generation}/{W}x{H}.{ext}`
//!
//! Keys must not contain `..` or a leading `/`. Key generation is centralized in the
//! `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-memory")]
pub mod memory;
pub mod traits;

// Re-export commonly used types
pub use avatar_core::StorageBackend;
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-memory")]
pub use memory::MemoryStorage;
pub use traits::{Storage, StorageError, StorageResult};
