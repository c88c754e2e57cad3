//! Avatar Services Layer
//!
//! Orchestration for the single-slot avatar collection: `MediaStore` owns slot
//! state, `AvatarService` sequences validation, variant generation and promotion
//! under per-owner locks, and `Placeholder` supplies the fallback URL. The API
//! crate depends on this facade rather than on storage and processing directly.

pub mod avatar_service;
pub mod error;
pub mod locks;
pub mod media_store;
pub mod placeholder;

pub use avatar_service::AvatarService;
pub use error::{AvatarError, AvatarResult};
pub use locks::OwnerLocks;
pub use media_store::{MediaStore, StagedSlot};
pub use placeholder::{Placeholder, UiAvatarsPlaceholder};

pub use avatar_processing::{
    ConversionError, ConversionPipeline, CropEngine, CropError, CropRect, MediaValidator,
    ValidationError, VariantGenerator,
};
pub use avatar_storage::{
    create_storage, LocalStorage, MemoryStorage, Storage, StorageBackend, StorageError,
    StorageResult,
};
