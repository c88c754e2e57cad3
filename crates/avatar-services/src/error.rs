use avatar_processing::{ConversionError, ValidationError};
use avatar_storage::StorageError;
use thiserror::Error;

/// Failure of an avatar operation. Every variant leaves the owner's committed
/// slot as it was before the call.
#[derive(Debug, Error)]
pub enum AvatarError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type AvatarResult<T> = Result<T, AvatarError>;
