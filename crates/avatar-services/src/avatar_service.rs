//! Avatar lifecycle orchestration.
//!
//! `set` stages the upload, generates every variant on the blocking pool and
//! only then promotes the new generation; any failure rolls the staged
//! generation back. `set` and `clear` hold the owner's lock for their whole
//! duration, `resolve` never takes it.
//!
//! Once the lock is held, each mutation runs in its own task that owns the
//! guard. Dropping the caller's future does not stop it halfway, so a staged
//! generation is always either committed or rolled back.

use crate::error::AvatarResult;
use crate::locks::OwnerLocks;
use crate::media_store::{MediaStore, StagedSlot};
use crate::placeholder::Placeholder;
use avatar_core::{AvatarRef, AvatarView, MediaSlot, Owner, OwnerId, VariantName};
use avatar_processing::{ConversionError, GeneratedVariant, VariantGenerator};
use avatar_storage::StorageError;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

pub struct AvatarService {
    store: Arc<MediaStore>,
    generator: Arc<dyn VariantGenerator>,
    placeholder: Arc<dyn Placeholder>,
    locks: OwnerLocks,
    conversion_timeout: Duration,
}

impl AvatarService {
    pub fn new(
        store: Arc<MediaStore>,
        generator: Arc<dyn VariantGenerator>,
        placeholder: Arc<dyn Placeholder>,
        conversion_timeout: Duration,
    ) -> Self {
        Self {
            store,
            generator,
            placeholder,
            locks: OwnerLocks::new(),
            conversion_timeout,
        }
    }

    pub fn store(&self) -> &Arc<MediaStore> {
        &self.store
    }

    /// Replace the owner's avatar. On error the previous avatar (or its absence)
    /// is left exactly as it was.
    #[tracing::instrument(skip(self, data), fields(owner_id = %owner_id, size_bytes = data.len()))]
    pub async fn set(
        &self,
        owner_id: OwnerId,
        data: Vec<u8>,
        mime_type: &str,
    ) -> AvatarResult<Arc<MediaSlot>> {
        let guard = self.locks.acquire(owner_id).await;

        let store = self.store.clone();
        let generator = self.generator.clone();
        let conversion_timeout = self.conversion_timeout;
        let mime_type = mime_type.to_string();

        let task = tokio::spawn(
            async move {
                let result =
                    replace_slot(&store, generator, conversion_timeout, owner_id, data, &mime_type)
                        .await;
                drop(guard);
                result
            }
            .instrument(tracing::Span::current()),
        );

        let result = match task.await {
            Ok(result) => result,
            Err(join_error) => Err(ConversionError::Aborted(join_error.to_string()).into()),
        };
        self.locks.prune();
        result
    }

    /// Remove the owner's avatar. Clearing an empty slot succeeds.
    #[tracing::instrument(skip(self), fields(owner_id = %owner_id))]
    pub async fn clear(&self, owner_id: OwnerId) -> AvatarResult<()> {
        let guard = self.locks.acquire(owner_id).await;

        let store = self.store.clone();
        let task = tokio::spawn(
            async move {
                let result = store.clear(owner_id).await;
                drop(guard);
                result
            }
            .instrument(tracing::Span::current()),
        );

        let result = match task.await {
            Ok(result) => result,
            Err(join_error) => Err(StorageError::DeleteFailed(join_error.to_string()).into()),
        };
        self.locks.prune();
        result
    }

    /// URL to display for `owner` at `variant`, falling back to the placeholder.
    pub async fn resolve(&self, owner: &Owner, variant: VariantName) -> AvatarResult<AvatarRef> {
        let slot = self.store.get(owner.id).await?;

        let reference = match slot.as_deref().and_then(|slot| slot.variant(variant)) {
            Some(record) => AvatarRef::Stored {
                variant,
                url: record.url.clone(),
                width: record.width,
                height: record.height,
            },
            None => AvatarRef::Placeholder {
                url: self.placeholder.url_for(&owner.name),
            },
        };

        tracing::debug!(
            owner_id = %owner.id,
            variant = %variant,
            placeholder = reference.is_placeholder(),
            "Resolved avatar"
        );

        Ok(reference)
    }

    /// [`resolve`](Self::resolve) packaged with the owner's name and initials.
    pub async fn view(&self, owner: &Owner, variant: VariantName) -> AvatarResult<AvatarView> {
        let reference = self.resolve(owner, variant).await?;
        Ok(AvatarView::new(owner, variant, &reference))
    }

}

/// Stage, convert and promote one upload. Must run with the owner's lock held.
async fn replace_slot(
    store: &MediaStore,
    generator: Arc<dyn VariantGenerator>,
    conversion_timeout: Duration,
    owner_id: OwnerId,
    data: Vec<u8>,
    mime_type: &str,
) -> AvatarResult<Arc<MediaSlot>> {
    let start = std::time::Instant::now();

    let original = Bytes::from(data);
    let mut staged = store.put(owner_id, original.to_vec(), mime_type).await?;

    let outcome = async {
        let variants = generate(generator, conversion_timeout, original, &staged).await?;
        store.stage_variants(&mut staged, variants).await?;
        store.commit(&staged).await
    }
    .await;

    match outcome {
        Ok(slot) => {
            tracing::info!(
                generation = %slot.generation,
                mime_type = %slot.mime_type,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Avatar updated"
            );
            Ok(slot)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Avatar update failed, rolling back");
            store.rollback(staged).await;
            Err(e)
        }
    }
}

async fn generate(
    generator: Arc<dyn VariantGenerator>,
    conversion_timeout: Duration,
    original: Bytes,
    staged: &StagedSlot,
) -> Result<BTreeMap<VariantName, GeneratedVariant>, ConversionError> {
    let mime_type = staged.mime_type.clone();
    let task = tokio::task::spawn_blocking(move || generator.generate(&original, &mime_type));

    match tokio::time::timeout(conversion_timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(ConversionError::Aborted(join_error.to_string())),
        Err(_) => {
            tracing::warn!(
                timeout_secs = conversion_timeout.as_secs_f64(),
                "Variant generation timed out"
            );
            Err(ConversionError::Timeout(conversion_timeout))
        }
    }
}
