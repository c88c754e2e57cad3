//! Single-slot "avatar" collection.
//!
//! New uploads are written under a fresh generation prefix and stay invisible
//! until [`MediaStore::commit`] rewrites the owner's manifest and swaps the
//! in-memory slot pointer. Readers always see either the previous slot or the
//! complete new one. Superseded generations are deleted after the swap.
//!
//! Only committed slots are cached. Owners without an avatar are looked up in
//! storage on every read, so unknown ids cannot grow the cache.

use crate::error::AvatarResult;
use avatar_core::constants::AVATAR_COLLECTION;
use avatar_core::{MediaSlot, OwnerId, VariantName, VariantRecord};
use avatar_processing::{ConversionError, GeneratedVariant, MediaValidator};
use avatar_storage::{keys, Storage, StorageError};
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// An uploaded original plus whatever variants have been written for it so far.
/// Not visible to readers until committed.
#[derive(Debug, Clone)]
pub struct StagedSlot {
    pub owner_id: OwnerId,
    pub generation: Uuid,
    pub original_key: String,
    pub original_url: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub width: u32,
    pub height: u32,
    pub variants: BTreeMap<VariantName, VariantRecord>,
}

impl StagedSlot {
    fn written_keys(&self) -> Vec<String> {
        std::iter::once(self.original_key.clone())
            .chain(self.variants.values().map(|v| v.storage_key.clone()))
            .collect()
    }
}

pub struct MediaStore {
    storage: Arc<dyn Storage>,
    validator: MediaValidator,
    slots: RwLock<HashMap<OwnerId, Arc<MediaSlot>>>,
    /// Bumped under the `slots` write lock by every commit and clear.
    epoch: AtomicU64,
}

impl MediaStore {
    pub fn new(storage: Arc<dyn Storage>, validator: MediaValidator) -> Self {
        Self {
            storage,
            validator,
            slots: RwLock::new(HashMap::new()),
            epoch: AtomicU64::new(0),
        }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn validator(&self) -> &MediaValidator {
        &self.validator
    }

    /// Validate and stage a new original under a fresh generation.
    #[tracing::instrument(skip(self, data), fields(owner_id = %owner_id, size_bytes = data.len()))]
    pub async fn put(
        &self,
        owner_id: OwnerId,
        data: Vec<u8>,
        mime_type: &str,
    ) -> AvatarResult<StagedSlot> {
        let validated = self.validator.validate(&data, mime_type)?;

        let generation = Uuid::new_v4();
        let original_key = keys::original_key(
            &owner_id,
            generation,
            keys::extension_for(&validated.content_type),
        );
        let size_bytes = data.len() as u64;

        let original_url = self
            .storage
            .upload_with_key(&original_key, data, &validated.content_type)
            .await?;

        tracing::debug!(
            collection = AVATAR_COLLECTION,
            generation = %generation,
            storage_key = %original_key,
            "Staged avatar original"
        );

        Ok(StagedSlot {
            owner_id,
            generation,
            original_key,
            original_url,
            mime_type: validated.content_type,
            size_bytes,
            width: validated.width,
            height: validated.height,
            variants: BTreeMap::new(),
        })
    }

    /// Write generated variants into the staged generation.
    pub async fn stage_variants(
        &self,
        staged: &mut StagedSlot,
        variants: BTreeMap<VariantName, GeneratedVariant>,
    ) -> AvatarResult<()> {
        for (name, variant) in variants {
            let storage_key = keys::variant_key(
                &staged.owner_id,
                staged.generation,
                name,
                keys::extension_for(&variant.content_type),
            );
            let size_bytes = variant.data.len() as u64;
            let url = self
                .storage
                .upload_with_key(&storage_key, variant.data.to_vec(), &variant.content_type)
                .await?;

            staged.variants.insert(
                name,
                VariantRecord {
                    name,
                    width: variant.width,
                    height: variant.height,
                    storage_key,
                    url,
                    size_bytes,
                },
            );
        }
        Ok(())
    }

    /// Promote a staged generation to the owner's visible slot.
    ///
    /// The manifest is written first; if that fails nothing has changed and the
    /// caller should [`rollback`](Self::rollback). The previous generation is
    /// deleted once the new one is visible.
    #[tracing::instrument(
        skip(self, staged),
        fields(owner_id = %staged.owner_id, generation = %staged.generation)
    )]
    pub async fn commit(&self, staged: &StagedSlot) -> AvatarResult<Arc<MediaSlot>> {
        // Resolve the superseded slot up front so a manifest left by a previous
        // process is collected too. An unreadable manifest is simply overwritten.
        let previous = match self.get(staged.owner_id).await {
            Ok(previous) => previous,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read previous avatar manifest");
                None
            }
        };

        let slot = MediaSlot {
            owner_id: staged.owner_id,
            generation: staged.generation,
            original_key: staged.original_key.clone(),
            original_url: staged.original_url.clone(),
            mime_type: staged.mime_type.clone(),
            size_bytes: staged.size_bytes,
            width: staged.width,
            height: staged.height,
            created_at: Utc::now(),
            variants: staged.variants.clone(),
        };

        if !slot.is_complete() {
            let missing: Vec<&str> = VariantName::ALL
                .iter()
                .filter(|name| slot.variant(**name).is_none())
                .map(|name| name.as_str())
                .collect();
            return Err(ConversionError::Aborted(format!(
                "missing variants: {}",
                missing.join(", ")
            ))
            .into());
        }

        let manifest = serde_json::to_vec_pretty(&slot)
            .map_err(|e| StorageError::BackendError(format!("Failed to encode manifest: {}", e)))?;
        self.storage
            .upload_with_key(
                &keys::manifest_key(&slot.owner_id),
                manifest,
                "application/json",
            )
            .await?;

        let slot = Arc::new(slot);
        {
            let mut slots = self.slots.write().await;
            slots.insert(slot.owner_id, slot.clone());
            self.epoch.fetch_add(1, Ordering::AcqRel);
        }

        if let Some(previous) = previous {
            if previous.generation != slot.generation {
                self.delete_keys(&previous.storage_keys()).await;
            }
        }

        tracing::info!(
            variant_count = slot.variants.len(),
            size_bytes = slot.size_bytes,
            "Avatar slot committed"
        );

        Ok(slot)
    }

    /// Discard a staged generation. The committed slot is untouched.
    #[tracing::instrument(
        skip(self, staged),
        fields(owner_id = %staged.owner_id, generation = %staged.generation)
    )]
    pub async fn rollback(&self, staged: StagedSlot) {
        self.delete_keys(&staged.written_keys()).await;
        tracing::info!("Staged avatar discarded");
    }

    /// Remove the owner's slot. Succeeds when there is nothing to remove.
    ///
    /// Everything under the owner's prefix goes, including generations an
    /// unreadable manifest no longer points at.
    #[tracing::instrument(skip(self), fields(owner_id = %owner_id))]
    pub async fn clear(&self, owner_id: OwnerId) -> AvatarResult<()> {
        let current = match self.get(owner_id).await {
            Ok(current) => current,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read avatar manifest, clearing it anyway");
                None
            }
        };

        self.storage.delete(&keys::manifest_key(&owner_id)).await?;
        {
            let mut slots = self.slots.write().await;
            slots.remove(&owner_id);
            self.epoch.fetch_add(1, Ordering::AcqRel);
        }

        let prefix = keys::slot_prefix(&owner_id);
        if let Err(e) = self.storage.delete_prefix(&prefix).await {
            tracing::warn!(prefix = %prefix, error = %e, "Failed to delete avatar objects");
        }

        match current {
            Some(slot) => tracing::info!(generation = %slot.generation, "Avatar slot cleared"),
            None => tracing::debug!("No avatar slot to clear"),
        }

        Ok(())
    }

    /// Current committed slot, loading the manifest when it is not cached.
    pub async fn get(&self, owner_id: OwnerId) -> AvatarResult<Option<Arc<MediaSlot>>> {
        if let Some(cached) = self.slots.read().await.get(&owner_id) {
            return Ok(Some(cached.clone()));
        }

        let epoch = self.epoch.load(Ordering::Acquire);
        let loaded = self.load_manifest(owner_id).await?;

        let mut slots = self.slots.write().await;
        if let Some(current) = slots.get(&owner_id) {
            return Ok(Some(current.clone()));
        }
        // A commit or clear since the load started makes `loaded` stale
        if let Some(slot) = &loaded {
            if self.epoch.load(Ordering::Acquire) == epoch {
                slots.insert(owner_id, slot.clone());
            }
        }
        Ok(loaded)
    }

    /// Number of owners whose committed slot is held in memory.
    pub async fn cached_len(&self) -> usize {
        self.slots.read().await.len()
    }

    async fn load_manifest(&self, owner_id: OwnerId) -> AvatarResult<Option<Arc<MediaSlot>>> {
        let data = match self.storage.download(&keys::manifest_key(&owner_id)).await {
            Ok(data) => data,
            Err(StorageError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let slot: MediaSlot = serde_json::from_slice(&data).map_err(|e| {
            StorageError::BackendError(format!("Corrupt avatar manifest for {}: {}", owner_id, e))
        })?;

        if slot.owner_id != owner_id || !slot.is_complete() {
            return Err(StorageError::BackendError(format!(
                "Avatar manifest for {} is inconsistent",
                owner_id
            ))
            .into());
        }

        tracing::debug!(
            owner_id = %owner_id,
            generation = %slot.generation,
            "Loaded avatar manifest"
        );
        Ok(Some(Arc::new(slot)))
    }

    /// Best-effort deletion of unreachable objects.
    async fn delete_keys(&self, keys: &[String]) {
        for key in keys {
            if let Err(e) = self.storage.delete(key).await {
                tracing::warn!(
                    storage_key = %key,
                    error = %e,
                    "Failed to delete superseded avatar object"
                );
            }
        }
    }
}
