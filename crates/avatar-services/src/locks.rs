//! Per-owner serialization of slot mutations.

use avatar_core::OwnerId;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per owner. Different owners never contend.
#[derive(Default)]
pub struct OwnerLocks {
    locks: DashMap<OwnerId, Arc<Mutex<()>>>,
}

impl OwnerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `owner`'s slot.
    pub async fn acquire(&self, owner: OwnerId) -> OwnedMutexGuard<()> {
        // Clone the Arc out so the shard lock is not held across the await
        let lock = self
            .locks
            .entry(owner)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Drop entries nobody holds or waits on.
    pub fn prune(&self) {
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
