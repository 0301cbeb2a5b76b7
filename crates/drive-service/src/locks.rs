//! Per-owner serialization of structural mutations.
//!
//! Two concurrent cascades for the same owner (say a rename racing a
//! delete on overlapping subtrees) must not interleave their
//! read-then-write sequences. Cross-owner operations never contend.
//!
//! Callers must not hold a guard across a remote-network call; blob I/O
//! happens outside the locked section, index mutations inside.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Registry of per-owner async locks.
#[derive(Debug, Clone, Default)]
pub struct OwnerLocks {
    locks: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
}

impl OwnerLocks {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for an owner, creating it on first use.
    pub async fn lock(&self, owner_id: Uuid) -> OwnedMutexGuard<()> {
        // Clone the Arc out before awaiting so the map shard guard is not
        // held across the await point.
        let cell = self.locks.entry(owner_id).or_default().clone();
        cell.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_owner_is_exclusive() {
        let locks = OwnerLocks::new();
        let owner = Uuid::new_v4();

        let guard = locks.lock(owner).await;
        assert!(
            tokio::time::timeout(std::time::Duration::from_millis(50), locks.lock(owner))
                .await
                .is_err()
        );
        drop(guard);
        let _second = locks.lock(owner).await;
    }

    #[tokio::test]
    async fn test_distinct_owners_do_not_contend() {
        let locks = OwnerLocks::new();
        let _a = locks.lock(Uuid::new_v4()).await;
        let _b = locks.lock(Uuid::new_v4()).await;
    }
}
