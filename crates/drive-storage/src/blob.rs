//! Dual-backend blob store.
//!
//! Content lives on the local volume *and* in the remote object store.
//! There is no cross-backend transaction; this module owns the ordering
//! and compensation rules:
//!
//! - `put` writes local first, remote second. A remote failure after a
//!   successful local write reports `PartialWrite` and **retains** the
//!   local copy so a retry can re-anchor on it.
//! - `rename` is expressed on the remote side as copy-then-delete (object
//!   storage has no atomic rename); the old object is deleted only after
//!   the copy succeeds.
//! - `delete` attempts both backends independently and never fails; an
//!   unreachable backend leaves residual garbage for an out-of-band
//!   reconciliation sweep.

use std::sync::Arc;

use bytes::Bytes;
use tracing::warn;
use uuid::Uuid;

use drive_core::error::{AppError, ErrorKind};
use drive_core::result::AppResult;
use drive_core::traits::ObjectStore;

use crate::local::LocalVolume;

/// Physical locations produced by a successful dual write.
#[derive(Debug, Clone)]
pub struct PutOutcome {
    /// Location on the local volume, relative to the volume root.
    pub physical_path: String,
    /// Key of the object in the remote store.
    pub remote_key: String,
    /// Public URL of the remote object.
    pub remote_url: String,
}

/// Dual-backend content store: a local volume plus a remote object store.
#[derive(Debug, Clone)]
pub struct BlobStore {
    local: LocalVolume,
    remote: Arc<dyn ObjectStore>,
}

impl BlobStore {
    /// Create a blob store over the given backends.
    pub fn new(local: LocalVolume, remote: Arc<dyn ObjectStore>) -> Self {
        Self { local, remote }
    }

    /// The backend key/path for an owner's stored file. Both backends use
    /// the same per-owner layout.
    pub fn object_key(owner_id: Uuid, stored_name: &str) -> String {
        format!("{owner_id}/{stored_name}")
    }

    /// The public URL the remote backend serves a key from.
    pub fn url_for(&self, key: &str) -> String {
        self.remote.url_for(key)
    }

    /// Write content to both backends, local first.
    pub async fn put(
        &self,
        owner_id: Uuid,
        stored_name: &str,
        data: Bytes,
        content_type: &str,
    ) -> AppResult<PutOutcome> {
        let key = Self::object_key(owner_id, stored_name);

        self.local.write(&key, data.clone()).await?;

        let remote_url = match self.remote.put(&key, data, content_type).await {
            Ok(url) => url,
            Err(e) => {
                // Local copy is kept on purpose: it anchors a retry.
                return Err(AppError::with_source(
                    ErrorKind::PartialWrite,
                    format!("Remote write failed for '{key}', local copy retained"),
                    e,
                ));
            }
        };

        Ok(PutOutcome {
            physical_path: key.clone(),
            remote_key: key,
            remote_url,
        })
    }

    /// Remove the local half of a failed or cancelled write.
    pub async fn discard_local(&self, physical_path: &str) {
        if let Err(e) = self.local.delete(physical_path).await {
            warn!(path = physical_path, error = %e, "Failed to discard local file");
        }
    }

    /// Move content to new locations in both backends.
    ///
    /// The local rename tolerates a missing source file; the remote rename
    /// is copy-then-delete and fails without touching the old object when
    /// the copy fails. Returns the new remote URL.
    pub async fn rename(
        &self,
        old_physical_path: &str,
        new_physical_path: &str,
        old_remote_key: &str,
        new_remote_key: &str,
    ) -> AppResult<String> {
        self.local.rename(old_physical_path, new_physical_path).await?;

        self.remote.copy(old_remote_key, new_remote_key).await?;
        if let Err(e) = self.remote.delete(old_remote_key).await {
            warn!(
                key = old_remote_key,
                error = %e,
                "Failed to delete old remote object after copy, stale object left behind"
            );
        }

        Ok(self.remote.url_for(new_remote_key))
    }

    /// Best-effort revert of a rename, used when the index update conflicts
    /// after the physical move already happened.
    pub async fn rename_back(
        &self,
        physical_path: &str,
        old_physical_path: &str,
        remote_key: &str,
        old_remote_key: &str,
    ) {
        if let Err(e) = self
            .rename(physical_path, old_physical_path, remote_key, old_remote_key)
            .await
        {
            warn!(
                from = physical_path,
                to = old_physical_path,
                error = %e,
                "Failed to revert physical rename"
            );
        }
    }

    /// Delete content from both backends independently.
    ///
    /// Failures are logged and tolerated: a missing or unreachable backend
    /// must never block index cleanup.
    pub async fn delete(&self, physical_path: &str, remote_key: &str) {
        if let Err(e) = self.local.delete(physical_path).await {
            warn!(path = physical_path, error = %e, "Local delete failed");
        }
        if let Err(e) = self.remote.delete(remote_key).await {
            warn!(key = remote_key, error = %e, "Remote delete failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MemoryObjectStore;

    async fn blob_store() -> (BlobStore, MemoryObjectStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalVolume::new(dir.path().to_str().unwrap()).await.unwrap();
        let remote = MemoryObjectStore::new();
        (BlobStore::new(local, Arc::new(remote.clone())), remote, dir)
    }

    #[tokio::test]
    async fn test_put_writes_both_backends() {
        let (blobs, remote, _dir) = blob_store().await;
        let owner = Uuid::new_v4();

        let outcome = blobs
            .put(owner, "a_1.txt", Bytes::from("data"), "text/plain")
            .await
            .unwrap();

        assert_eq!(outcome.physical_path, format!("{owner}/a_1.txt"));
        assert_eq!(outcome.remote_key, outcome.physical_path);
        assert!(remote.contains(&outcome.remote_key).await);
    }

    #[tokio::test]
    async fn test_put_remote_failure_retains_local() {
        let (blobs, remote, dir) = blob_store().await;
        let owner = Uuid::new_v4();
        remote.set_fail_puts(true);

        let err = blobs
            .put(owner, "a_1.txt", Bytes::from("data"), "text/plain")
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::PartialWrite);
        assert!(dir.path().join(format!("{owner}/a_1.txt")).exists());
    }

    #[tokio::test]
    async fn test_rename_copies_then_deletes_remote() {
        let (blobs, remote, _dir) = blob_store().await;
        let owner = Uuid::new_v4();
        let outcome = blobs
            .put(owner, "a_1.txt", Bytes::from("data"), "text/plain")
            .await
            .unwrap();

        let new_key = BlobStore::object_key(owner, "b_2.txt");
        blobs
            .rename(&outcome.physical_path, &new_key, &outcome.remote_key, &new_key)
            .await
            .unwrap();

        assert!(!remote.contains(&outcome.remote_key).await);
        assert!(remote.contains(&new_key).await);
    }

    #[tokio::test]
    async fn test_rename_failed_copy_leaves_old_object() {
        let (blobs, remote, _dir) = blob_store().await;
        let owner = Uuid::new_v4();
        let outcome = blobs
            .put(owner, "a_1.txt", Bytes::from("data"), "text/plain")
            .await
            .unwrap();

        remote.set_fail_copies(true);
        let new_key = BlobStore::object_key(owner, "b_2.txt");
        let err = blobs
            .rename(&outcome.physical_path, &new_key, &outcome.remote_key, &new_key)
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::RemoteBackend);
        assert!(remote.contains(&outcome.remote_key).await);
        assert!(!remote.contains(&new_key).await);
    }

    #[tokio::test]
    async fn test_delete_tolerates_backend_failures() {
        let (blobs, remote, _dir) = blob_store().await;
        let owner = Uuid::new_v4();
        let outcome = blobs
            .put(owner, "a_1.txt", Bytes::from("data"), "text/plain")
            .await
            .unwrap();

        remote.set_fail_deletes(true);
        // Must not panic or propagate the remote failure.
        blobs.delete(&outcome.physical_path, &outcome.remote_key).await;
        assert!(remote.contains(&outcome.remote_key).await);
    }
}
