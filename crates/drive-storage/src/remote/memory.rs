//! In-memory object store.
//!
//! Backs the remote half of the blob store in tests and local development.
//! Failure toggles let tests drive the compensation paths of the blob
//! store and the hierarchy mutator.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use drive_core::error::AppError;
use drive_core::result::AppResult;
use drive_core::traits::ObjectStore;

/// Object store held entirely in process memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryObjectStore {
    objects: Arc<RwLock<HashMap<String, (Bytes, String)>>>,
    fail_puts: Arc<AtomicBool>,
    fail_copies: Arc<AtomicBool>,
    fail_deletes: Arc<AtomicBool>,
}

impl MemoryObjectStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `put` calls fail.
    pub fn set_fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `copy` calls fail.
    pub fn set_fail_copies(&self, fail: bool) {
        self.fail_copies.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `delete` calls fail.
    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Whether an object exists at the given key.
    pub async fn contains(&self, key: &str) -> bool {
        self.objects.read().await.contains_key(key)
    }

    /// The stored bytes at a key, if any.
    pub async fn get(&self, key: &str) -> Option<Bytes> {
        self.objects.read().await.get(key).map(|(b, _)| b.clone())
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Whether the store holds no objects.
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> AppResult<String> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(AppError::remote_backend("Injected put failure"));
        }
        self.objects
            .write()
            .await
            .insert(key.to_string(), (data, content_type.to_string()));
        Ok(self.url_for(key))
    }

    async fn copy(&self, from_key: &str, to_key: &str) -> AppResult<()> {
        if self.fail_copies.load(Ordering::SeqCst) {
            return Err(AppError::remote_backend("Injected copy failure"));
        }
        let mut objects = self.objects.write().await;
        let value = objects
            .get(from_key)
            .cloned()
            .ok_or_else(|| AppError::remote_backend(format!("No such object: {from_key}")))?;
        objects.insert(to_key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(AppError::remote_backend("Injected delete failure"));
        }
        self.objects.write().await.remove(key);
        Ok(())
    }

    fn url_for(&self, key: &str) -> String {
        format!("memory://{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_copy_delete() {
        let store = MemoryObjectStore::new();

        let url = store
            .put("o/a.txt", Bytes::from("data"), "text/plain")
            .await
            .unwrap();
        assert_eq!(url, "memory://o/a.txt");

        store.copy("o/a.txt", "o/b.txt").await.unwrap();
        assert!(store.contains("o/a.txt").await);
        assert!(store.contains("o/b.txt").await);

        store.delete("o/a.txt").await.unwrap();
        assert!(!store.contains("o/a.txt").await);

        // Deleting a missing key is not an error.
        store.delete("o/a.txt").await.unwrap();
    }

    #[tokio::test]
    async fn test_copy_of_missing_key_fails() {
        let store = MemoryObjectStore::new();
        let err = store.copy("o/none.txt", "o/b.txt").await.unwrap_err();
        assert_eq!(err.kind, drive_core::error::ErrorKind::RemoteBackend);
    }
}
