//! Remote object-store trait — the remote half of the blob store.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Trait for the remote object-storage backend.
///
/// The remote service supports put/copy/delete by key but has **no native
/// rename**; rename is expressed by the blob store as copy-then-delete.
/// Implementations exist for S3-compatible services and for an in-memory
/// store used by tests and development.
#[async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "s3", "memory").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Write an object under the given key and return its public URL.
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> AppResult<String>;

    /// Copy an object to a new key, leaving the source untouched.
    async fn copy(&self, from_key: &str, to_key: &str) -> AppResult<()>;

    /// Delete the object at the given key. Deleting a missing key is not
    /// an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// The public URL an object at `key` is served from.
    fn url_for(&self, key: &str) -> String;
}
