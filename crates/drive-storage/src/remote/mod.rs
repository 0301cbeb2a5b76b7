//! Remote object-store implementations.

pub mod memory;
pub mod s3;

use std::sync::Arc;

use tracing::warn;

use drive_core::config::storage::StorageConfig;
use drive_core::result::AppResult;
use drive_core::traits::ObjectStore;

pub use memory::MemoryObjectStore;
pub use s3::S3ObjectStore;

/// Build the remote object store selected by configuration.
///
/// Falls back to the in-memory store when S3 is disabled; that mode loses
/// all remote content on restart and is only meant for development.
pub async fn build_object_store(config: &StorageConfig) -> AppResult<Arc<dyn ObjectStore>> {
    if config.s3.enabled {
        Ok(Arc::new(S3ObjectStore::new(&config.s3).await?))
    } else {
        warn!("S3 backend disabled, using in-memory object store (development only)");
        Ok(Arc::new(MemoryObjectStore::new()))
    }
}
