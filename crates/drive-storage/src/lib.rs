//! # drive-storage
//!
//! Physical content storage for Nimbus Drive. Content is held redundantly
//! on a local volume and in a remote object store; [`blob::BlobStore`]
//! orchestrates the two and owns the compensation rules for partial
//! failure.

pub mod blob;
pub mod local;
pub mod remote;

pub use blob::BlobStore;
pub use local::LocalVolume;
