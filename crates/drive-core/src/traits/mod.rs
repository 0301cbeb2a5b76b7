//! Trait definitions implemented by the backend crates.

pub mod object_store;

pub use object_store::ObjectStore;
