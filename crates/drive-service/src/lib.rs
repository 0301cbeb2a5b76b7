//! # drive-service
//!
//! Business logic for Nimbus Drive. The central piece is the hierarchy
//! mutation engine ([`hierarchy::HierarchyService`]): it validates paths,
//! cascades structural changes through the index, drives blob-store side
//! effects, and applies compensating actions on partial failure.

pub mod context;
pub mod hierarchy;
pub mod locks;
pub mod naming;

pub use context::RequestContext;
pub use hierarchy::HierarchyService;
