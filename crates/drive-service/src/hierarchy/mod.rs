//! Hierarchy mutation engine.

pub mod service;

pub use service::HierarchyService;
