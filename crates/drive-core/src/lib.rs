//! # drive-core
//!
//! Core crate for Nimbus Drive. Contains the unified error system,
//! configuration schemas, canonical path handling, and the remote
//! object-store trait.
//!
//! This crate has **no** internal dependencies on other Drive crates.

pub mod config;
pub mod error;
pub mod path;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
