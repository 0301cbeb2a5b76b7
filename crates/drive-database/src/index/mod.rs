//! Owner-scoped hierarchy index contract.
//!
//! The virtual hierarchy is recorded as canonical path strings with prefix
//! semantics. Every operation is scoped to one owner; every mutating
//! operation is atomic as observed by concurrent readers, and the cascade
//! operations ([`HierarchyIndex::rename_subtree`],
//! [`HierarchyIndex::delete_subtree`]) commit all-or-nothing.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use drive_core::result::AppResult;
use drive_entity::file::{CreateFile, File};
use drive_entity::folder::{CreateFolder, Folder};

pub use memory::MemoryHierarchyIndex;
pub use postgres::PgHierarchyIndex;

/// Result of a folder rename cascade.
#[derive(Debug, Clone)]
pub struct RenameCascade {
    /// The renamed folder with its new name and path.
    pub folder: Folder,
    /// Number of descendant folder rows rewritten.
    pub folders_updated: u64,
    /// Number of file rows rewritten.
    pub files_updated: u64,
}

/// Result of a subtree deletion.
#[derive(Debug, Clone, Copy)]
pub struct SubtreeDeletion {
    /// Number of folder rows deleted (including the target).
    pub folders_deleted: u64,
    /// Number of file rows deleted.
    pub files_deleted: u64,
}

/// The relational record store of folders and files.
///
/// Implemented for PostgreSQL ([`PgHierarchyIndex`]) and in memory
/// ([`MemoryHierarchyIndex`], used by tests and as a development
/// fallback). Prefix operations match on `drive_path` and include the
/// depth-0 exact match in addition to strict descendants.
#[async_trait]
pub trait HierarchyIndex: Send + Sync + std::fmt::Debug + 'static {
    /// Find a folder by its exact canonical path.
    async fn find_folder(&self, owner_id: Uuid, drive_path: &str) -> AppResult<Option<Folder>>;

    /// Find a file by containing-folder path and user-visible name.
    async fn find_file(
        &self,
        owner_id: Uuid,
        drive_path: &str,
        original_name: &str,
    ) -> AppResult<Option<File>>;

    /// Find a file by id.
    async fn find_file_by_id(&self, owner_id: Uuid, file_id: Uuid) -> AppResult<Option<File>>;

    /// All folders whose `drive_path` starts with `prefix`.
    async fn folders_with_prefix(&self, owner_id: Uuid, prefix: &str) -> AppResult<Vec<Folder>>;

    /// All files whose `drive_path` starts with `prefix`.
    async fn files_with_prefix(&self, owner_id: Uuid, prefix: &str) -> AppResult<Vec<File>>;

    /// Every folder and file belonging to the owner.
    async fn list_entries(&self, owner_id: Uuid) -> AppResult<(Vec<Folder>, Vec<File>)>;

    /// Insert a chain of folders in one atomic unit, shallowest first.
    ///
    /// An existing folder at any of the paths fails the whole insert with
    /// `DuplicateEntry`.
    async fn insert_folders(&self, folders: &[CreateFolder]) -> AppResult<Vec<Folder>>;

    /// Insert a file record. A name collision within the containing folder
    /// fails with `DuplicateEntry`.
    async fn insert_file(&self, file: &CreateFile) -> AppResult<File>;

    /// Rewrite a file record in place (rename updates name, stored name,
    /// physical path, and remote location).
    async fn update_file(&self, file: &File) -> AppResult<File>;

    /// Delete a file record. Returns whether a row was removed.
    async fn delete_file(&self, owner_id: Uuid, file_id: Uuid) -> AppResult<bool>;

    /// Rename a folder and cascade the path change to every descendant
    /// folder and contained file, replacing `old_prefix` with `new_prefix`
    /// exactly once per path, in a single atomic unit.
    async fn rename_subtree(
        &self,
        owner_id: Uuid,
        folder_id: Uuid,
        new_name: &str,
        old_prefix: &str,
        new_prefix: &str,
    ) -> AppResult<RenameCascade>;

    /// Delete every folder and file under `prefix` (inclusive) in a single
    /// atomic unit.
    async fn delete_subtree(&self, owner_id: Uuid, prefix: &str) -> AppResult<SubtreeDeletion>;
}
