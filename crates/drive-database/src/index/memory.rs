//! In-memory hierarchy index.
//!
//! Mirrors the PostgreSQL implementation's contract behind a single
//! `RwLock`, which makes every mutating operation trivially atomic. The
//! service test suite runs against this implementation so the mutator's
//! cascade logic can be exercised without a live database.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use drive_core::error::AppError;
use drive_core::path;
use drive_core::result::AppResult;
use drive_entity::file::{CreateFile, File};
use drive_entity::folder::{CreateFolder, Folder};

use super::{HierarchyIndex, RenameCascade, SubtreeDeletion};

#[derive(Debug, Default)]
struct MemState {
    folders: HashMap<Uuid, Folder>,
    files: HashMap<Uuid, File>,
}

/// Hierarchy index held entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryHierarchyIndex {
    state: RwLock<MemState>,
}

impl MemoryHierarchyIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HierarchyIndex for MemoryHierarchyIndex {
    async fn find_folder(&self, owner_id: Uuid, drive_path: &str) -> AppResult<Option<Folder>> {
        let state = self.state.read().await;
        Ok(state
            .folders
            .values()
            .find(|f| f.owner_id == owner_id && f.drive_path == drive_path)
            .cloned())
    }

    async fn find_file(
        &self,
        owner_id: Uuid,
        drive_path: &str,
        original_name: &str,
    ) -> AppResult<Option<File>> {
        let state = self.state.read().await;
        Ok(state
            .files
            .values()
            .find(|f| {
                f.owner_id == owner_id
                    && f.drive_path == drive_path
                    && f.original_name == original_name
            })
            .cloned())
    }

    async fn find_file_by_id(&self, owner_id: Uuid, file_id: Uuid) -> AppResult<Option<File>> {
        let state = self.state.read().await;
        Ok(state
            .files
            .get(&file_id)
            .filter(|f| f.owner_id == owner_id)
            .cloned())
    }

    async fn folders_with_prefix(&self, owner_id: Uuid, prefix: &str) -> AppResult<Vec<Folder>> {
        let state = self.state.read().await;
        let mut out: Vec<Folder> = state
            .folders
            .values()
            .filter(|f| f.owner_id == owner_id && f.drive_path.starts_with(prefix))
            .cloned()
            .collect();
        out.sort_by(|a, b| a.drive_path.cmp(&b.drive_path));
        Ok(out)
    }

    async fn files_with_prefix(&self, owner_id: Uuid, prefix: &str) -> AppResult<Vec<File>> {
        let state = self.state.read().await;
        let mut out: Vec<File> = state
            .files
            .values()
            .filter(|f| f.owner_id == owner_id && f.drive_path.starts_with(prefix))
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            a.drive_path
                .cmp(&b.drive_path)
                .then(a.original_name.cmp(&b.original_name))
        });
        Ok(out)
    }

    async fn list_entries(&self, owner_id: Uuid) -> AppResult<(Vec<Folder>, Vec<File>)> {
        let folders = self.folders_with_prefix(owner_id, "").await?;
        let files = self.files_with_prefix(owner_id, "").await?;
        Ok((folders, files))
    }

    async fn insert_folders(&self, folders: &[CreateFolder]) -> AppResult<Vec<Folder>> {
        let mut state = self.state.write().await;
        for data in folders {
            if state
                .folders
                .values()
                .any(|f| f.owner_id == data.owner_id && f.drive_path == data.drive_path)
            {
                return Err(AppError::duplicate_entry(format!(
                    "Folder '{}' already exists",
                    data.drive_path
                )));
            }
        }

        let now = Utc::now();
        let mut created = Vec::with_capacity(folders.len());
        for data in folders {
            let folder = Folder {
                id: Uuid::new_v4(),
                name: data.name.clone(),
                drive_path: data.drive_path.clone(),
                owner_id: data.owner_id,
                created_at: now,
                updated_at: now,
            };
            state.folders.insert(folder.id, folder.clone());
            created.push(folder);
        }
        Ok(created)
    }

    async fn insert_file(&self, file: &CreateFile) -> AppResult<File> {
        let mut state = self.state.write().await;
        if state.files.values().any(|f| {
            f.owner_id == file.owner_id
                && f.drive_path == file.drive_path
                && f.original_name == file.original_name
        }) {
            return Err(AppError::duplicate_entry(format!(
                "File '{}' already exists in '{}'",
                file.original_name, file.drive_path
            )));
        }

        let now = Utc::now();
        let record = File {
            id: Uuid::new_v4(),
            original_name: file.original_name.clone(),
            stored_name: file.stored_name.clone(),
            physical_path: file.physical_path.clone(),
            drive_path: file.drive_path.clone(),
            content_type: file.content_type.clone(),
            remote_key: file.remote_key.clone(),
            remote_url: file.remote_url.clone(),
            owner_id: file.owner_id,
            created_at: now,
            updated_at: now,
        };
        state.files.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_file(&self, file: &File) -> AppResult<File> {
        let mut state = self.state.write().await;
        if state.files.values().any(|f| {
            f.id != file.id
                && f.owner_id == file.owner_id
                && f.drive_path == file.drive_path
                && f.original_name == file.original_name
        }) {
            return Err(AppError::duplicate_entry(format!(
                "File '{}' already exists in '{}'",
                file.original_name, file.drive_path
            )));
        }

        match state.files.get_mut(&file.id) {
            Some(existing) if existing.owner_id == file.owner_id => {
                let mut updated = file.clone();
                updated.updated_at = Utc::now();
                *existing = updated.clone();
                Ok(updated)
            }
            _ => Err(AppError::not_found(format!("File {} not found", file.id))),
        }
    }

    async fn delete_file(&self, owner_id: Uuid, file_id: Uuid) -> AppResult<bool> {
        let mut state = self.state.write().await;
        match state.files.get(&file_id) {
            Some(f) if f.owner_id == owner_id => {
                state.files.remove(&file_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn rename_subtree(
        &self,
        owner_id: Uuid,
        folder_id: Uuid,
        new_name: &str,
        old_prefix: &str,
        new_prefix: &str,
    ) -> AppResult<RenameCascade> {
        let mut state = self.state.write().await;
        let now = Utc::now();

        let folder = match state.folders.get_mut(&folder_id) {
            Some(f) if f.owner_id == owner_id => {
                f.name = new_name.to_string();
                f.drive_path = new_prefix.to_string();
                f.updated_at = now;
                f.clone()
            }
            _ => {
                return Err(AppError::not_found(format!(
                    "Folder '{old_prefix}' not found"
                )));
            }
        };

        let mut folders_updated = 0;
        for f in state.folders.values_mut() {
            if f.id == folder_id || f.owner_id != owner_id {
                continue;
            }
            if let Some(rewritten) = path::replace_prefix(&f.drive_path, old_prefix, new_prefix) {
                f.drive_path = rewritten;
                f.updated_at = now;
                folders_updated += 1;
            }
        }

        let mut files_updated = 0;
        for f in state.files.values_mut() {
            if f.owner_id != owner_id {
                continue;
            }
            if let Some(rewritten) = path::replace_prefix(&f.drive_path, old_prefix, new_prefix) {
                f.drive_path = rewritten;
                f.updated_at = now;
                files_updated += 1;
            }
        }

        Ok(RenameCascade {
            folder,
            folders_updated,
            files_updated,
        })
    }

    async fn delete_subtree(&self, owner_id: Uuid, prefix: &str) -> AppResult<SubtreeDeletion> {
        let mut state = self.state.write().await;

        let before_files = state.files.len();
        state
            .files
            .retain(|_, f| f.owner_id != owner_id || !f.drive_path.starts_with(prefix));
        let files_deleted = (before_files - state.files.len()) as u64;

        let before_folders = state.folders.len();
        state
            .folders
            .retain(|_, f| f.owner_id != owner_id || !f.drive_path.starts_with(prefix));
        let folders_deleted = (before_folders - state.folders.len()) as u64;

        Ok(SubtreeDeletion {
            folders_deleted,
            files_deleted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder(owner: Uuid, drive_path: &str) -> CreateFolder {
        CreateFolder::at_path(owner, drive_path)
    }

    #[tokio::test]
    async fn test_insert_folders_rejects_duplicates_atomically() {
        let index = MemoryHierarchyIndex::new();
        let owner = Uuid::new_v4();

        index.insert_folders(&[folder(owner, "/a/")]).await.unwrap();

        let err = index
            .insert_folders(&[folder(owner, "/b/"), folder(owner, "/a/")])
            .await
            .unwrap_err();
        assert_eq!(err.kind, drive_core::error::ErrorKind::DuplicateEntry);

        // The failed batch must not have inserted `/b/` either.
        assert!(index.find_folder(owner, "/b/").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_prefix_listing_is_owner_scoped() {
        let index = MemoryHierarchyIndex::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        index
            .insert_folders(&[folder(alice, "/a/"), folder(alice, "/a/b/")])
            .await
            .unwrap();
        index.insert_folders(&[folder(bob, "/a/")]).await.unwrap();

        let alices = index.folders_with_prefix(alice, "/a/").await.unwrap();
        assert_eq!(alices.len(), 2);
        let bobs = index.folders_with_prefix(bob, "/a/").await.unwrap();
        assert_eq!(bobs.len(), 1);
    }
}
