//! Create/rename/delete orchestration for the virtual hierarchy.
//!
//! Every operation is owner-scoped. Structural mutations for one owner are
//! serialized through [`OwnerLocks`]; the lock is never held across a
//! remote-network call — blob I/O for create/rename runs before the locked
//! section, blob deletion after it. Index cascades commit atomically in
//! the index layer, so a crash mid-operation never leaves a half-renamed
//! or half-deleted subtree.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use drive_core::error::AppError;
use drive_core::path;
use drive_core::result::AppResult;
use drive_database::index::{HierarchyIndex, RenameCascade, SubtreeDeletion};
use drive_entity::file::{CreateFile, File};
use drive_entity::folder::{CreateFolder, Folder};
use drive_storage::BlobStore;
use drive_storage::blob::PutOutcome;

use crate::context::RequestContext;
use crate::locks::OwnerLocks;
use crate::naming::{self, DEFAULT_CONTENT_TYPE};

/// Orchestrates hierarchy mutations across the index and the blob store.
#[derive(Debug, Clone)]
pub struct HierarchyService {
    /// The relational record store.
    index: Arc<dyn HierarchyIndex>,
    /// The dual-backend content store.
    blobs: Arc<BlobStore>,
    /// Per-owner mutation locks.
    locks: OwnerLocks,
}

impl HierarchyService {
    /// Creates a new hierarchy service.
    pub fn new(index: Arc<dyn HierarchyIndex>, blobs: Arc<BlobStore>) -> Self {
        Self {
            index,
            blobs,
            locks: OwnerLocks::new(),
        }
    }

    /// Normalize and validate a folder-path argument.
    fn canonicalize(raw: &str) -> AppResult<String> {
        let normalized = path::normalize(raw);
        if !path::is_canonical(&normalized) {
            return Err(AppError::path_conflict(format!(
                "Malformed folder path '{raw}'"
            )));
        }
        Ok(normalized)
    }

    /// Insert every folder missing from the ancestor chain of `target`,
    /// including the leaf. Existence is keyed on the full ancestor path,
    /// never on the name alone, so unrelated branches sharing a leaf name
    /// cannot collide. Caller must hold the owner lock.
    async fn ensure_chain_locked(&self, owner_id: Uuid, target: &str) -> AppResult<Vec<Folder>> {
        let mut missing = Vec::new();
        for ancestor in path::ancestor_paths(target) {
            if self.index.find_folder(owner_id, &ancestor).await?.is_none() {
                missing.push(CreateFolder::at_path(owner_id, &ancestor));
            }
        }
        if missing.is_empty() {
            return Ok(Vec::new());
        }
        self.index.insert_folders(&missing).await
    }

    /// Create a folder and any missing ancestors.
    ///
    /// Reports `DuplicateEntry` when the leaf folder already exists;
    /// existing ancestors are fine. Returns the created folders,
    /// shallowest first.
    pub async fn create_folder_chain(
        &self,
        ctx: &RequestContext,
        target_path: &str,
    ) -> AppResult<Vec<Folder>> {
        let target = Self::canonicalize(target_path)?;
        if target == path::ROOT {
            // The root is implicit and never materialized.
            return Ok(Vec::new());
        }

        let _guard = self.locks.lock(ctx.user_id).await;

        if self.index.find_folder(ctx.user_id, &target).await?.is_some() {
            return Err(AppError::duplicate_entry(format!(
                "Folder '{target}' already exists"
            )));
        }

        let created = self.ensure_chain_locked(ctx.user_id, &target).await?;

        info!(
            user_id = %ctx.user_id,
            path = %target,
            created = created.len(),
            "Folder chain created"
        );
        Ok(created)
    }

    /// Save a file into a folder, creating missing ancestors implicitly.
    ///
    /// Content is written to both backends before the index commits. A
    /// failed remote write surfaces as `PartialWrite` with the local copy
    /// retained; a name collision detected after the physical write
    /// triggers a compensating blob delete.
    pub async fn save_file(
        &self,
        ctx: &RequestContext,
        drive_path: &str,
        original_name: &str,
        content: Bytes,
        content_type: Option<String>,
    ) -> AppResult<File> {
        let target = Self::canonicalize(drive_path)?;
        naming::validate_entry_name(original_name)?;

        // Fast-fail before paying for the upload; rechecked under the lock.
        if self
            .index
            .find_file(ctx.user_id, &target, original_name)
            .await?
            .is_some()
        {
            return Err(AppError::duplicate_entry(format!(
                "File '{original_name}' already exists in '{target}'"
            )));
        }

        let stored_name = naming::unique_stored_name(original_name, None);
        let content_type = content_type.unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
        let put = self
            .blobs
            .put(ctx.user_id, &stored_name, content, &content_type)
            .await?;

        let inserted = {
            let _guard = self.locks.lock(ctx.user_id).await;
            self.insert_file_locked(ctx.user_id, &target, original_name, &put, &content_type)
                .await
        };

        match inserted {
            Ok(file) => {
                info!(
                    user_id = %ctx.user_id,
                    file_id = %file.id,
                    name = %file.original_name,
                    path = %file.drive_path,
                    "File saved"
                );
                Ok(file)
            }
            Err(e) => {
                // The physical write already happened on both backends;
                // roll it back so a failed save leaks nothing.
                self.blobs.delete(&put.physical_path, &put.remote_key).await;
                Err(e)
            }
        }
    }

    async fn insert_file_locked(
        &self,
        owner_id: Uuid,
        target: &str,
        original_name: &str,
        put: &PutOutcome,
        content_type: &str,
    ) -> AppResult<File> {
        if target != path::ROOT {
            self.ensure_chain_locked(owner_id, target).await?;
        }

        if self
            .index
            .find_file(owner_id, target, original_name)
            .await?
            .is_some()
        {
            return Err(AppError::duplicate_entry(format!(
                "File '{original_name}' already exists in '{target}'"
            )));
        }

        let stored_name = put
            .physical_path
            .rsplit_once('/')
            .map(|(_, name)| name)
            .unwrap_or(&put.physical_path)
            .to_string();

        self.index
            .insert_file(&CreateFile {
                original_name: original_name.to_string(),
                stored_name,
                physical_path: put.physical_path.clone(),
                drive_path: target.to_string(),
                content_type: Some(content_type.to_string()),
                remote_key: put.remote_key.clone(),
                remote_url: put.remote_url.clone(),
                owner_id,
            })
            .await
    }

    /// Rename a folder and cascade the new path to every descendant.
    ///
    /// Metadata-only: file content stays where it is in both backends. A
    /// folder already occupying the new path is rejected with
    /// `DuplicateEntry`, never merged or overwritten.
    pub async fn rename_folder(
        &self,
        ctx: &RequestContext,
        old_path: &str,
        new_name: &str,
    ) -> AppResult<RenameCascade> {
        let old = Self::canonicalize(old_path)?;
        if old == path::ROOT {
            return Err(AppError::path_conflict("Cannot rename the root folder"));
        }
        naming::validate_entry_name(new_name)?;

        let _guard = self.locks.lock(ctx.user_id).await;

        let folder = self
            .index
            .find_folder(ctx.user_id, &old)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder '{old}' not found")))?;

        let parent = path::parent_path(&old).unwrap_or_else(|| path::ROOT.to_string());
        let new_path = path::child_path(&parent, new_name);

        if new_path == old {
            return Ok(RenameCascade {
                folder,
                folders_updated: 0,
                files_updated: 0,
            });
        }

        if self
            .index
            .find_folder(ctx.user_id, &new_path)
            .await?
            .is_some()
        {
            return Err(AppError::duplicate_entry(format!(
                "Folder '{new_path}' already exists"
            )));
        }

        let cascade = self
            .index
            .rename_subtree(ctx.user_id, folder.id, new_name, &old, &new_path)
            .await?;

        info!(
            user_id = %ctx.user_id,
            old_path = %old,
            new_path = %new_path,
            folders = cascade.folders_updated,
            files = cascade.files_updated,
            "Folder renamed"
        );
        Ok(cascade)
    }

    /// Rename a file: fresh stored name, physical move in both backends,
    /// then the index update.
    ///
    /// The record is only rewritten after the physical rename succeeded; a
    /// remote copy failure leaves the old object untouched and the record
    /// unchanged.
    pub async fn rename_file(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        new_name: &str,
    ) -> AppResult<File> {
        naming::validate_entry_name(new_name)?;

        let file = self
            .index
            .find_file_by_id(ctx.user_id, file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;

        if file.original_name == new_name {
            return Ok(file);
        }

        if let Some(other) = self
            .index
            .find_file(ctx.user_id, &file.drive_path, new_name)
            .await?
        {
            if other.id != file.id {
                return Err(AppError::duplicate_entry(format!(
                    "File '{new_name}' already exists in '{}'",
                    file.drive_path
                )));
            }
        }

        let stored_name = naming::unique_stored_name(new_name, Some(&file.original_name));
        let new_physical = match file.physical_path.rsplit_once('/') {
            Some((dir, _)) => format!("{dir}/{stored_name}"),
            None => stored_name.clone(),
        };
        let new_key = BlobStore::object_key(ctx.user_id, &stored_name);

        let new_url = self
            .blobs
            .rename(&file.physical_path, &new_physical, &file.remote_key, &new_key)
            .await?;

        let mut updated = file.clone();
        updated.original_name = new_name.to_string();
        updated.stored_name = stored_name;
        updated.physical_path = new_physical.clone();
        updated.remote_key = new_key.clone();
        updated.remote_url = new_url;

        let result = {
            let _guard = self.locks.lock(ctx.user_id).await;
            self.index.update_file(&updated).await
        };

        match result {
            Ok(file) => {
                info!(
                    user_id = %ctx.user_id,
                    file_id = %file.id,
                    name = %file.original_name,
                    "File renamed"
                );
                Ok(file)
            }
            Err(e) => {
                // A concurrent mutation won the index race; put the
                // content back where the surviving record points.
                warn!(file_id = %file_id, error = %e, "Index update failed after physical rename");
                self.blobs
                    .rename_back(&new_physical, &file.physical_path, &new_key, &file.remote_key)
                    .await;
                Err(e)
            }
        }
    }

    /// Delete a folder with its entire subtree of folders and files.
    ///
    /// Index records are removed first in one atomic unit; blob content is
    /// deleted afterwards, tolerantly — a failed blob delete leaves
    /// residual garbage but never blocks or corrupts index cleanup.
    pub async fn delete_folder(
        &self,
        ctx: &RequestContext,
        target_path: &str,
    ) -> AppResult<SubtreeDeletion> {
        let target = Self::canonicalize(target_path)?;
        if target == path::ROOT {
            return Err(AppError::path_conflict("Cannot delete the root folder"));
        }

        let (deletion, files) = {
            let _guard = self.locks.lock(ctx.user_id).await;

            if self
                .index
                .find_folder(ctx.user_id, &target)
                .await?
                .is_none()
            {
                return Err(AppError::not_found(format!("Folder '{target}' not found")));
            }

            let files = self.index.files_with_prefix(ctx.user_id, &target).await?;
            let deletion = self.index.delete_subtree(ctx.user_id, &target).await?;
            (deletion, files)
        };

        for file in &files {
            self.blobs.delete(&file.physical_path, &file.remote_key).await;
        }

        info!(
            user_id = %ctx.user_id,
            path = %target,
            folders = deletion.folders_deleted,
            files = deletion.files_deleted,
            "Folder deleted"
        );
        Ok(deletion)
    }

    /// Delete a single file: the record, then its blob content.
    pub async fn delete_file(&self, ctx: &RequestContext, file_id: Uuid) -> AppResult<()> {
        let file = {
            let _guard = self.locks.lock(ctx.user_id).await;

            let file = self
                .index
                .find_file_by_id(ctx.user_id, file_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;

            if !self.index.delete_file(ctx.user_id, file_id).await? {
                return Err(AppError::not_found(format!("File {file_id} not found")));
            }
            file
        };

        self.blobs.delete(&file.physical_path, &file.remote_key).await;

        info!(
            user_id = %ctx.user_id,
            file_id = %file_id,
            name = %file.original_name,
            "File deleted"
        );
        Ok(())
    }

    /// Every folder and file belonging to the owner.
    pub async fn list_entries(&self, ctx: &RequestContext) -> AppResult<(Vec<Folder>, Vec<File>)> {
        self.index.list_entries(ctx.user_id).await
    }
}
