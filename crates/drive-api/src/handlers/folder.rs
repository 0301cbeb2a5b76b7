//! Folder mutation handlers.

use axum::Json;
use axum::extract::State;

use crate::dto::request::{CreateFolderRequest, DeleteFolderRequest, RenameFolderRequest};
use crate::dto::response::FolderResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/drive/folders
pub async fn create_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateFolderRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let created = state
        .hierarchy
        .create_folder_chain(auth.context(), &req.path)
        .await?;

    let created: Vec<FolderResponse> = created.into_iter().map(Into::into).collect();
    Ok(Json(serde_json::json!({ "success": true, "data": created })))
}

/// PUT /api/drive/folders/rename
pub async fn rename_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<RenameFolderRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let cascade = state
        .hierarchy
        .rename_folder(auth.context(), &req.old_path, &req.new_name)
        .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": {
            "folder": FolderResponse::from(cascade.folder),
            "folders_updated": cascade.folders_updated,
            "files_updated": cascade.files_updated,
        },
    })))
}

/// DELETE /api/drive/folders
pub async fn delete_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<DeleteFolderRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let deletion = state
        .hierarchy
        .delete_folder(auth.context(), &req.path)
        .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": {
            "folders_deleted": deletion.folders_deleted,
            "files_deleted": deletion.files_deleted,
        },
    })))
}
