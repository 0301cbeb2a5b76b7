//! File save/list/rename/delete handlers.

use axum::Json;
use axum::extract::{Multipart, Path, State};
use bytes::Bytes;
use uuid::Uuid;

use drive_core::error::AppError;

use crate::dto::request::RenameFileRequest;
use crate::dto::response::{FileResponse, FolderResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/drive/files
///
/// Multipart body: a `file` part with the content and an optional
/// `drive_path` part naming the target folder (defaults to the root).
pub async fn save_file(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut drive_path = String::new();
    let mut upload: Option<(String, Option<String>, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().map(String::from);
        match name.as_deref() {
            Some("file") => {
                let file_name = field
                    .file_name()
                    .map(String::from)
                    .ok_or_else(|| AppError::validation("File part has no filename"))?;
                let content_type = field.content_type().map(String::from);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Failed to read upload: {e}")))?;
                upload = Some((file_name, content_type, data));
            }
            Some("drive_path") => {
                drive_path = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Failed to read drive_path: {e}")))?;
            }
            _ => {}
        }
    }

    let (file_name, content_type, data) =
        upload.ok_or_else(|| AppError::validation("Missing 'file' part"))?;

    let file = state
        .hierarchy
        .save_file(auth.context(), &drive_path, &file_name, data, content_type)
        .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": FileResponse::from(file),
    })))
}

/// GET /api/drive/entries
pub async fn list_entries(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (folders, files) = state.hierarchy.list_entries(auth.context()).await?;

    let folders: Vec<FolderResponse> = folders.into_iter().map(Into::into).collect();
    let files: Vec<FileResponse> = files.into_iter().map(Into::into).collect();
    Ok(Json(serde_json::json!({
        "success": true,
        "data": { "folders": folders, "files": files },
    })))
}

/// PUT /api/drive/files/{id}/rename
pub async fn rename_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<RenameFileRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let file = state
        .hierarchy
        .rename_file(auth.context(), id, &req.new_name)
        .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": FileResponse::from(file),
    })))
}

/// DELETE /api/drive/files/{id}
pub async fn delete_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.hierarchy.delete_file(auth.context(), id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}
