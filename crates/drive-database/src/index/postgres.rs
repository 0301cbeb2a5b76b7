//! PostgreSQL hierarchy index implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use drive_core::error::{AppError, ErrorKind};
use drive_core::result::AppResult;
use drive_entity::file::{CreateFile, File};
use drive_entity::folder::{CreateFolder, Folder};

use super::{HierarchyIndex, RenameCascade, SubtreeDeletion};

/// Unique constraint on `folders (owner_id, drive_path)`.
const FOLDER_PATH_CONSTRAINT: &str = "folders_owner_id_drive_path_key";
/// Unique constraint on `files (owner_id, drive_path, original_name)`.
const FILE_NAME_CONSTRAINT: &str = "files_owner_id_drive_path_original_name_key";

/// Hierarchy index backed by PostgreSQL.
///
/// Prefix matches use `LIKE` with escaped metacharacters; the cascade
/// operations run inside a single transaction so concurrent readers never
/// observe a half-applied rename or delete.
#[derive(Debug, Clone)]
pub struct PgHierarchyIndex {
    pool: PgPool,
}

impl PgHierarchyIndex {
    /// Create a new index over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escape `LIKE` metacharacters so a path prefix matches literally.
fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

/// `LIKE` pattern matching `prefix` and everything under it.
fn prefix_pattern(prefix: &str) -> String {
    format!("{}%", escape_like(prefix))
}

fn map_insert_error(e: sqlx::Error, constraint: &str, message: String) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.constraint() == Some(constraint) => {
            AppError::duplicate_entry(message)
        }
        _ => AppError::with_source(ErrorKind::Database, "Insert failed", e),
    }
}

#[async_trait]
impl HierarchyIndex for PgHierarchyIndex {
    async fn find_folder(&self, owner_id: Uuid, drive_path: &str) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE owner_id = $1 AND drive_path = $2",
        )
        .bind(owner_id)
        .bind(drive_path)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find folder", e))
    }

    async fn find_file(
        &self,
        owner_id: Uuid,
        drive_path: &str,
        original_name: &str,
    ) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE owner_id = $1 AND drive_path = $2 AND original_name = $3",
        )
        .bind(owner_id)
        .bind(drive_path)
        .bind(original_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file by name", e))
    }

    async fn find_file_by_id(&self, owner_id: Uuid, file_id: Uuid) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE id = $1 AND owner_id = $2")
            .bind(file_id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file", e))
    }

    async fn folders_with_prefix(&self, owner_id: Uuid, prefix: &str) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE owner_id = $1 AND drive_path LIKE $2 ESCAPE '\\' \
             ORDER BY drive_path ASC",
        )
        .bind(owner_id)
        .bind(prefix_pattern(prefix))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list folders", e))
    }

    async fn files_with_prefix(&self, owner_id: Uuid, prefix: &str) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE owner_id = $1 AND drive_path LIKE $2 ESCAPE '\\' \
             ORDER BY drive_path ASC, original_name ASC",
        )
        .bind(owner_id)
        .bind(prefix_pattern(prefix))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list files", e))
    }

    async fn list_entries(&self, owner_id: Uuid) -> AppResult<(Vec<Folder>, Vec<File>)> {
        let folders = sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE owner_id = $1 ORDER BY drive_path ASC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list folders", e))?;

        let files = sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE owner_id = $1 \
             ORDER BY drive_path ASC, original_name ASC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list files", e))?;

        Ok((folders, files))
    }

    async fn insert_folders(&self, folders: &[CreateFolder]) -> AppResult<Vec<Folder>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::IndexTransaction, "Failed to begin transaction", e)
        })?;

        let mut created = Vec::with_capacity(folders.len());
        for data in folders {
            let folder = sqlx::query_as::<_, Folder>(
                "INSERT INTO folders (name, drive_path, owner_id) \
                 VALUES ($1, $2, $3) RETURNING *",
            )
            .bind(&data.name)
            .bind(&data.drive_path)
            .bind(data.owner_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                map_insert_error(
                    e,
                    FOLDER_PATH_CONSTRAINT,
                    format!("Folder '{}' already exists", data.drive_path),
                )
            })?;
            created.push(folder);
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::IndexTransaction, "Failed to commit folder chain", e)
        })?;
        Ok(created)
    }

    async fn insert_file(&self, file: &CreateFile) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "INSERT INTO files (original_name, stored_name, physical_path, drive_path, \
             content_type, remote_key, remote_url, owner_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(&file.original_name)
        .bind(&file.stored_name)
        .bind(&file.physical_path)
        .bind(&file.drive_path)
        .bind(&file.content_type)
        .bind(&file.remote_key)
        .bind(&file.remote_url)
        .bind(file.owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_insert_error(
                e,
                FILE_NAME_CONSTRAINT,
                format!(
                    "File '{}' already exists in '{}'",
                    file.original_name, file.drive_path
                ),
            )
        })
    }

    async fn update_file(&self, file: &File) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "UPDATE files SET original_name = $3, stored_name = $4, physical_path = $5, \
             drive_path = $6, content_type = $7, remote_key = $8, remote_url = $9, \
             updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 RETURNING *",
        )
        .bind(file.id)
        .bind(file.owner_id)
        .bind(&file.original_name)
        .bind(&file.stored_name)
        .bind(&file.physical_path)
        .bind(&file.drive_path)
        .bind(&file.content_type)
        .bind(&file.remote_key)
        .bind(&file.remote_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            map_insert_error(
                e,
                FILE_NAME_CONSTRAINT,
                format!(
                    "File '{}' already exists in '{}'",
                    file.original_name, file.drive_path
                ),
            )
        })?
        .ok_or_else(|| AppError::not_found(format!("File {} not found", file.id)))
    }

    async fn delete_file(&self, owner_id: Uuid, file_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1 AND owner_id = $2")
            .bind(file_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete file", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn rename_subtree(
        &self,
        owner_id: Uuid,
        folder_id: Uuid,
        new_name: &str,
        old_prefix: &str,
        new_prefix: &str,
    ) -> AppResult<RenameCascade> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::IndexTransaction, "Failed to begin transaction", e)
        })?;

        let folder = sqlx::query_as::<_, Folder>(
            "UPDATE folders SET name = $3, drive_path = $4, updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 RETURNING *",
        )
        .bind(folder_id)
        .bind(owner_id)
        .bind(new_name)
        .bind(new_prefix)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            map_insert_error(
                e,
                FOLDER_PATH_CONSTRAINT,
                format!("Folder '{new_prefix}' already exists"),
            )
        })?
        .ok_or_else(|| AppError::not_found(format!("Folder '{old_prefix}' not found")))?;

        // Strict descendants; the target row was rewritten above.
        let folders_updated = sqlx::query(
            "UPDATE folders \
             SET drive_path = $3 || substring(drive_path FROM char_length($2) + 1), \
                 updated_at = NOW() \
             WHERE owner_id = $1 AND drive_path LIKE $4 ESCAPE '\\' AND id <> $5",
        )
        .bind(owner_id)
        .bind(old_prefix)
        .bind(new_prefix)
        .bind(prefix_pattern(old_prefix))
        .bind(folder_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::IndexTransaction, "Folder cascade failed", e)
        })?
        .rows_affected();

        // Includes the depth-0 case: files directly inside the renamed folder.
        let files_updated = sqlx::query(
            "UPDATE files \
             SET drive_path = $3 || substring(drive_path FROM char_length($2) + 1), \
                 updated_at = NOW() \
             WHERE owner_id = $1 AND drive_path LIKE $4 ESCAPE '\\'",
        )
        .bind(owner_id)
        .bind(old_prefix)
        .bind(new_prefix)
        .bind(prefix_pattern(old_prefix))
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::IndexTransaction, "File cascade failed", e)
        })?
        .rows_affected();

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::IndexTransaction, "Failed to commit rename", e)
        })?;

        Ok(RenameCascade {
            folder,
            folders_updated,
            files_updated,
        })
    }

    async fn delete_subtree(&self, owner_id: Uuid, prefix: &str) -> AppResult<SubtreeDeletion> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::IndexTransaction, "Failed to begin transaction", e)
        })?;

        let files_deleted =
            sqlx::query("DELETE FROM files WHERE owner_id = $1 AND drive_path LIKE $2 ESCAPE '\\'")
                .bind(owner_id)
                .bind(prefix_pattern(prefix))
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::IndexTransaction, "File deletion failed", e)
                })?
                .rows_affected();

        let folders_deleted = sqlx::query(
            "DELETE FROM folders WHERE owner_id = $1 AND drive_path LIKE $2 ESCAPE '\\'",
        )
        .bind(owner_id)
        .bind(prefix_pattern(prefix))
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::IndexTransaction, "Folder deletion failed", e)
        })?
        .rows_affected();

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::IndexTransaction, "Failed to commit delete", e)
        })?;

        Ok(SubtreeDeletion {
            folders_deleted,
            files_deleted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("/a/b/"), "/a/b/");
        assert_eq!(escape_like("/100%/"), "/100\\%/");
        assert_eq!(escape_like("/a_b/"), "/a\\_b/");
        assert_eq!(escape_like("/a\\b/"), "/a\\\\b/");
    }

    #[test]
    fn test_prefix_pattern() {
        assert_eq!(prefix_pattern("/a/"), "/a/%");
        assert_eq!(prefix_pattern("/a_b/"), "/a\\_b/%");
    }
}
