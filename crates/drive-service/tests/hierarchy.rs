//! Hierarchy mutation tests against the in-memory index and object store.

use std::sync::Arc;

use bytes::Bytes;
use uuid::Uuid;

use drive_core::error::ErrorKind;
use drive_database::index::{HierarchyIndex, MemoryHierarchyIndex};
use drive_service::{HierarchyService, RequestContext};
use drive_storage::remote::MemoryObjectStore;
use drive_storage::{BlobStore, LocalVolume};

struct Fixture {
    service: HierarchyService,
    index: Arc<MemoryHierarchyIndex>,
    remote: MemoryObjectStore,
    ctx: RequestContext,
    _dir: tempfile::TempDir,
}

async fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let local = LocalVolume::new(dir.path().to_str().unwrap()).await.unwrap();
    let remote = MemoryObjectStore::new();
    let blobs = Arc::new(BlobStore::new(local, Arc::new(remote.clone())));
    let index = Arc::new(MemoryHierarchyIndex::new());
    let service = HierarchyService::new(index.clone(), blobs);
    let ctx = RequestContext::new(Uuid::new_v4(), "alice".to_string());
    Fixture {
        service,
        index,
        remote,
        ctx,
        _dir: dir,
    }
}

async fn save(fx: &Fixture, path: &str, name: &str) -> drive_entity::file::File {
    fx.service
        .save_file(
            &fx.ctx,
            path,
            name,
            Bytes::from("content"),
            Some("text/plain".to_string()),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn create_folder_chain_creates_every_ancestor() {
    let fx = fixture().await;

    let created = fx
        .service
        .create_folder_chain(&fx.ctx, "/a/b/c/")
        .await
        .unwrap();

    let paths: Vec<&str> = created.iter().map(|f| f.drive_path.as_str()).collect();
    assert_eq!(paths, vec!["/a/", "/a/b/", "/a/b/c/"]);
    assert_eq!(created[2].name, "c");
}

#[tokio::test]
async fn create_folder_chain_rejects_existing_leaf_without_new_records() {
    let fx = fixture().await;
    fx.service
        .create_folder_chain(&fx.ctx, "/a/b/c/")
        .await
        .unwrap();

    let err = fx
        .service
        .create_folder_chain(&fx.ctx, "/a/b/c/")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::DuplicateEntry);

    let (folders, _) = fx.service.list_entries(&fx.ctx).await.unwrap();
    assert_eq!(folders.len(), 3);
}

#[tokio::test]
async fn create_folder_chain_keys_existence_on_full_path_not_name() {
    let fx = fixture().await;

    // Two branches sharing the leaf name "docs" must both materialize.
    fx.service
        .create_folder_chain(&fx.ctx, "/work/docs/")
        .await
        .unwrap();
    fx.service
        .create_folder_chain(&fx.ctx, "/home/docs/")
        .await
        .unwrap();

    let (folders, _) = fx.service.list_entries(&fx.ctx).await.unwrap();
    let paths: Vec<&str> = folders.iter().map(|f| f.drive_path.as_str()).collect();
    assert_eq!(paths, vec!["/home/", "/home/docs/", "/work/", "/work/docs/"]);
}

#[tokio::test]
async fn create_folder_chain_rejects_malformed_path() {
    let fx = fixture().await;
    let err = fx
        .service
        .create_folder_chain(&fx.ctx, "/a//b/")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::PathConflict);
}

#[tokio::test]
async fn save_file_writes_record_and_both_backends() {
    let fx = fixture().await;

    let file = save(&fx, "work/docs", "report.pdf").await;

    assert_eq!(file.drive_path, "/work/docs/");
    assert_eq!(file.original_name, "report.pdf");
    assert!(file.stored_name.starts_with("report_"));
    assert!(file.stored_name.ends_with(".pdf"));
    assert_eq!(
        file.physical_path,
        format!("{}/{}", fx.ctx.user_id, file.stored_name)
    );
    assert!(fx.remote.contains(&file.remote_key).await);

    // Implicit ancestors were materialized.
    let (folders, _) = fx.service.list_entries(&fx.ctx).await.unwrap();
    let paths: Vec<&str> = folders.iter().map(|f| f.drive_path.as_str()).collect();
    assert_eq!(paths, vec!["/work/", "/work/docs/"]);
}

#[tokio::test]
async fn save_file_into_root_needs_no_folder() {
    let fx = fixture().await;

    let file = save(&fx, "", "notes.txt").await;
    assert_eq!(file.drive_path, "/");

    let (folders, files) = fx.service.list_entries(&fx.ctx).await.unwrap();
    assert!(folders.is_empty());
    assert_eq!(files.len(), 1);
}

#[tokio::test]
async fn save_file_rejects_duplicate_name_in_same_folder() {
    let fx = fixture().await;
    save(&fx, "/a/", "report.pdf").await;

    let err = fx
        .service
        .save_file(
            &fx.ctx,
            "/a/",
            "report.pdf",
            Bytes::from("other"),
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::DuplicateEntry);

    // Same name elsewhere, or under another owner, is fine.
    save(&fx, "/b/", "report.pdf").await;
    let other = RequestContext::new(Uuid::new_v4(), "bob".to_string());
    fx.service
        .save_file(&other, "/a/", "report.pdf", Bytes::from("x"), None)
        .await
        .unwrap();
}

#[tokio::test]
async fn save_file_remote_failure_keeps_local_and_skips_record() {
    let fx = fixture().await;
    fx.remote.set_fail_puts(true);

    let err = fx
        .service
        .save_file(&fx.ctx, "/a/", "report.pdf", Bytes::from("x"), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::PartialWrite);

    let (_, files) = fx.service.list_entries(&fx.ctx).await.unwrap();
    assert!(files.is_empty());
    // Retrying after the backend recovers succeeds with the same name.
    fx.remote.set_fail_puts(false);
    save(&fx, "/a/", "report.pdf").await;
}

#[tokio::test]
async fn rename_folder_cascades_to_every_descendant() {
    let fx = fixture().await;
    fx.service
        .create_folder_chain(&fx.ctx, "/a/b/")
        .await
        .unwrap();
    fx.service.create_folder_chain(&fx.ctx, "/a/c/").await.unwrap();
    save(&fx, "/a/b/", "deep.txt").await;
    save(&fx, "/a/", "shallow.txt").await;
    // A sibling sharing the name prefix must be untouched.
    fx.service.create_folder_chain(&fx.ctx, "/ab/").await.unwrap();

    let cascade = fx.service.rename_folder(&fx.ctx, "/a/", "x").await.unwrap();
    assert_eq!(cascade.folder.drive_path, "/x/");
    assert_eq!(cascade.folder.name, "x");
    assert_eq!(cascade.folders_updated, 2);
    assert_eq!(cascade.files_updated, 2);

    let (folders, files) = fx.service.list_entries(&fx.ctx).await.unwrap();
    let folder_paths: Vec<&str> = folders.iter().map(|f| f.drive_path.as_str()).collect();
    assert_eq!(folder_paths, vec!["/ab/", "/x/", "/x/b/", "/x/c/"]);
    assert!(folders.iter().all(|f| !f.drive_path.starts_with("/a/")));
    assert!(files.iter().all(|f| f.drive_path.starts_with("/x/")));
}

#[tokio::test]
async fn rename_folder_rejects_collision_with_existing_folder() {
    let fx = fixture().await;
    fx.service.create_folder_chain(&fx.ctx, "/a/").await.unwrap();
    fx.service.create_folder_chain(&fx.ctx, "/b/").await.unwrap();

    let err = fx
        .service
        .rename_folder(&fx.ctx, "/a/", "b")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::DuplicateEntry);
}

#[tokio::test]
async fn rename_folder_missing_target_is_not_found() {
    let fx = fixture().await;
    let err = fx
        .service
        .rename_folder(&fx.ctx, "/nope/", "x")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn rename_folder_moves_no_content() {
    let fx = fixture().await;
    let file = save(&fx, "/a/", "report.pdf").await;

    fx.service.rename_folder(&fx.ctx, "/a/", "x").await.unwrap();

    // Blob locations are untouched by a folder rename.
    let renamed = fx
        .index
        .find_file_by_id(fx.ctx.user_id, file.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(renamed.drive_path, "/x/");
    assert_eq!(renamed.physical_path, file.physical_path);
    assert_eq!(renamed.remote_key, file.remote_key);
    assert!(fx.remote.contains(&file.remote_key).await);
}

#[tokio::test]
async fn rename_file_moves_content_and_updates_record() {
    let fx = fixture().await;
    let file = save(&fx, "/a/", "report.pdf").await;

    let renamed = fx
        .service
        .rename_file(&fx.ctx, file.id, "summary.pdf")
        .await
        .unwrap();

    assert_eq!(renamed.original_name, "summary.pdf");
    assert!(renamed.stored_name.starts_with("summary_"));
    assert!(renamed.stored_name.ends_with(".pdf"));
    assert_ne!(renamed.remote_key, file.remote_key);
    assert!(!fx.remote.contains(&file.remote_key).await);
    assert!(fx.remote.contains(&renamed.remote_key).await);
}

#[tokio::test]
async fn rename_file_without_extension_keeps_previous() {
    let fx = fixture().await;
    let file = save(&fx, "/a/", "report.pdf").await;

    let renamed = fx
        .service
        .rename_file(&fx.ctx, file.id, "summary")
        .await
        .unwrap();
    assert!(renamed.stored_name.ends_with(".pdf"));
}

#[tokio::test]
async fn rename_file_failed_remote_copy_changes_nothing() {
    let fx = fixture().await;
    let file = save(&fx, "/a/", "report.pdf").await;
    fx.remote.set_fail_copies(true);

    let err = fx
        .service
        .rename_file(&fx.ctx, file.id, "summary.pdf")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::RemoteBackend);

    // Old object untouched, record unchanged.
    assert!(fx.remote.contains(&file.remote_key).await);
    let unchanged = fx
        .index
        .find_file_by_id(fx.ctx.user_id, file.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.original_name, "report.pdf");
    assert_eq!(unchanged.remote_key, file.remote_key);
}

#[tokio::test]
async fn rename_file_rejects_existing_name_in_folder() {
    let fx = fixture().await;
    save(&fx, "/a/", "report.pdf").await;
    let second = save(&fx, "/a/", "draft.pdf").await;

    let err = fx
        .service
        .rename_file(&fx.ctx, second.id, "report.pdf")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::DuplicateEntry);
}

#[tokio::test]
async fn rename_file_of_other_owner_is_not_found() {
    let fx = fixture().await;
    let file = save(&fx, "/a/", "report.pdf").await;

    let other = RequestContext::new(Uuid::new_v4(), "bob".to_string());
    let err = fx
        .service
        .rename_file(&other, file.id, "mine.pdf")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn delete_folder_removes_subtree_records_and_blobs() {
    let fx = fixture().await;
    fx.service.create_folder_chain(&fx.ctx, "/a/c/").await.unwrap();
    let file = save(&fx, "/a/b/", "file.txt").await;
    save(&fx, "/keep/", "other.txt").await;

    let deletion = fx.service.delete_folder(&fx.ctx, "/a/").await.unwrap();
    assert_eq!(deletion.folders_deleted, 3); // /a/, /a/b/, /a/c/
    assert_eq!(deletion.files_deleted, 1);

    let (folders, files) = fx.service.list_entries(&fx.ctx).await.unwrap();
    assert!(folders.iter().all(|f| !f.drive_path.starts_with("/a/")));
    assert!(files.iter().all(|f| !f.drive_path.starts_with("/a/")));
    assert_eq!(files.len(), 1);
    assert!(!fx.remote.contains(&file.remote_key).await);
}

#[tokio::test]
async fn delete_folder_tolerates_blob_backend_failure() {
    let fx = fixture().await;
    let file = save(&fx, "/a/", "file.txt").await;
    fx.remote.set_fail_deletes(true);

    // Index cleanup must proceed even though the remote delete fails.
    fx.service.delete_folder(&fx.ctx, "/a/").await.unwrap();

    let (folders, files) = fx.service.list_entries(&fx.ctx).await.unwrap();
    assert!(folders.is_empty());
    assert!(files.is_empty());
    // The orphaned object is accepted residual garbage.
    assert!(fx.remote.contains(&file.remote_key).await);
}

#[tokio::test]
async fn delete_file_removes_record_and_blobs() {
    let fx = fixture().await;
    let file = save(&fx, "/a/", "file.txt").await;

    fx.service.delete_file(&fx.ctx, file.id).await.unwrap();

    let (_, files) = fx.service.list_entries(&fx.ctx).await.unwrap();
    assert!(files.is_empty());
    assert!(!fx.remote.contains(&file.remote_key).await);

    let err = fx.service.delete_file(&fx.ctx, file.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn list_entries_is_owner_scoped() {
    let fx = fixture().await;
    save(&fx, "/a/", "mine.txt").await;

    let other = RequestContext::new(Uuid::new_v4(), "bob".to_string());
    let (folders, files) = fx.service.list_entries(&other).await.unwrap();
    assert!(folders.is_empty());
    assert!(files.is_empty());
}

#[tokio::test]
async fn concurrent_same_owner_mutations_keep_invariants() {
    let fx = fixture().await;
    fx.service.create_folder_chain(&fx.ctx, "/a/b/").await.unwrap();
    save(&fx, "/a/b/", "file.txt").await;

    // A rename racing a delete over overlapping subtrees must serialize;
    // whichever loses sees a consistent index, and no file may end up
    // referencing a folder path that no longer exists.
    let rename = {
        let service = fx.service.clone();
        let ctx = fx.ctx.clone();
        tokio::spawn(async move { service.rename_folder(&ctx, "/a/", "z").await })
    };
    let delete = {
        let service = fx.service.clone();
        let ctx = fx.ctx.clone();
        tokio::spawn(async move { service.delete_folder(&ctx, "/a/").await })
    };

    let _ = rename.await.unwrap();
    let _ = delete.await.unwrap();

    let (folders, files) = fx.service.list_entries(&fx.ctx).await.unwrap();
    let folder_paths: Vec<&str> = folders.iter().map(|f| f.drive_path.as_str()).collect();
    for file in &files {
        assert!(
            file.drive_path == "/" || folder_paths.contains(&file.drive_path.as_str()),
            "file at '{}' references a missing folder",
            file.drive_path
        );
    }
}
