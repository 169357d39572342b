//! Orchestrator for the reject and soft-delete workflows.

use std::sync::Arc;

use tracing::{info, warn};

use crate::downloader::DownloadClient;
use crate::library::Library;
use crate::metrics::{REJECTIONS_TOTAL, SOFT_DELETES_TOTAL, TORRENT_REMOVALS};
use crate::store::{Label, RecordStore, StoreError, TrainingPatch};

use super::{torrent_hash_from_link, RejectOutcome, SoftDeleteOutcome};

/// Coordinates the compound state transitions around "this item is not
/// wanted anymore".
///
/// The store write is the single authoritative step: its failure fails the
/// workflow, while daemon and filesystem teardown are attempted once each
/// and downgraded to outcome fields on failure. A second run over the same
/// item finds nothing left to tear down and reports that as the normal
/// outcome.
pub struct RejectionOrchestrator {
    store: Arc<dyn RecordStore>,
    downloader: Arc<dyn DownloadClient>,
    library: Arc<dyn Library>,
}

impl RejectionOrchestrator {
    pub fn new(
        store: Arc<dyn RecordStore>,
        downloader: Arc<dyn DownloadClient>,
        library: Arc<dyn Library>,
    ) -> Self {
        Self {
            store,
            downloader,
            library,
        }
    }

    /// Reject a training item: set its label to would_not_watch, then tear
    /// down the downloaded file and the active torrent best-effort.
    pub async fn reject(&self, imdb_id: &str) -> Result<RejectOutcome, StoreError> {
        // Authoritative step. NotFound or a database error stops everything.
        let update = self
            .store
            .update_training(
                imdb_id,
                &TrainingPatch {
                    label: Some(Label::WouldNotWatch),
                    ..Default::default()
                },
            )
            .inspect_err(|e| {
                let result = match e {
                    StoreError::NotFound(_) => "not_found",
                    _ => "error",
                };
                REJECTIONS_TOTAL.with_label_values(&[result]).inc();
            })?;

        let mut outcome = RejectOutcome {
            success: true,
            message: update.message,
            file_deleted: false,
            file_deletion_warning: None,
            torrent_removed: false,
        };

        // Everything below is best-effort; a read failure here must not
        // undo or fail the label change.
        let paths = match self.store.media_paths_for_imdb(imdb_id) {
            Ok(paths) => paths,
            Err(e) => {
                warn!(imdb_id, error = %e, "Media path resolution failed");
                outcome.file_deletion_warning =
                    Some(format!("Could not resolve media paths: {}", e));
                None
            }
        };

        match paths {
            Some(paths) => {
                match (&paths.parent_path, &paths.target_path) {
                    (Some(parent), Some(target)) => {
                        let deletion = self.library.delete(parent, target).await;
                        outcome.file_deleted = deletion.deleted;
                        if !deletion.success {
                            outcome.file_deletion_warning =
                                deletion.warning.or(Some(deletion.message));
                        } else {
                            info!(imdb_id, deleted = deletion.deleted, "File teardown done");
                        }
                    }
                    _ => {
                        outcome.file_deletion_warning =
                            Some(format!("No stored path for media item: {}", paths.hash));
                    }
                }

                match paths.original_link.as_deref().and_then(torrent_hash_from_link) {
                    Some(hash) => {
                        // The file teardown above is the authoritative
                        // deletion path, so the daemon keeps its data.
                        let removal = self.downloader.remove_torrent(&hash, false).await;
                        outcome.torrent_removed = removal.success && removal.found;
                        let label = if outcome.torrent_removed {
                            "removed"
                        } else if removal.success {
                            "not_found"
                        } else {
                            "failed"
                        };
                        TORRENT_REMOVALS.with_label_values(&[label]).inc();
                    }
                    None => {
                        TORRENT_REMOVALS.with_label_values(&["skipped"]).inc();
                    }
                }
            }
            None => {
                if outcome.file_deletion_warning.is_none() {
                    outcome.file_deletion_warning =
                        Some(format!("No media record found for: {}", imdb_id));
                }
                TORRENT_REMOVALS.with_label_values(&["skipped"]).inc();
            }
        }

        REJECTIONS_TOTAL.with_label_values(&["success"]).inc();
        Ok(outcome)
    }

    /// Soft-delete a media item by hash: attempt torrent removal first
    /// (including its downloaded data), then perform the authoritative
    /// soft-delete write. Only the write determines success.
    pub async fn soft_delete(&self, hash: &str) -> Result<SoftDeleteOutcome, StoreError> {
        let mut torrent_removed = false;
        let mut removal_note: Option<String> = None;

        match self.store.get_media_by_hash(hash) {
            Ok(Some(record)) => {
                let torrent_hash = record
                    .original_link
                    .as_deref()
                    .and_then(torrent_hash_from_link)
                    .unwrap_or_else(|| hash.to_string());
                let removal = self.downloader.remove_torrent(&torrent_hash, true).await;
                torrent_removed = removal.success && removal.found;
                if removal.success {
                    info!(hash, found = removal.found, "Torrent teardown done");
                } else {
                    warn!(hash, message = %removal.message, "Torrent teardown failed");
                    removal_note = Some(removal.message);
                }
                let label = if torrent_removed {
                    "removed"
                } else if removal.success {
                    "not_found"
                } else {
                    "failed"
                };
                TORRENT_REMOVALS.with_label_values(&[label]).inc();
            }
            Ok(None) => {
                // Missing or already deleted; the write below classifies it.
            }
            Err(e) => {
                warn!(hash, error = %e, "Media lookup failed before soft delete");
            }
        }

        let deleted_at = self.store.soft_delete_media(hash).inspect_err(|e| {
            let result = match e {
                StoreError::NotFound(_) => "not_found",
                StoreError::AlreadyDeleted(_) => "conflict",
                _ => "error",
            };
            SOFT_DELETES_TOTAL.with_label_values(&[result]).inc();
        })?;

        let mut message = format!("Media soft deleted: {}", hash);
        if let Some(note) = removal_note {
            message.push_str(&format!(" (torrent removal failed: {})", note));
        }

        SOFT_DELETES_TOTAL.with_label_values(&["success"]).inc();
        Ok(SoftDeleteOutcome {
            success: true,
            message,
            torrent_removed,
            deleted_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LibraryConfig;
    use crate::library::FsLibrary;
    use crate::store::{RecordStore, SqliteRecordStore, TrainingFilter};
    use crate::testing::fixtures::{media_record, training_record};
    use crate::testing::{MockDownloadClient, MockLibrary};
    use tempfile::TempDir;

    const TEST_HASH: &str = "0000000000000000000000000000000099999901";
    const TEST_TORRENT_HASH: &str = "55af51b9883b2e29e02fc728113747c706e480e3";

    struct TestContext {
        store: Arc<SqliteRecordStore>,
        downloader: Arc<MockDownloadClient>,
        library: Arc<MockLibrary>,
        orchestrator: RejectionOrchestrator,
    }

    fn setup() -> TestContext {
        let store = Arc::new(SqliteRecordStore::in_memory().unwrap());
        let downloader = Arc::new(MockDownloadClient::new());
        let library = Arc::new(MockLibrary::new());
        let orchestrator = RejectionOrchestrator::new(
            Arc::clone(&store) as Arc<dyn RecordStore>,
            Arc::clone(&downloader) as Arc<dyn DownloadClient>,
            Arc::clone(&library) as Arc<dyn Library>,
        );
        TestContext {
            store,
            downloader,
            library,
            orchestrator,
        }
    }

    fn seed(ctx: &TestContext) {
        ctx.store
            .insert_training(&training_record("tt9999901"))
            .unwrap();
        ctx.store
            .insert_media(&media_record(TEST_HASH, "tt9999901"))
            .unwrap();
    }

    fn persisted_label(ctx: &TestContext) -> (Label, bool, bool) {
        let page = ctx.store.list_training(&TrainingFilter::default()).unwrap();
        let record = &page.data[0];
        (record.label, record.human_labeled, record.reviewed)
    }

    #[tokio::test]
    async fn test_reject_full_teardown() {
        let ctx = setup();
        seed(&ctx);
        ctx.downloader.seed_torrent(TEST_TORRENT_HASH, "Movie X").await;

        let outcome = ctx.orchestrator.reject("tt9999901").await.unwrap();

        assert!(outcome.success);
        assert!(outcome.file_deleted);
        assert!(outcome.file_deletion_warning.is_none());
        assert!(outcome.torrent_removed);

        let (label, human_labeled, reviewed) = persisted_label(&ctx);
        assert_eq!(label, Label::WouldNotWatch);
        assert!(human_labeled);
        assert!(reviewed);

        // The reject path leaves the daemon's payload alone; the library
        // teardown owns the data.
        let removals = ctx.downloader.removed_torrents().await;
        assert_eq!(removals, vec![(TEST_TORRENT_HASH.to_string(), false)]);
    }

    #[tokio::test]
    async fn test_reject_unknown_id_is_not_found() {
        let ctx = setup();
        seed(&ctx);

        let result = ctx.orchestrator.reject("tt7777777").await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));

        // Nothing was torn down.
        assert!(ctx.downloader.removed_torrents().await.is_empty());
        assert!(ctx.library.deletions().await.is_empty());
    }

    #[tokio::test]
    async fn test_reject_without_media_row_warns_and_succeeds() {
        let ctx = setup();
        ctx.store
            .insert_training(&training_record("tt9999901"))
            .unwrap();

        let outcome = ctx.orchestrator.reject("tt9999901").await.unwrap();

        assert!(outcome.success);
        assert!(!outcome.file_deleted);
        assert!(outcome.file_deletion_warning.is_some());
        assert!(!outcome.torrent_removed);

        let (label, _, _) = persisted_label(&ctx);
        assert_eq!(label, Label::WouldNotWatch);
    }

    #[tokio::test]
    async fn test_reject_survives_library_failure() {
        let ctx = setup();
        seed(&ctx);
        ctx.library
            .fail_next("Could not delete /mnt/media/library/movies/movie-x: permission denied")
            .await;

        let outcome = ctx.orchestrator.reject("tt9999901").await.unwrap();

        assert!(outcome.success);
        assert!(!outcome.file_deleted);
        let warning = outcome.file_deletion_warning.unwrap();
        assert!(warning.contains("permission denied"));

        let (label, _, _) = persisted_label(&ctx);
        assert_eq!(label, Label::WouldNotWatch);
    }

    #[tokio::test]
    async fn test_reject_survives_daemon_failure() {
        let ctx = setup();
        seed(&ctx);
        ctx.downloader.fail_next("connection refused").await;

        let outcome = ctx.orchestrator.reject("tt9999901").await.unwrap();

        assert!(outcome.success);
        assert!(!outcome.torrent_removed);

        let (label, _, _) = persisted_label(&ctx);
        assert_eq!(label, Label::WouldNotWatch);
    }

    #[tokio::test]
    async fn test_reject_twice_is_idempotent() {
        let ctx = setup();
        seed(&ctx);
        ctx.downloader.seed_torrent(TEST_TORRENT_HASH, "Movie X").await;

        let first = ctx.orchestrator.reject("tt9999901").await.unwrap();
        assert!(first.success);
        assert!(first.torrent_removed);

        // Second run finds nothing left to remove but still succeeds.
        let second = ctx.orchestrator.reject("tt9999901").await.unwrap();
        assert!(second.success);
        assert!(!second.torrent_removed);

        let (label, _, _) = persisted_label(&ctx);
        assert_eq!(label, Label::WouldNotWatch);
    }

    #[tokio::test]
    async fn test_reject_with_real_library_deletes_file() {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(SqliteRecordStore::in_memory().unwrap());
        let downloader = Arc::new(MockDownloadClient::new());
        let library = Arc::new(FsLibrary::new(LibraryConfig {
            file_deletion_enabled: true,
            stored_path_prefix: "/data/media".to_string(),
            mount_path: temp.path().to_path_buf(),
        }));
        let orchestrator = RejectionOrchestrator::new(
            Arc::clone(&store) as Arc<dyn RecordStore>,
            downloader as Arc<dyn DownloadClient>,
            library as Arc<dyn Library>,
        );

        store.insert_training(&training_record("tt9999901")).unwrap();
        let mut media = media_record(TEST_HASH, "tt9999901");
        media.parent_path = Some("/data/media/library/movies".to_string());
        media.target_path = Some("movie-x".to_string());
        store.insert_media(&media).unwrap();

        let movie_dir = temp.path().join("library/movies/movie-x");
        std::fs::create_dir_all(&movie_dir).unwrap();
        std::fs::write(movie_dir.join("movie.mkv"), "payload").unwrap();

        let outcome = orchestrator.reject("tt9999901").await.unwrap();
        assert!(outcome.success);
        assert!(outcome.file_deleted);
        assert!(!movie_dir.exists());
    }

    #[tokio::test]
    async fn test_reject_with_real_library_missing_file_is_informational() {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(SqliteRecordStore::in_memory().unwrap());
        let downloader = Arc::new(MockDownloadClient::new());
        let library = Arc::new(FsLibrary::new(LibraryConfig {
            file_deletion_enabled: true,
            stored_path_prefix: "/data/media".to_string(),
            mount_path: temp.path().to_path_buf(),
        }));
        let orchestrator = RejectionOrchestrator::new(
            Arc::clone(&store) as Arc<dyn RecordStore>,
            downloader as Arc<dyn DownloadClient>,
            library as Arc<dyn Library>,
        );

        store.insert_training(&training_record("tt9999901")).unwrap();
        store.insert_media(&media_record(TEST_HASH, "tt9999901")).unwrap();

        let outcome = orchestrator.reject("tt9999901").await.unwrap();
        assert!(outcome.success);
        assert!(!outcome.file_deleted);
        // Missing file is informational, not a warning.
        assert!(outcome.file_deletion_warning.is_none());

        let page = store.list_training(&TrainingFilter::default()).unwrap();
        assert_eq!(page.data[0].label, Label::WouldNotWatch);
    }

    #[tokio::test]
    async fn test_soft_delete_removes_torrent_with_data() {
        let ctx = setup();
        seed(&ctx);
        ctx.downloader.seed_torrent(TEST_TORRENT_HASH, "Movie X").await;

        let outcome = ctx.orchestrator.soft_delete(TEST_HASH).await.unwrap();

        assert!(outcome.success);
        assert!(outcome.torrent_removed);

        let removals = ctx.downloader.removed_torrents().await;
        assert_eq!(removals, vec![(TEST_TORRENT_HASH.to_string(), true)]);

        assert!(ctx.store.get_media_by_hash(TEST_HASH).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_soft_delete_twice_is_conflict() {
        let ctx = setup();
        seed(&ctx);

        let first = ctx.orchestrator.soft_delete(TEST_HASH).await.unwrap();
        assert!(first.success);

        let second = ctx.orchestrator.soft_delete(TEST_HASH).await;
        assert!(matches!(second, Err(StoreError::AlreadyDeleted(_))));
    }

    #[tokio::test]
    async fn test_soft_delete_missing_is_not_found() {
        let ctx = setup();
        let result = ctx
            .orchestrator
            .soft_delete("cccccccccccccccccccccccccccccccccccccccc")
            .await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_soft_delete_succeeds_despite_daemon_failure() {
        let ctx = setup();
        seed(&ctx);
        ctx.downloader.fail_next("daemon unreachable").await;

        let outcome = ctx.orchestrator.soft_delete(TEST_HASH).await.unwrap();

        assert!(outcome.success);
        assert!(!outcome.torrent_removed);
        assert!(outcome.message.contains("torrent removal failed"));

        assert!(ctx.store.get_media_by_hash(TEST_HASH).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_soft_delete_falls_back_to_row_hash_without_link() {
        let ctx = setup();
        ctx.store
            .insert_training(&training_record("tt9999901"))
            .unwrap();
        let mut media = media_record(TEST_HASH, "tt9999901");
        media.original_link = None;
        ctx.store.insert_media(&media).unwrap();
        ctx.downloader.seed_torrent(TEST_HASH, "Movie X").await;

        ctx.orchestrator.soft_delete(TEST_HASH).await.unwrap();

        let removals = ctx.downloader.removed_torrents().await;
        assert_eq!(removals, vec![(TEST_HASH.to_string(), true)]);
    }
}
