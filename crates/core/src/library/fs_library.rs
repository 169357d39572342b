//! Filesystem-backed library implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::config::LibraryConfig;
use crate::metrics::FILE_DELETIONS;

use super::{DeleteOutcome, Library};

/// Library gateway operating on a locally mounted filesystem.
///
/// Stored paths share a configured prefix which is rewritten to the local
/// mount root before any filesystem access.
pub struct FsLibrary {
    config: LibraryConfig,
}

impl FsLibrary {
    /// Create a new filesystem library gateway.
    pub fn new(config: LibraryConfig) -> Self {
        Self { config }
    }

    /// Rewrite a stored parent path to the local mount.
    fn translate(&self, stored_parent: &str) -> Result<PathBuf, String> {
        let prefix = self.config.stored_path_prefix.trim_end_matches('/');
        let stripped = stored_parent
            .strip_prefix(prefix)
            .ok_or_else(|| {
                format!(
                    "Stored path {} does not start with configured prefix {}",
                    stored_parent, prefix
                )
            })?
            .trim_start_matches('/');

        if stripped.is_empty() {
            Ok(self.config.mount_path.clone())
        } else {
            Ok(self.config.mount_path.join(stripped))
        }
    }

    async fn delete_path(path: &Path) -> DeleteOutcome {
        let metadata = match fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Nothing to delete");
                return DeleteOutcome::skipped(format!(
                    "No file found at: {}",
                    path.display()
                ));
            }
            Err(e) => {
                return DeleteOutcome::failed(format!(
                    "Could not stat {}: {}",
                    path.display(),
                    e
                ));
            }
        };

        let result = if metadata.is_dir() {
            fs::remove_dir_all(path).await
        } else {
            fs::remove_file(path).await
        };

        match result {
            Ok(()) => {
                info!(path = %path.display(), "Deleted from library");
                DeleteOutcome::deleted(format!("Deleted: {}", path.display()))
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Library deletion failed");
                DeleteOutcome::failed(format!("Could not delete {}: {}", path.display(), e))
            }
        }
    }
}

#[async_trait]
impl Library for FsLibrary {
    fn name(&self) -> &str {
        "fs"
    }

    async fn delete(&self, parent_path: &str, target_path: &str) -> DeleteOutcome {
        if !self.config.file_deletion_enabled {
            debug!("File deletion is disabled, skipping");
            let outcome = DeleteOutcome::skipped("File deletion is disabled");
            FILE_DELETIONS.with_label_values(&["disabled"]).inc();
            return outcome;
        }

        let base = match self.translate(parent_path) {
            Ok(base) => base,
            Err(warning) => {
                warn!(parent_path, "Path translation failed");
                FILE_DELETIONS.with_label_values(&["failed"]).inc();
                return DeleteOutcome::failed(warning);
            }
        };

        let full_path = base.join(target_path.trim_start_matches('/'));
        let outcome = Self::delete_path(&full_path).await;

        let label = if outcome.deleted {
            "deleted"
        } else if outcome.success {
            "missing"
        } else {
            "failed"
        };
        FILE_DELETIONS.with_label_values(&[label]).inc();

        outcome
    }
}
