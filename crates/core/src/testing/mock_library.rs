//! Mock library gateway for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::library::{DeleteOutcome, Library};

/// Mock implementation of the Library trait.
///
/// By default every deletion reports `deleted = true`; `fail_next` turns
/// the next call into a structured failure, `miss_next` into a benign
/// "nothing on disk" outcome. All calls are recorded for assertions.
#[derive(Debug, Default)]
pub struct MockLibrary {
    deletions: Arc<RwLock<Vec<(String, String)>>>,
    next_failure: Arc<RwLock<Option<String>>>,
    next_miss: Arc<RwLock<bool>>,
}

impl MockLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next deletion with the given warning.
    pub async fn fail_next(&self, warning: &str) {
        *self.next_failure.write().await = Some(warning.to_string());
    }

    /// Report "nothing on disk" for the next deletion.
    pub async fn miss_next(&self) {
        *self.next_miss.write().await = true;
    }

    /// All recorded delete calls as (parent_path, target_path).
    pub async fn deletions(&self) -> Vec<(String, String)> {
        self.deletions.read().await.clone()
    }
}

#[async_trait]
impl Library for MockLibrary {
    fn name(&self) -> &str {
        "mock"
    }

    async fn delete(&self, parent_path: &str, target_path: &str) -> DeleteOutcome {
        self.deletions
            .write()
            .await
            .push((parent_path.to_string(), target_path.to_string()));

        if let Some(warning) = self.next_failure.write().await.take() {
            return DeleteOutcome::failed(warning);
        }

        if std::mem::take(&mut *self.next_miss.write().await) {
            return DeleteOutcome::skipped(format!(
                "No file found at: {}/{}",
                parent_path, target_path
            ));
        }

        DeleteOutcome::deleted(format!("Deleted: {}/{}", parent_path, target_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_deletes() {
        let library = MockLibrary::new();
        let outcome = library.delete("/data/media", "movie-x").await;
        assert!(outcome.success);
        assert!(outcome.deleted);
        assert_eq!(
            library.deletions().await,
            vec![("/data/media".to_string(), "movie-x".to_string())]
        );
    }

    #[tokio::test]
    async fn test_fail_next() {
        let library = MockLibrary::new();
        library.fail_next("permission denied").await;

        let outcome = library.delete("/data/media", "movie-x").await;
        assert!(!outcome.success);
        assert_eq!(outcome.warning.as_deref(), Some("permission denied"));

        let outcome = library.delete("/data/media", "movie-x").await;
        assert!(outcome.success);
    }

    #[tokio::test]
    async fn test_miss_next() {
        let library = MockLibrary::new();
        library.miss_next().await;

        let outcome = library.delete("/data/media", "movie-x").await;
        assert!(outcome.success);
        assert!(!outcome.deleted);
        assert!(outcome.warning.is_none());
    }
}
