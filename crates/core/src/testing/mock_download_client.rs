//! Mock download client for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::downloader::{AddOutcome, DownloadClient, RemoveOutcome};

/// Mock implementation of the DownloadClient trait.
///
/// Provides controllable behavior for testing:
/// - Seed torrents the daemon "has"
/// - Record removal calls for assertions
/// - Simulate a connectivity failure on the next operation
#[derive(Debug, Default)]
pub struct MockDownloadClient {
    /// Torrents currently present, hash -> name.
    torrents: Arc<RwLock<HashMap<String, String>>>,
    /// Recorded remove_torrent calls as (hash, delete_data).
    removed: Arc<RwLock<Vec<(String, bool)>>>,
    /// If set, the next operation fails with this message.
    next_error: Arc<RwLock<Option<String>>>,
}

impl MockDownloadClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a torrent visible to the mock daemon.
    pub async fn seed_torrent(&self, hash: &str, name: &str) {
        self.torrents
            .write()
            .await
            .insert(hash.to_lowercase(), name.to_string());
    }

    /// Fail the next operation with the given message.
    pub async fn fail_next(&self, message: &str) {
        *self.next_error.write().await = Some(message.to_string());
    }

    /// All recorded remove_torrent calls.
    pub async fn removed_torrents(&self) -> Vec<(String, bool)> {
        self.removed.read().await.clone()
    }

    async fn take_error(&self) -> Option<String> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl DownloadClient for MockDownloadClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn exists(&self, hash: &str) -> bool {
        if self.take_error().await.is_some() {
            return false;
        }
        self.torrents.read().await.contains_key(&hash.to_lowercase())
    }

    async fn remove_torrent(&self, hash: &str, delete_data: bool) -> RemoveOutcome {
        if let Some(message) = self.take_error().await {
            return RemoveOutcome::failure(message);
        }

        let hash = hash.to_lowercase();
        let removed = self.torrents.write().await.remove(&hash);
        match removed {
            Some(name) => {
                self.removed.write().await.push((hash, delete_data));
                RemoveOutcome {
                    success: true,
                    found: true,
                    name: Some(name.clone()),
                    message: format!("Torrent removed: {}", name),
                }
            }
            None => RemoveOutcome {
                success: true,
                found: false,
                name: None,
                message: format!("Torrent not found: {}", hash),
            },
        }
    }

    async fn add_torrent(&self, link: &str, hash: Option<&str>) -> AddOutcome {
        if let Some(message) = self.take_error().await {
            return AddOutcome::failure(message);
        }

        if let Some(hash) = hash {
            if self.torrents.read().await.contains_key(&hash.to_lowercase()) {
                return AddOutcome {
                    success: true,
                    already_exists: true,
                    name: None,
                    message: format!("Torrent already present: {}", hash),
                };
            }
        }

        let key = hash
            .map(|h| h.to_lowercase())
            .unwrap_or_else(|| link.to_string());
        self.torrents
            .write()
            .await
            .insert(key, "mock-torrent".to_string());

        AddOutcome {
            success: true,
            already_exists: false,
            name: Some("mock-torrent".to_string()),
            message: "Torrent added".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_remove_seeded_torrent() {
        let client = MockDownloadClient::new();
        client.seed_torrent("ABC123", "Test Torrent").await;

        assert!(client.exists("abc123").await);

        let outcome = client.remove_torrent("abc123", true).await;
        assert!(outcome.success);
        assert!(outcome.found);
        assert_eq!(outcome.name.as_deref(), Some("Test Torrent"));

        assert!(!client.exists("abc123").await);
        assert_eq!(
            client.removed_torrents().await,
            vec![("abc123".to_string(), true)]
        );
    }

    #[tokio::test]
    async fn test_remove_absent_torrent_is_benign() {
        let client = MockDownloadClient::new();
        let outcome = client.remove_torrent("missing", false).await;
        assert!(outcome.success);
        assert!(!outcome.found);
    }

    #[tokio::test]
    async fn test_fail_next_applies_once() {
        let client = MockDownloadClient::new();
        client.seed_torrent("abc123", "Test Torrent").await;
        client.fail_next("connection refused").await;

        let outcome = client.remove_torrent("abc123", false).await;
        assert!(!outcome.success);

        // Failure is consumed; the torrent is still there.
        let outcome = client.remove_torrent("abc123", false).await;
        assert!(outcome.success);
        assert!(outcome.found);
    }

    #[tokio::test]
    async fn test_idempotent_add() {
        let client = MockDownloadClient::new();
        client.seed_torrent("abc123", "Test Torrent").await;

        let outcome = client
            .add_torrent("magnet:?xt=urn:btih:abc123", Some("abc123"))
            .await;
        assert!(outcome.success);
        assert!(outcome.already_exists);
    }
}
