//! Types for download daemon operations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while talking to the daemon. These stay internal
/// to the gateway implementations; the trait surface reports outcomes.
#[derive(Debug, Error)]
pub enum DownloadClientError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Request timeout")]
    Timeout,
}

/// Result of removing a torrent.
///
/// `success = true, found = false` means the torrent was already absent,
/// which removal treats as done.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveOutcome {
    pub success: bool,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub message: String,
}

impl RemoveOutcome {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            found: false,
            name: None,
            message: message.into(),
        }
    }
}

/// Result of adding a torrent.
///
/// A daemon-side duplicate is reported as `success = true,
/// already_exists = true`, never as a failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddOutcome {
    pub success: bool,
    pub already_exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub message: String,
}

impl AddOutcome {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            already_exists: false,
            name: None,
            message: message.into(),
        }
    }
}

/// Trait for download daemon backends.
#[async_trait]
pub trait DownloadClient: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Check whether a torrent with the given content hash is present.
    /// Connectivity problems read as absent.
    async fn exists(&self, hash: &str) -> bool;

    /// Remove a torrent by content hash. When `delete_data` is true the
    /// daemon also deletes the downloaded payload.
    async fn remove_torrent(&self, hash: &str, delete_data: bool) -> RemoveOutcome;

    /// Add a torrent from a link (magnet or .torrent URL). When `hash` is
    /// supplied and already present, the add is skipped (idempotent add).
    async fn add_torrent(&self, link: &str, hash: Option<&str>) -> AddOutcome;
}
