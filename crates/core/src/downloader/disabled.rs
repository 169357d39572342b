//! Placeholder client used when no daemon is configured.

use async_trait::async_trait;

use super::{AddOutcome, DownloadClient, RemoveOutcome};

/// Download client used when no `[transmission]` section is configured.
/// Every operation reports a structured failure, which callers already
/// treat as "nothing removed / nothing added".
#[derive(Debug, Default)]
pub struct DisabledDownloadClient;

#[async_trait]
impl DownloadClient for DisabledDownloadClient {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn exists(&self, _hash: &str) -> bool {
        false
    }

    async fn remove_torrent(&self, _hash: &str, _delete_data: bool) -> RemoveOutcome {
        RemoveOutcome::failure("Download client not configured")
    }

    async fn add_torrent(&self, _link: &str, _hash: Option<&str>) -> AddOutcome {
        AddOutcome::failure("Download client not configured")
    }
}
