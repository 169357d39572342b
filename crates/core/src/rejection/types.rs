//! Types for the rejection workflows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of the reject workflow. `success` reflects the label write only;
/// the teardown fields report what happened to the item's external
/// footprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectOutcome {
    pub success: bool,
    pub message: String,
    pub file_deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_deletion_warning: Option<String>,
    pub torrent_removed: bool,
}

/// Result of the soft-delete workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftDeleteOutcome {
    pub success: bool,
    pub message: String,
    pub torrent_removed: bool,
    pub deleted_at: DateTime<Utc>,
}

/// Extract a torrent content hash from a source link.
///
/// Stored links carry the hash as their trailing path segment
/// (e.g. `https://tracker.example/torrent/download/<HASH>`); daemons
/// address torrents by the lowercase form.
pub fn torrent_hash_from_link(link: &str) -> Option<String> {
    let trimmed = link.trim_end_matches('/');
    let segment = trimmed.rsplit('/').next()?;
    let segment = segment.split(['?', '#']).next().unwrap_or(segment);
    if segment.is_empty() {
        return None;
    }
    Some(segment.to_lowercase())
}
