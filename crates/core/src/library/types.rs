//! Types for library filesystem operations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result of a library deletion attempt.
///
/// `success = true, deleted = false` covers the benign cases (deletion
/// disabled, nothing on disk). `success = false` carries a `warning`
/// describing what went wrong; it is never raised as an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub success: bool,
    pub deleted: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl DeleteOutcome {
    pub fn skipped(message: impl Into<String>) -> Self {
        Self {
            success: true,
            deleted: false,
            message: message.into(),
            warning: None,
        }
    }

    pub fn deleted(message: impl Into<String>) -> Self {
        Self {
            success: true,
            deleted: true,
            message: message.into(),
            warning: None,
        }
    }

    pub fn failed(warning: impl Into<String>) -> Self {
        let warning = warning.into();
        Self {
            success: false,
            deleted: false,
            message: warning.clone(),
            warning: Some(warning),
        }
    }
}

/// Trait for media library backends.
#[async_trait]
pub trait Library: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Delete the file or directory that `parent_path`/`target_path`
    /// (as stored in the database) resolve to.
    async fn delete(&self, parent_path: &str, target_path: &str) -> DeleteOutcome;
}
