//! Types for the record store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Training label assigned to a media item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    WouldWatch,
    WouldNotWatch,
}

impl Label {
    /// Returns the string representation used in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::WouldWatch => "would_watch",
            Label::WouldNotWatch => "would_not_watch",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "would_watch" => Some(Label::WouldWatch),
            "would_not_watch" => Some(Label::WouldNotWatch),
            _ => None,
        }
    }
}

/// Kind of media item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "movie" => Some(MediaType::Movie),
            "tv" => Some(MediaType::Tv),
            _ => None,
        }
    }
}

/// Position of a media item in the acquisition pipeline.
///
/// The main progression is ingested → parsed → file_accepted →
/// metadata_collected → media_accepted → downloading → downloaded →
/// transferred → complete; `paused` and `rejected` are reachable side
/// states. The store records the value but does not enforce transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    Ingested,
    Paused,
    Parsed,
    Rejected,
    FileAccepted,
    MetadataCollected,
    MediaAccepted,
    Downloading,
    Downloaded,
    Transferred,
    Complete,
}

impl PipelineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStatus::Ingested => "ingested",
            PipelineStatus::Paused => "paused",
            PipelineStatus::Parsed => "parsed",
            PipelineStatus::Rejected => "rejected",
            PipelineStatus::FileAccepted => "file_accepted",
            PipelineStatus::MetadataCollected => "metadata_collected",
            PipelineStatus::MediaAccepted => "media_accepted",
            PipelineStatus::Downloading => "downloading",
            PipelineStatus::Downloaded => "downloaded",
            PipelineStatus::Transferred => "transferred",
            PipelineStatus::Complete => "complete",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ingested" => Some(PipelineStatus::Ingested),
            "paused" => Some(PipelineStatus::Paused),
            "parsed" => Some(PipelineStatus::Parsed),
            "rejected" => Some(PipelineStatus::Rejected),
            "file_accepted" => Some(PipelineStatus::FileAccepted),
            "metadata_collected" => Some(PipelineStatus::MetadataCollected),
            "media_accepted" => Some(PipelineStatus::MediaAccepted),
            "downloading" => Some(PipelineStatus::Downloading),
            "downloaded" => Some(PipelineStatus::Downloaded),
            "transferred" => Some(PipelineStatus::Transferred),
            "complete" => Some(PipelineStatus::Complete),
            _ => None,
        }
    }
}

/// Whether a media item was filtered in or out of consideration,
/// independent of pipeline progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionStatus {
    Unfiltered,
    Accepted,
    Rejected,
    Override,
}

impl RejectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionStatus::Unfiltered => "unfiltered",
            RejectionStatus::Accepted => "accepted",
            RejectionStatus::Rejected => "rejected",
            RejectionStatus::Override => "override",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unfiltered" => Some(RejectionStatus::Unfiltered),
            "accepted" => Some(RejectionStatus::Accepted),
            "rejected" => Some(RejectionStatus::Rejected),
            "override" => Some(RejectionStatus::Override),
            _ => None,
        }
    }
}

/// Confusion matrix cell for a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CmValue {
    Tn,
    Tp,
    Fn,
    Fp,
}

impl CmValue {
    pub fn as_str(&self) -> &'static str {
        match self {
            CmValue::Tn => "tn",
            CmValue::Tp => "tp",
            CmValue::Fn => "fn",
            CmValue::Fp => "fp",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "tn" => Some(CmValue::Tn),
            "tp" => Some(CmValue::Tp),
            "fn" => Some(CmValue::Fn),
            "fp" => Some(CmValue::Fp),
            _ => None,
        }
    }
}

/// A labeled training entry, keyed by IMDB id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingRecord {
    pub imdb_id: String,
    pub tmdb_id: Option<i64>,
    pub label: Label,
    pub media_type: MediaType,
    pub media_title: Option<String>,
    pub release_year: Option<i64>,
    pub budget: Option<i64>,
    pub revenue: Option<i64>,
    pub runtime: Option<i64>,
    pub original_language: Option<String>,
    pub genre: Option<Vec<String>>,
    pub tmdb_rating: Option<f64>,
    pub tmdb_votes: Option<i64>,
    pub rt_score: Option<i64>,
    pub metascore: Option<i64>,
    pub imdb_rating: Option<f64>,
    pub imdb_votes: Option<i64>,
    pub human_labeled: bool,
    pub anomalous: bool,
    pub reviewed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A media item in the acquisition pipeline, keyed by content hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRecord {
    pub hash: String,
    pub imdb_id: Option<String>,
    pub tmdb_id: Option<i64>,
    pub media_type: MediaType,
    pub media_title: Option<String>,
    pub season: Option<i64>,
    pub episode: Option<i64>,
    pub release_year: Option<i64>,
    pub pipeline_status: PipelineStatus,
    pub error_status: bool,
    pub error_condition: Option<String>,
    pub rejection_status: RejectionStatus,
    pub rejection_reason: Option<String>,
    pub parent_path: Option<String>,
    pub target_path: Option<String>,
    pub original_title: Option<String>,
    pub original_path: Option<String>,
    pub original_link: Option<String>,
    pub rss_source: Option<String>,
    pub uploader: Option<String>,
    pub genre: Option<Vec<String>>,
    pub language: Option<Vec<String>>,
    pub rt_score: Option<i64>,
    pub metascore: Option<i64>,
    pub imdb_rating: Option<f64>,
    pub imdb_votes: Option<i64>,
    pub resolution: Option<String>,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    pub upload_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A stored model prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub imdb_id: String,
    pub prediction: i64,
    pub probability: f64,
    pub cm_value: Option<CmValue>,
    pub created_at: DateTime<Utc>,
}

/// An applied schema migration, as recorded by the migration tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaHistoryRecord {
    pub installed_rank: String,
    pub version: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub migration_type: Option<String>,
    pub script: Option<String>,
    pub installed_by: Option<String>,
    pub installed_on: Option<String>,
    pub execution_time: Option<i64>,
    pub success: Option<bool>,
}

/// Combined training + prediction projection (read-only view).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieRecord {
    pub imdb_id: String,
    pub tmdb_id: Option<i64>,
    pub label: Label,
    pub media_type: MediaType,
    pub media_title: Option<String>,
    pub release_year: Option<i64>,
    pub budget: Option<i64>,
    pub revenue: Option<i64>,
    pub runtime: Option<i64>,
    pub original_language: Option<String>,
    pub genre: Option<Vec<String>>,
    pub tmdb_rating: Option<f64>,
    pub tmdb_votes: Option<i64>,
    pub rt_score: Option<i64>,
    pub metascore: Option<i64>,
    pub imdb_rating: Option<f64>,
    pub imdb_votes: Option<i64>,
    pub human_labeled: bool,
    pub anomalous: bool,
    pub reviewed: bool,
    pub prediction: Option<i64>,
    pub probability: Option<f64>,
    pub cm_value: Option<CmValue>,
    pub training_created_at: DateTime<Utc>,
    pub training_updated_at: DateTime<Utc>,
    pub prediction_created_at: Option<DateTime<Utc>>,
}

/// Pagination and sorting parameters shared by all listing operations.
#[derive(Debug, Clone)]
pub struct PageRequest {
    /// Maximum rows to return; clamped to 1..=1000 by the store.
    pub limit: u32,
    /// Rows to skip.
    pub offset: u32,
    /// Requested sort field; unknown values silently fall back to the
    /// entity's default field.
    pub sort_by: Option<String>,
    /// "asc" or "desc"; anything else silently falls back to the entity
    /// default.
    pub sort_order: Option<String>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: 100,
            offset: 0,
            sort_by: None,
            sort_order: None,
        }
    }
}

impl PageRequest {
    pub fn clamped_limit(&self) -> u32 {
        self.limit.clamp(1, 1000)
    }
}

/// Filters for listing training records.
#[derive(Debug, Clone, Default)]
pub struct TrainingFilter {
    pub media_type: Option<MediaType>,
    pub label: Option<Label>,
    pub reviewed: Option<bool>,
    pub human_labeled: Option<bool>,
    pub anomalous: Option<bool>,
    /// Empty means no imdb_id filter.
    pub imdb_ids: Vec<String>,
    /// Case-insensitive substring match.
    pub media_title: Option<String>,
    pub page: PageRequest,
}

/// Filters for listing media records. Soft-deleted rows are always excluded.
#[derive(Debug, Clone, Default)]
pub struct MediaFilter {
    pub media_type: Option<MediaType>,
    pub pipeline_status: Option<PipelineStatus>,
    pub rejection_status: Option<RejectionStatus>,
    pub error_status: Option<bool>,
    pub imdb_id: Option<String>,
    /// Case-insensitive substring match.
    pub media_title: Option<String>,
    pub hash: Option<String>,
    pub page: PageRequest,
}

/// Filters for listing prediction records.
#[derive(Debug, Clone, Default)]
pub struct PredictionFilter {
    pub imdb_id: Option<String>,
    pub prediction: Option<i64>,
    pub cm_value: Option<CmValue>,
    pub page: PageRequest,
}

/// Filters for listing the combined movie view.
#[derive(Debug, Clone, Default)]
pub struct MovieFilter {
    pub media_type: Option<MediaType>,
    pub label: Option<Label>,
    pub reviewed: Option<bool>,
    pub human_labeled: Option<bool>,
    pub anomalous: Option<bool>,
    pub prediction: Option<i64>,
    pub cm_value: Option<CmValue>,
    pub imdb_ids: Vec<String>,
    pub media_title: Option<String>,
    pub release_year: Option<i64>,
    pub page: PageRequest,
}

/// A patch for a training record. Only set fields are written; setting
/// `label` additionally forces `human_labeled` and `reviewed` to true.
#[derive(Debug, Clone, Default)]
pub struct TrainingPatch {
    pub label: Option<Label>,
    pub human_labeled: Option<bool>,
    pub anomalous: Option<bool>,
    pub reviewed: Option<bool>,
}

impl TrainingPatch {
    pub fn is_empty(&self) -> bool {
        self.label.is_none()
            && self.human_labeled.is_none()
            && self.anomalous.is_none()
            && self.reviewed.is_none()
    }
}

/// A patch for a media record's pipeline fields.
#[derive(Debug, Clone, Default)]
pub struct MediaPipelinePatch {
    pub pipeline_status: Option<PipelineStatus>,
    pub error_status: Option<bool>,
    pub rejection_status: Option<RejectionStatus>,
    /// When true, `error_condition` is set to NULL.
    pub clear_error_condition: bool,
}

impl MediaPipelinePatch {
    pub fn is_empty(&self) -> bool {
        self.pipeline_status.is_none()
            && self.error_status.is_none()
            && self.rejection_status.is_none()
            && !self.clear_error_condition
    }
}

/// Result of a successful field update.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateOutcome {
    pub message: String,
    pub updated_fields: Vec<String>,
}

/// Path data for a media item, used by the rejection workflow.
#[derive(Debug, Clone)]
pub struct MediaPaths {
    pub hash: String,
    pub parent_path: Option<String>,
    pub target_path: Option<String>,
    pub original_link: Option<String>,
}

/// One page of listing results.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

/// Pagination info for a listing result.
#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    /// Count of all rows matching the filter, ignoring limit/offset.
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
    pub has_more: bool,
}

/// Errors for record store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already deleted: {0}")]
    AlreadyDeleted(String),

    #[error("No fields to update")]
    NoFieldsToUpdate,
}

/// Read and narrow-write access to the pipeline's persisted entities.
pub trait RecordStore: Send + Sync {
    fn list_training(&self, filter: &TrainingFilter) -> Result<Page<TrainingRecord>, StoreError>;

    /// Update the given fields of a training record. The row must exist and
    /// the patch must be non-empty; including `label` forces
    /// `human_labeled = true, reviewed = true` in the same update.
    fn update_training(
        &self,
        imdb_id: &str,
        patch: &TrainingPatch,
    ) -> Result<UpdateOutcome, StoreError>;

    fn list_media(&self, filter: &MediaFilter) -> Result<Page<MediaRecord>, StoreError>;

    /// Fetch a live (not soft-deleted) media record by hash.
    fn get_media_by_hash(&self, hash: &str) -> Result<Option<MediaRecord>, StoreError>;

    /// Resolve the stored paths and source link for the media row
    /// cross-referenced by a training identifier.
    fn media_paths_for_imdb(&self, imdb_id: &str) -> Result<Option<MediaPaths>, StoreError>;

    fn update_media_pipeline(
        &self,
        hash: &str,
        patch: &MediaPipelinePatch,
    ) -> Result<UpdateOutcome, StoreError>;

    /// Mark a media record deleted. Fails with `AlreadyDeleted` if the row
    /// is already soft-deleted, `NotFound` if it never existed.
    fn soft_delete_media(&self, hash: &str) -> Result<DateTime<Utc>, StoreError>;

    fn list_predictions(
        &self,
        filter: &PredictionFilter,
    ) -> Result<Page<PredictionRecord>, StoreError>;

    fn list_movies(&self, filter: &MovieFilter) -> Result<Page<MovieRecord>, StoreError>;

    /// List applied schema migrations. `sort_by` is resolved against
    /// installed_rank (numeric cast), installed_on, and version; default
    /// order is ascending by rank.
    fn list_schema_history(
        &self,
        sort_by: Option<&str>,
        sort_order: Option<&str>,
    ) -> Result<Vec<SchemaHistoryRecord>, StoreError>;
}
