pub mod config;
pub mod downloader;
pub mod library;
pub mod metrics;
pub mod rejection;
pub mod store;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    LibraryConfig, SanitizedConfig, ServerConfig, TransmissionConfig,
};
pub use downloader::{
    AddOutcome, DisabledDownloadClient, DownloadClient, DownloadClientError, RemoveOutcome,
    TransmissionClient,
};
pub use library::{DeleteOutcome, FsLibrary, Library};
pub use rejection::{
    torrent_hash_from_link, RejectOutcome, RejectionOrchestrator, SoftDeleteOutcome,
};
pub use store::{
    CmValue, Label, MediaFilter, MediaPaths, MediaPipelinePatch, MediaRecord, MediaType,
    MovieFilter, MovieRecord, Page, PageRequest, Pagination, PipelineStatus, PredictionFilter,
    PredictionRecord, RecordStore, RejectionStatus, SchemaHistoryRecord, SqliteRecordStore,
    StoreError, TrainingFilter, TrainingPatch, TrainingRecord, UpdateOutcome,
};
