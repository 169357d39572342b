//! Record builders for tests.

use chrono::{DateTime, TimeZone, Utc};

use crate::store::{
    CmValue, Label, MediaRecord, MediaType, PipelineStatus, PredictionRecord, RejectionStatus,
    SchemaHistoryRecord, TrainingRecord,
};

/// Fixed timestamp so ordering in tests depends on the identifier tiebreak.
pub fn fixed_ts() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
}

/// An unlabeled training record in its post-ingestion state.
pub fn training_record(imdb_id: &str) -> TrainingRecord {
    TrainingRecord {
        imdb_id: imdb_id.to_string(),
        tmdb_id: Some(42),
        label: Label::WouldWatch,
        media_type: MediaType::Movie,
        media_title: Some("Movie X".to_string()),
        release_year: Some(2020),
        budget: Some(1_000_000),
        revenue: Some(5_000_000),
        runtime: Some(101),
        original_language: Some("en".to_string()),
        genre: Some(vec!["Drama".to_string()]),
        tmdb_rating: Some(7.2),
        tmdb_votes: Some(1000),
        rt_score: Some(85),
        metascore: Some(70),
        imdb_rating: Some(7.5),
        imdb_votes: Some(20000),
        human_labeled: false,
        anomalous: false,
        reviewed: false,
        created_at: fixed_ts(),
        updated_at: fixed_ts(),
    }
}

/// A downloaded media record with stored library paths and a source link
/// whose trailing segment is the torrent hash.
pub fn media_record(hash: &str, imdb_id: &str) -> MediaRecord {
    MediaRecord {
        hash: hash.to_string(),
        imdb_id: Some(imdb_id.to_string()),
        tmdb_id: Some(42),
        media_type: MediaType::Movie,
        media_title: Some("Movie X".to_string()),
        season: None,
        episode: None,
        release_year: Some(2020),
        pipeline_status: PipelineStatus::Downloaded,
        error_status: false,
        error_condition: None,
        rejection_status: RejectionStatus::Accepted,
        rejection_reason: None,
        parent_path: Some("/data/media/library/movies".to_string()),
        target_path: Some("movie-x".to_string()),
        original_title: Some("Movie.X.2020.1080p".to_string()),
        original_path: None,
        original_link: Some(
            "https://tracker.example/torrent/download/55AF51B9883B2E29E02FC728113747C706E480E3"
                .to_string(),
        ),
        rss_source: None,
        uploader: None,
        genre: Some(vec!["Drama".to_string()]),
        language: Some(vec!["en".to_string()]),
        rt_score: Some(85),
        metascore: Some(70),
        imdb_rating: Some(7.5),
        imdb_votes: Some(20000),
        resolution: Some("1080p".to_string()),
        video_codec: Some("x264".to_string()),
        audio_codec: Some("aac".to_string()),
        upload_type: None,
        created_at: fixed_ts(),
        updated_at: fixed_ts(),
        deleted_at: None,
    }
}

pub fn prediction_record(imdb_id: &str, prediction: i64) -> PredictionRecord {
    PredictionRecord {
        imdb_id: imdb_id.to_string(),
        prediction,
        probability: 0.85,
        cm_value: Some(CmValue::Tp),
        created_at: fixed_ts(),
    }
}

pub fn schema_history_record(rank: &str, version: &str) -> SchemaHistoryRecord {
    SchemaHistoryRecord {
        installed_rank: rank.to_string(),
        version: Some(version.to_string()),
        description: Some("migration".to_string()),
        migration_type: Some("SQL".to_string()),
        script: Some(format!("V{}__migration.sql", version)),
        installed_by: Some("flyway".to_string()),
        installed_on: Some("2024-01-15 12:00:00".to_string()),
        execution_time: Some(12),
        success: Some(true),
    }
}
