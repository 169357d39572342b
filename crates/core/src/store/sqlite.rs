//! SQLite-backed record store implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{
    CmValue, Label, MediaFilter, MediaPaths, MediaPipelinePatch, MediaRecord, MediaType,
    MovieFilter, MovieRecord, Page, Pagination, PipelineStatus, PredictionFilter,
    PredictionRecord, RecordStore, RejectionStatus, SchemaHistoryRecord, StoreError,
    TrainingFilter, TrainingPatch, TrainingRecord, UpdateOutcome,
};

const TRAINING_COLUMNS: &str = "imdb_id, tmdb_id, label, media_type, media_title, release_year, \
     budget, revenue, runtime, original_language, genre, tmdb_rating, tmdb_votes, rt_score, \
     metascore, imdb_rating, imdb_votes, human_labeled, anomalous, reviewed, created_at, updated_at";

const MEDIA_COLUMNS: &str = "hash, imdb_id, tmdb_id, media_type, media_title, season, episode, \
     release_year, pipeline_status, error_status, error_condition, rejection_status, \
     rejection_reason, parent_path, target_path, original_title, original_path, original_link, \
     rss_source, uploader, genre, language, rt_score, metascore, imdb_rating, imdb_votes, \
     resolution, video_codec, audio_codec, upload_type, created_at, updated_at, deleted_at";

const MOVIE_COLUMNS: &str = "imdb_id, tmdb_id, label, media_type, media_title, release_year, \
     budget, revenue, runtime, original_language, genre, tmdb_rating, tmdb_votes, rt_score, \
     metascore, imdb_rating, imdb_votes, human_labeled, anomalous, reviewed, prediction, \
     probability, cm_value, training_created_at, training_updated_at, prediction_created_at";

const SCHEMA_HISTORY_COLUMNS: &str = "installed_rank, version, description, type, script, \
     installed_by, installed_on, execution_time, success";

/// SQLite-backed record store.
pub struct SqliteRecordStore {
    conn: Mutex<Connection>,
}

fn db_err(e: rusqlite::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

fn parse_ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn parse_json_list(s: Option<String>) -> Option<Vec<String>> {
    s.and_then(|json| serde_json::from_str(&json).ok())
}

fn to_json_list(list: &Option<Vec<String>>) -> Option<String> {
    list.as_ref().and_then(|l| serde_json::to_string(l).ok())
}

/// Resolve the requested sort order, falling back silently.
fn sort_order_sql(requested: Option<&str>, default: &'static str) -> &'static str {
    match requested.map(|s| s.to_ascii_lowercase()).as_deref() {
        Some("asc") => "ASC",
        Some("desc") => "DESC",
        _ => default,
    }
}

/// Resolve a training sort field against the allow-list; unknown values
/// fall back to created_at. The resolved name is the only piece of request
/// data that is ever interpolated into query text.
fn training_sort_column(requested: Option<&str>) -> &'static str {
    match requested {
        Some("created_at") => "created_at",
        Some("updated_at") => "updated_at",
        Some("media_title") => "media_title",
        Some("release_year") => "release_year",
        Some("media_type") => "media_type",
        Some("label") => "label",
        Some("imdb_id") => "imdb_id",
        Some("tmdb_id") => "tmdb_id",
        Some("budget") => "budget",
        Some("revenue") => "revenue",
        Some("runtime") => "runtime",
        Some("original_language") => "original_language",
        Some("tmdb_rating") => "tmdb_rating",
        Some("tmdb_votes") => "tmdb_votes",
        Some("rt_score") => "rt_score",
        Some("metascore") => "metascore",
        Some("imdb_rating") => "imdb_rating",
        Some("imdb_votes") => "imdb_votes",
        Some("human_labeled") => "human_labeled",
        Some("anomalous") => "anomalous",
        Some("reviewed") => "reviewed",
        _ => "created_at",
    }
}

fn media_sort_column(requested: Option<&str>) -> &'static str {
    match requested {
        Some("created_at") => "created_at",
        Some("updated_at") => "updated_at",
        Some("release_year") => "release_year",
        Some("media_title") => "media_title",
        Some("pipeline_status") => "pipeline_status",
        Some("rejection_status") => "rejection_status",
        Some("imdb_rating") => "imdb_rating",
        _ => "created_at",
    }
}

fn prediction_sort_column(requested: Option<&str>) -> &'static str {
    match requested {
        Some("imdb_id") => "imdb_id",
        Some("prediction") => "prediction",
        Some("probability") => "probability",
        Some("cm_value") => "cm_value",
        Some("created_at") => "created_at",
        _ => "created_at",
    }
}

fn movie_sort_column(requested: Option<&str>) -> &'static str {
    match requested {
        Some("imdb_id") => "imdb_id",
        Some("tmdb_id") => "tmdb_id",
        Some("label") => "label",
        Some("media_type") => "media_type",
        Some("media_title") => "media_title",
        Some("release_year") => "release_year",
        Some("budget") => "budget",
        Some("revenue") => "revenue",
        Some("runtime") => "runtime",
        Some("original_language") => "original_language",
        Some("tmdb_rating") => "tmdb_rating",
        Some("tmdb_votes") => "tmdb_votes",
        Some("rt_score") => "rt_score",
        Some("metascore") => "metascore",
        Some("imdb_rating") => "imdb_rating",
        Some("imdb_votes") => "imdb_votes",
        Some("human_labeled") => "human_labeled",
        Some("anomalous") => "anomalous",
        Some("reviewed") => "reviewed",
        Some("prediction") => "prediction",
        Some("probability") => "probability",
        Some("cm_value") => "cm_value",
        Some("training_created_at") => "training_created_at",
        Some("training_updated_at") => "training_updated_at",
        Some("prediction_created_at") => "prediction_created_at",
        _ => "training_created_at",
    }
}

/// installed_rank is stored as text and needs a numeric cast for ordering.
fn schema_history_sort_column(requested: Option<&str>) -> &'static str {
    match requested {
        Some("installed_rank") => "CAST(installed_rank AS INTEGER)",
        Some("installed_on") => "installed_on",
        Some("version") => "version",
        _ => "CAST(installed_rank AS INTEGER)",
    }
}

impl SqliteRecordStore {
    /// Open (or create) the store at the given path.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(db_err)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS training (
                imdb_id TEXT PRIMARY KEY,
                tmdb_id INTEGER,
                label TEXT NOT NULL,
                media_type TEXT NOT NULL,
                media_title TEXT,
                release_year INTEGER,
                budget INTEGER,
                revenue INTEGER,
                runtime INTEGER,
                original_language TEXT,
                genre TEXT,
                tmdb_rating REAL,
                tmdb_votes INTEGER,
                rt_score INTEGER,
                metascore INTEGER,
                imdb_rating REAL,
                imdb_votes INTEGER,
                human_labeled INTEGER NOT NULL DEFAULT 0,
                anomalous INTEGER NOT NULL DEFAULT 0,
                reviewed INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_training_label ON training(label);
            CREATE INDEX IF NOT EXISTS idx_training_created_at ON training(created_at);

            CREATE TABLE IF NOT EXISTS media (
                hash TEXT PRIMARY KEY,
                imdb_id TEXT,
                tmdb_id INTEGER,
                media_type TEXT NOT NULL,
                media_title TEXT,
                season INTEGER,
                episode INTEGER,
                release_year INTEGER,
                pipeline_status TEXT NOT NULL DEFAULT 'ingested',
                error_status INTEGER NOT NULL DEFAULT 0,
                error_condition TEXT,
                rejection_status TEXT NOT NULL DEFAULT 'unfiltered',
                rejection_reason TEXT,
                parent_path TEXT,
                target_path TEXT,
                original_title TEXT,
                original_path TEXT,
                original_link TEXT,
                rss_source TEXT,
                uploader TEXT,
                genre TEXT,
                language TEXT,
                rt_score INTEGER,
                metascore INTEGER,
                imdb_rating REAL,
                imdb_votes INTEGER,
                resolution TEXT,
                video_codec TEXT,
                audio_codec TEXT,
                upload_type TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                deleted_at TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_media_imdb_id ON media(imdb_id);
            CREATE INDEX IF NOT EXISTS idx_media_pipeline_status ON media(pipeline_status);
            CREATE INDEX IF NOT EXISTS idx_media_created_at ON media(created_at);

            CREATE TABLE IF NOT EXISTS prediction (
                imdb_id TEXT NOT NULL,
                prediction INTEGER NOT NULL,
                probability REAL NOT NULL,
                cm_value TEXT,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_prediction_imdb_id ON prediction(imdb_id);

            CREATE TABLE IF NOT EXISTS flyway_schema_history (
                installed_rank TEXT PRIMARY KEY,
                version TEXT,
                description TEXT,
                type TEXT,
                script TEXT,
                installed_by TEXT,
                installed_on TEXT,
                execution_time INTEGER,
                success INTEGER
            );

            CREATE VIEW IF NOT EXISTS movies AS
                SELECT t.imdb_id, t.tmdb_id, t.label, t.media_type, t.media_title,
                       t.release_year, t.budget, t.revenue, t.runtime, t.original_language,
                       t.genre, t.tmdb_rating, t.tmdb_votes, t.rt_score, t.metascore,
                       t.imdb_rating, t.imdb_votes, t.human_labeled, t.anomalous, t.reviewed,
                       p.prediction, p.probability, p.cm_value,
                       t.created_at AS training_created_at,
                       t.updated_at AS training_updated_at,
                       p.created_at AS prediction_created_at
                FROM training t
                LEFT JOIN prediction p ON p.imdb_id = t.imdb_id;
            "#,
        )
        .map_err(db_err)?;

        Ok(())
    }

    fn row_to_training(row: &rusqlite::Row) -> rusqlite::Result<TrainingRecord> {
        let label: String = row.get(2)?;
        let media_type: String = row.get(3)?;
        let genre: Option<String> = row.get(10)?;
        let created_at: String = row.get(20)?;
        let updated_at: String = row.get(21)?;

        Ok(TrainingRecord {
            imdb_id: row.get(0)?,
            tmdb_id: row.get(1)?,
            label: Label::parse(&label).unwrap_or(Label::WouldWatch),
            media_type: MediaType::parse(&media_type).unwrap_or(MediaType::Movie),
            media_title: row.get(4)?,
            release_year: row.get(5)?,
            budget: row.get(6)?,
            revenue: row.get(7)?,
            runtime: row.get(8)?,
            original_language: row.get(9)?,
            genre: parse_json_list(genre),
            tmdb_rating: row.get(11)?,
            tmdb_votes: row.get(12)?,
            rt_score: row.get(13)?,
            metascore: row.get(14)?,
            imdb_rating: row.get(15)?,
            imdb_votes: row.get(16)?,
            human_labeled: row.get(17)?,
            anomalous: row.get(18)?,
            reviewed: row.get(19)?,
            created_at: parse_ts(&created_at),
            updated_at: parse_ts(&updated_at),
        })
    }

    fn row_to_media(row: &rusqlite::Row) -> rusqlite::Result<MediaRecord> {
        let media_type: String = row.get(3)?;
        let pipeline_status: String = row.get(8)?;
        let rejection_status: String = row.get(11)?;
        let genre: Option<String> = row.get(20)?;
        let language: Option<String> = row.get(21)?;
        let created_at: String = row.get(30)?;
        let updated_at: String = row.get(31)?;
        let deleted_at: Option<String> = row.get(32)?;

        Ok(MediaRecord {
            hash: row.get(0)?,
            imdb_id: row.get(1)?,
            tmdb_id: row.get(2)?,
            media_type: MediaType::parse(&media_type).unwrap_or(MediaType::Movie),
            media_title: row.get(4)?,
            season: row.get(5)?,
            episode: row.get(6)?,
            release_year: row.get(7)?,
            pipeline_status: PipelineStatus::parse(&pipeline_status)
                .unwrap_or(PipelineStatus::Ingested),
            error_status: row.get(9)?,
            error_condition: row.get(10)?,
            rejection_status: RejectionStatus::parse(&rejection_status)
                .unwrap_or(RejectionStatus::Unfiltered),
            rejection_reason: row.get(12)?,
            parent_path: row.get(13)?,
            target_path: row.get(14)?,
            original_title: row.get(15)?,
            original_path: row.get(16)?,
            original_link: row.get(17)?,
            rss_source: row.get(18)?,
            uploader: row.get(19)?,
            genre: parse_json_list(genre),
            language: parse_json_list(language),
            rt_score: row.get(22)?,
            metascore: row.get(23)?,
            imdb_rating: row.get(24)?,
            imdb_votes: row.get(25)?,
            resolution: row.get(26)?,
            video_codec: row.get(27)?,
            audio_codec: row.get(28)?,
            upload_type: row.get(29)?,
            created_at: parse_ts(&created_at),
            updated_at: parse_ts(&updated_at),
            deleted_at: deleted_at.map(|s| parse_ts(&s)),
        })
    }

    fn row_to_prediction(row: &rusqlite::Row) -> rusqlite::Result<PredictionRecord> {
        let cm_value: Option<String> = row.get(3)?;
        let created_at: String = row.get(4)?;

        Ok(PredictionRecord {
            imdb_id: row.get(0)?,
            prediction: row.get(1)?,
            probability: row.get(2)?,
            cm_value: cm_value.as_deref().and_then(CmValue::parse),
            created_at: parse_ts(&created_at),
        })
    }

    fn row_to_movie(row: &rusqlite::Row) -> rusqlite::Result<MovieRecord> {
        let label: String = row.get(2)?;
        let media_type: String = row.get(3)?;
        let genre: Option<String> = row.get(10)?;
        let cm_value: Option<String> = row.get(22)?;
        let training_created_at: String = row.get(23)?;
        let training_updated_at: String = row.get(24)?;
        let prediction_created_at: Option<String> = row.get(25)?;

        Ok(MovieRecord {
            imdb_id: row.get(0)?,
            tmdb_id: row.get(1)?,
            label: Label::parse(&label).unwrap_or(Label::WouldWatch),
            media_type: MediaType::parse(&media_type).unwrap_or(MediaType::Movie),
            media_title: row.get(4)?,
            release_year: row.get(5)?,
            budget: row.get(6)?,
            revenue: row.get(7)?,
            runtime: row.get(8)?,
            original_language: row.get(9)?,
            genre: parse_json_list(genre),
            tmdb_rating: row.get(11)?,
            tmdb_votes: row.get(12)?,
            rt_score: row.get(13)?,
            metascore: row.get(14)?,
            imdb_rating: row.get(15)?,
            imdb_votes: row.get(16)?,
            human_labeled: row.get(17)?,
            anomalous: row.get(18)?,
            reviewed: row.get(19)?,
            prediction: row.get(20)?,
            probability: row.get(21)?,
            cm_value: cm_value.as_deref().and_then(CmValue::parse),
            training_created_at: parse_ts(&training_created_at),
            training_updated_at: parse_ts(&training_updated_at),
            prediction_created_at: prediction_created_at.map(|s| parse_ts(&s)),
        })
    }

    fn row_to_schema_history(row: &rusqlite::Row) -> rusqlite::Result<SchemaHistoryRecord> {
        Ok(SchemaHistoryRecord {
            installed_rank: row.get(0)?,
            version: row.get(1)?,
            description: row.get(2)?,
            migration_type: row.get(3)?,
            script: row.get(4)?,
            installed_by: row.get(5)?,
            installed_on: row.get(6)?,
            execution_time: row.get(7)?,
            success: row.get(8)?,
        })
    }

    /// Run the count + page queries for a listing operation.
    fn query_page<T>(
        conn: &Connection,
        table: &str,
        columns: &str,
        where_clause: &str,
        params: &[&dyn rusqlite::ToSql],
        order_by: &str,
        limit: u32,
        offset: u32,
        mapper: fn(&rusqlite::Row) -> rusqlite::Result<T>,
    ) -> Result<Page<T>, StoreError> {
        let count_sql = format!("SELECT COUNT(*) FROM {} {}", table, where_clause);
        let total: i64 = conn
            .query_row(&count_sql, params, |row| row.get(0))
            .map_err(db_err)?;
        let total = total.max(0) as u64;

        let sql = format!(
            "SELECT {} FROM {} {} ORDER BY {} LIMIT ? OFFSET ?",
            columns, table, where_clause, order_by
        );
        let mut stmt = conn.prepare(&sql).map_err(db_err)?;

        let limit_param = limit as i64;
        let offset_param = offset as i64;
        let mut all_params: Vec<&dyn rusqlite::ToSql> = params.to_vec();
        all_params.push(&limit_param);
        all_params.push(&offset_param);

        let rows = stmt
            .query_map(all_params.as_slice(), mapper)
            .map_err(db_err)?;

        let mut data = Vec::new();
        for row in rows {
            data.push(row.map_err(db_err)?);
        }

        let has_more = offset as u64 + (data.len() as u64) < total;
        Ok(Page {
            data,
            pagination: Pagination {
                total,
                limit,
                offset,
                has_more,
            },
        })
    }

    fn in_placeholders(count: usize) -> String {
        vec!["?"; count].join(", ")
    }

    // ------------------------------------------------------------------
    // Ingestion-side writes. The HTTP surface never creates rows; these
    // exist for the ingestion process and for test fixtures.
    // ------------------------------------------------------------------

    pub fn insert_training(&self, record: &TrainingRecord) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO training ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                TRAINING_COLUMNS
            ),
            params![
                record.imdb_id,
                record.tmdb_id,
                record.label.as_str(),
                record.media_type.as_str(),
                record.media_title,
                record.release_year,
                record.budget,
                record.revenue,
                record.runtime,
                record.original_language,
                to_json_list(&record.genre),
                record.tmdb_rating,
                record.tmdb_votes,
                record.rt_score,
                record.metascore,
                record.imdb_rating,
                record.imdb_votes,
                record.human_labeled,
                record.anomalous,
                record.reviewed,
                record.created_at.to_rfc3339(),
                record.updated_at.to_rfc3339(),
            ],
        )
        .map_err(db_err)?;
        Ok(())
    }

    pub fn insert_media(&self, record: &MediaRecord) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO media ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                MEDIA_COLUMNS
            ),
            params![
                record.hash,
                record.imdb_id,
                record.tmdb_id,
                record.media_type.as_str(),
                record.media_title,
                record.season,
                record.episode,
                record.release_year,
                record.pipeline_status.as_str(),
                record.error_status,
                record.error_condition,
                record.rejection_status.as_str(),
                record.rejection_reason,
                record.parent_path,
                record.target_path,
                record.original_title,
                record.original_path,
                record.original_link,
                record.rss_source,
                record.uploader,
                to_json_list(&record.genre),
                to_json_list(&record.language),
                record.rt_score,
                record.metascore,
                record.imdb_rating,
                record.imdb_votes,
                record.resolution,
                record.video_codec,
                record.audio_codec,
                record.upload_type,
                record.created_at.to_rfc3339(),
                record.updated_at.to_rfc3339(),
                record.deleted_at.map(|ts| ts.to_rfc3339()),
            ],
        )
        .map_err(db_err)?;
        Ok(())
    }

    pub fn insert_prediction(&self, record: &PredictionRecord) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO prediction (imdb_id, prediction, probability, cm_value, created_at) \
             VALUES (?, ?, ?, ?, ?)",
            params![
                record.imdb_id,
                record.prediction,
                record.probability,
                record.cm_value.map(|v| v.as_str()),
                record.created_at.to_rfc3339(),
            ],
        )
        .map_err(db_err)?;
        Ok(())
    }

    pub fn insert_schema_history(&self, record: &SchemaHistoryRecord) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO flyway_schema_history ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                SCHEMA_HISTORY_COLUMNS
            ),
            params![
                record.installed_rank,
                record.version,
                record.description,
                record.migration_type,
                record.script,
                record.installed_by,
                record.installed_on,
                record.execution_time,
                record.success,
            ],
        )
        .map_err(db_err)?;
        Ok(())
    }
}

impl RecordStore for SqliteRecordStore {
    fn list_training(&self, filter: &TrainingFilter) -> Result<Page<TrainingRecord>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let mut conditions: Vec<String> = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(media_type) = filter.media_type {
            conditions.push("media_type = ?".to_string());
            params.push(Box::new(media_type.as_str()));
        }
        if let Some(label) = filter.label {
            conditions.push("label = ?".to_string());
            params.push(Box::new(label.as_str()));
        }
        if let Some(reviewed) = filter.reviewed {
            conditions.push("reviewed = ?".to_string());
            params.push(Box::new(reviewed));
        }
        if let Some(human_labeled) = filter.human_labeled {
            conditions.push("human_labeled = ?".to_string());
            params.push(Box::new(human_labeled));
        }
        if let Some(anomalous) = filter.anomalous {
            conditions.push("anomalous = ?".to_string());
            params.push(Box::new(anomalous));
        }
        if !filter.imdb_ids.is_empty() {
            conditions.push(format!(
                "imdb_id IN ({})",
                Self::in_placeholders(filter.imdb_ids.len())
            ));
            for id in &filter.imdb_ids {
                params.push(Box::new(id.clone()));
            }
        }
        if let Some(ref title) = filter.media_title {
            conditions.push("LOWER(media_title) LIKE ?".to_string());
            params.push(Box::new(format!("%{}%", title.to_lowercase())));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let order_by = format!(
            "{} {}, imdb_id ASC",
            training_sort_column(filter.page.sort_by.as_deref()),
            sort_order_sql(filter.page.sort_order.as_deref(), "DESC")
        );

        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        Self::query_page(
            &conn,
            "training",
            TRAINING_COLUMNS,
            &where_clause,
            &param_refs,
            &order_by,
            filter.page.clamped_limit(),
            filter.page.offset,
            Self::row_to_training,
        )
    }

    fn update_training(
        &self,
        imdb_id: &str,
        patch: &TrainingPatch,
    ) -> Result<UpdateOutcome, StoreError> {
        let conn = self.conn.lock().unwrap();

        let exists: bool = conn
            .query_row(
                "SELECT 1 FROM training WHERE imdb_id = ?",
                params![imdb_id],
                |_| Ok(true),
            )
            .unwrap_or(false);
        if !exists {
            return Err(StoreError::NotFound(format!(
                "No training record found with IMDB ID: {}",
                imdb_id
            )));
        }

        if patch.is_empty() {
            return Err(StoreError::NoFieldsToUpdate);
        }

        let mut sets: Vec<String> = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        let mut updated_fields: Vec<String> = Vec::new();

        if let Some(label) = patch.label {
            sets.push("label = ?".to_string());
            values.push(Box::new(label.as_str()));
            updated_fields.push("label".to_string());
            // Assigning a label is a human decision; the flags follow it
            // regardless of what the patch says.
            sets.push("human_labeled = 1".to_string());
            sets.push("reviewed = 1".to_string());
            updated_fields.push("human_labeled".to_string());
            updated_fields.push("reviewed".to_string());
        } else {
            if let Some(human_labeled) = patch.human_labeled {
                sets.push("human_labeled = ?".to_string());
                values.push(Box::new(human_labeled));
                updated_fields.push("human_labeled".to_string());
            }
            if let Some(reviewed) = patch.reviewed {
                sets.push("reviewed = ?".to_string());
                values.push(Box::new(reviewed));
                updated_fields.push("reviewed".to_string());
            }
        }
        if let Some(anomalous) = patch.anomalous {
            sets.push("anomalous = ?".to_string());
            values.push(Box::new(anomalous));
            updated_fields.push("anomalous".to_string());
        }

        sets.push("updated_at = ?".to_string());
        values.push(Box::new(Utc::now().to_rfc3339()));
        values.push(Box::new(imdb_id.to_string()));

        let sql = format!(
            "UPDATE training SET {} WHERE imdb_id = ?",
            sets.join(", ")
        );
        let param_refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, param_refs.as_slice()).map_err(db_err)?;

        Ok(UpdateOutcome {
            message: "Training record updated successfully".to_string(),
            updated_fields,
        })
    }

    fn list_media(&self, filter: &MediaFilter) -> Result<Page<MediaRecord>, StoreError> {
        let conn = self.conn.lock().unwrap();

        // Soft-deleted rows are invisible to every read.
        let mut conditions: Vec<String> = vec!["deleted_at IS NULL".to_string()];
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(media_type) = filter.media_type {
            conditions.push("media_type = ?".to_string());
            params.push(Box::new(media_type.as_str()));
        }
        if let Some(pipeline_status) = filter.pipeline_status {
            conditions.push("pipeline_status = ?".to_string());
            params.push(Box::new(pipeline_status.as_str()));
        }
        if let Some(rejection_status) = filter.rejection_status {
            conditions.push("rejection_status = ?".to_string());
            params.push(Box::new(rejection_status.as_str()));
        }
        if let Some(error_status) = filter.error_status {
            conditions.push("error_status = ?".to_string());
            params.push(Box::new(error_status));
        }
        if let Some(ref imdb_id) = filter.imdb_id {
            conditions.push("imdb_id = ?".to_string());
            params.push(Box::new(imdb_id.clone()));
        }
        if let Some(ref title) = filter.media_title {
            conditions.push("LOWER(media_title) LIKE ?".to_string());
            params.push(Box::new(format!("%{}%", title.to_lowercase())));
        }
        if let Some(ref hash) = filter.hash {
            conditions.push("hash = ?".to_string());
            params.push(Box::new(hash.clone()));
        }

        let where_clause = format!("WHERE {}", conditions.join(" AND "));
        let order_by = format!(
            "{} {}, hash ASC",
            media_sort_column(filter.page.sort_by.as_deref()),
            sort_order_sql(filter.page.sort_order.as_deref(), "DESC")
        );

        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        Self::query_page(
            &conn,
            "media",
            MEDIA_COLUMNS,
            &where_clause,
            &param_refs,
            &order_by,
            filter.page.clamped_limit(),
            filter.page.offset,
            Self::row_to_media,
        )
    }

    fn get_media_by_hash(&self, hash: &str) -> Result<Option<MediaRecord>, StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            &format!(
                "SELECT {} FROM media WHERE hash = ? AND deleted_at IS NULL",
                MEDIA_COLUMNS
            ),
            params![hash],
            Self::row_to_media,
        )
        .optional()
        .map_err(db_err)
    }

    fn media_paths_for_imdb(&self, imdb_id: &str) -> Result<Option<MediaPaths>, StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT hash, parent_path, target_path, original_link FROM media \
             WHERE imdb_id = ? AND deleted_at IS NULL \
             ORDER BY created_at DESC, hash ASC LIMIT 1",
            params![imdb_id],
            |row| {
                Ok(MediaPaths {
                    hash: row.get(0)?,
                    parent_path: row.get(1)?,
                    target_path: row.get(2)?,
                    original_link: row.get(3)?,
                })
            },
        )
        .optional()
        .map_err(db_err)
    }

    fn update_media_pipeline(
        &self,
        hash: &str,
        patch: &MediaPipelinePatch,
    ) -> Result<UpdateOutcome, StoreError> {
        let conn = self.conn.lock().unwrap();

        let exists: bool = conn
            .query_row(
                "SELECT 1 FROM media WHERE hash = ? AND deleted_at IS NULL",
                params![hash],
                |_| Ok(true),
            )
            .unwrap_or(false);
        if !exists {
            return Err(StoreError::NotFound(format!(
                "No media record found with hash: {}",
                hash
            )));
        }

        if patch.is_empty() {
            return Err(StoreError::NoFieldsToUpdate);
        }

        let mut sets: Vec<String> = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        let mut updated_fields: Vec<String> = Vec::new();

        if let Some(pipeline_status) = patch.pipeline_status {
            sets.push("pipeline_status = ?".to_string());
            values.push(Box::new(pipeline_status.as_str()));
            updated_fields.push("pipeline_status".to_string());
        }
        if let Some(error_status) = patch.error_status {
            sets.push("error_status = ?".to_string());
            values.push(Box::new(error_status));
            updated_fields.push("error_status".to_string());
        }
        if let Some(rejection_status) = patch.rejection_status {
            sets.push("rejection_status = ?".to_string());
            values.push(Box::new(rejection_status.as_str()));
            updated_fields.push("rejection_status".to_string());
        }
        if patch.clear_error_condition {
            sets.push("error_condition = NULL".to_string());
            updated_fields.push("error_condition".to_string());
        }

        sets.push("updated_at = ?".to_string());
        values.push(Box::new(Utc::now().to_rfc3339()));
        values.push(Box::new(hash.to_string()));

        let sql = format!("UPDATE media SET {} WHERE hash = ?", sets.join(", "));
        let param_refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, param_refs.as_slice()).map_err(db_err)?;

        Ok(UpdateOutcome {
            message: "Media record updated successfully".to_string(),
            updated_fields,
        })
    }

    fn soft_delete_media(&self, hash: &str) -> Result<DateTime<Utc>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let deleted_at: Option<Option<String>> = conn
            .query_row(
                "SELECT deleted_at FROM media WHERE hash = ?",
                params![hash],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_err)?;

        match deleted_at {
            None => Err(StoreError::NotFound(format!(
                "No media record found with hash: {}",
                hash
            ))),
            Some(Some(_)) => Err(StoreError::AlreadyDeleted(format!(
                "Media record already deleted: {}",
                hash
            ))),
            Some(None) => {
                let now = Utc::now();
                conn.execute(
                    "UPDATE media SET deleted_at = ?, updated_at = ? WHERE hash = ?",
                    params![now.to_rfc3339(), now.to_rfc3339(), hash],
                )
                .map_err(db_err)?;
                Ok(now)
            }
        }
    }

    fn list_predictions(
        &self,
        filter: &PredictionFilter,
    ) -> Result<Page<PredictionRecord>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let mut conditions: Vec<String> = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref imdb_id) = filter.imdb_id {
            conditions.push("imdb_id = ?".to_string());
            params.push(Box::new(imdb_id.clone()));
        }
        if let Some(prediction) = filter.prediction {
            conditions.push("prediction = ?".to_string());
            params.push(Box::new(prediction));
        }
        if let Some(cm_value) = filter.cm_value {
            conditions.push("cm_value = ?".to_string());
            params.push(Box::new(cm_value.as_str()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let order_by = format!(
            "{} {}, imdb_id ASC",
            prediction_sort_column(filter.page.sort_by.as_deref()),
            sort_order_sql(filter.page.sort_order.as_deref(), "DESC")
        );

        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        Self::query_page(
            &conn,
            "prediction",
            "imdb_id, prediction, probability, cm_value, created_at",
            &where_clause,
            &param_refs,
            &order_by,
            filter.page.clamped_limit(),
            filter.page.offset,
            Self::row_to_prediction,
        )
    }

    fn list_movies(&self, filter: &MovieFilter) -> Result<Page<MovieRecord>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let mut conditions: Vec<String> = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(media_type) = filter.media_type {
            conditions.push("media_type = ?".to_string());
            params.push(Box::new(media_type.as_str()));
        }
        if let Some(label) = filter.label {
            conditions.push("label = ?".to_string());
            params.push(Box::new(label.as_str()));
        }
        if let Some(reviewed) = filter.reviewed {
            conditions.push("reviewed = ?".to_string());
            params.push(Box::new(reviewed));
        }
        if let Some(human_labeled) = filter.human_labeled {
            conditions.push("human_labeled = ?".to_string());
            params.push(Box::new(human_labeled));
        }
        if let Some(anomalous) = filter.anomalous {
            conditions.push("anomalous = ?".to_string());
            params.push(Box::new(anomalous));
        }
        if let Some(prediction) = filter.prediction {
            conditions.push("prediction = ?".to_string());
            params.push(Box::new(prediction));
        }
        if let Some(cm_value) = filter.cm_value {
            conditions.push("cm_value = ?".to_string());
            params.push(Box::new(cm_value.as_str()));
        }
        if !filter.imdb_ids.is_empty() {
            conditions.push(format!(
                "imdb_id IN ({})",
                Self::in_placeholders(filter.imdb_ids.len())
            ));
            for id in &filter.imdb_ids {
                params.push(Box::new(id.clone()));
            }
        }
        if let Some(ref title) = filter.media_title {
            conditions.push("LOWER(media_title) LIKE ?".to_string());
            params.push(Box::new(format!("%{}%", title.to_lowercase())));
        }
        if let Some(release_year) = filter.release_year {
            conditions.push("release_year = ?".to_string());
            params.push(Box::new(release_year));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let order_by = format!(
            "{} {}, imdb_id ASC",
            movie_sort_column(filter.page.sort_by.as_deref()),
            sort_order_sql(filter.page.sort_order.as_deref(), "DESC")
        );

        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        Self::query_page(
            &conn,
            "movies",
            MOVIE_COLUMNS,
            &where_clause,
            &param_refs,
            &order_by,
            filter.page.clamped_limit(),
            filter.page.offset,
            Self::row_to_movie,
        )
    }

    fn list_schema_history(
        &self,
        sort_by: Option<&str>,
        sort_order: Option<&str>,
    ) -> Result<Vec<SchemaHistoryRecord>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let sql = format!(
            "SELECT {} FROM flyway_schema_history ORDER BY {} {}",
            SCHEMA_HISTORY_COLUMNS,
            schema_history_sort_column(sort_by),
            sort_order_sql(sort_order, "ASC")
        );

        let mut stmt = conn.prepare(&sql).map_err(db_err)?;
        let rows = stmt
            .query_map([], Self::row_to_schema_history)
            .map_err(db_err)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(db_err)?);
        }
        Ok(records)
    }
}
