//! Record store for the pipeline's persisted entities.
//!
//! Provides filtered, paginated, sorted read access and narrow
//! conditional-write access to training, media, prediction, and schema
//! history records.

mod sqlite;
mod types;

pub use sqlite::SqliteRecordStore;
pub use types::*;
