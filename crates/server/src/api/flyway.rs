//! Schema history API handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use reardiff_core::SchemaHistoryRecord;

use super::{store_error, ApiError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SchemaHistoryParams {
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SchemaHistoryResponse {
    pub data: Vec<SchemaHistoryRecord>,
}

/// GET /flyway
///
/// List applied schema migrations, sorted by installed_rank (numeric),
/// installed_on, or version.
pub async fn list_schema_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SchemaHistoryParams>,
) -> Result<Json<SchemaHistoryResponse>, ApiError> {
    state
        .store()
        .list_schema_history(params.sort_by.as_deref(), params.sort_order.as_deref())
        .map(|data| Json(SchemaHistoryResponse { data }))
        .map_err(store_error)
}
