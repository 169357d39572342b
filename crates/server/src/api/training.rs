//! Training data API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use reardiff_core::{
    Label, MediaType, Page, PageRequest, RejectOutcome, TrainingFilter, TrainingPatch,
    TrainingRecord, UpdateOutcome,
};

use super::{
    default_limit, ensure_imdb_id, identifier_mismatch, parse_imdb_ids, store_error, ApiError,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TrainingListParams {
    #[serde(default)]
    pub media_type: Option<MediaType>,
    #[serde(default)]
    pub label: Option<Label>,
    #[serde(default)]
    pub reviewed: Option<bool>,
    #[serde(default)]
    pub human_labeled: Option<bool>,
    #[serde(default)]
    pub anomalous: Option<bool>,
    /// Single id or comma-separated list.
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub media_title: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TrainingUpdateRequest {
    pub imdb_id: String,
    #[serde(default)]
    pub label: Option<Label>,
    #[serde(default)]
    pub human_labeled: Option<bool>,
    #[serde(default)]
    pub anomalous: Option<bool>,
    #[serde(default)]
    pub reviewed: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub success: bool,
    pub message: String,
    pub updated_fields: Vec<String>,
}

impl From<UpdateOutcome> for UpdateResponse {
    fn from(outcome: UpdateOutcome) -> Self {
        Self {
            success: true,
            message: outcome.message,
            updated_fields: outcome.updated_fields,
        }
    }
}

/// GET /training
///
/// List training records with optional filtering, pagination, and sorting.
pub async fn list_training(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TrainingListParams>,
) -> Result<Json<Page<TrainingRecord>>, ApiError> {
    let imdb_ids = parse_imdb_ids(params.imdb_id.as_deref())?;

    let filter = TrainingFilter {
        media_type: params.media_type,
        label: params.label,
        reviewed: params.reviewed,
        human_labeled: params.human_labeled,
        anomalous: params.anomalous,
        imdb_ids,
        media_title: params.media_title,
        page: PageRequest {
            limit: params.limit,
            offset: params.offset,
            sort_by: params.sort_by,
            sort_order: params.sort_order,
        },
    };

    state
        .store()
        .list_training(&filter)
        .map(Json)
        .map_err(store_error)
}

/// PATCH /training/{imdb_id}
///
/// Update label/flag fields of a training record. The body identifier must
/// match the path identifier.
pub async fn update_training(
    State(state): State<Arc<AppState>>,
    Path(imdb_id): Path<String>,
    Json(body): Json<TrainingUpdateRequest>,
) -> Result<Json<UpdateResponse>, ApiError> {
    ensure_imdb_id(&imdb_id)?;
    if body.imdb_id != imdb_id {
        return Err(identifier_mismatch());
    }

    let patch = TrainingPatch {
        label: body.label,
        human_labeled: body.human_labeled,
        anomalous: body.anomalous,
        reviewed: body.reviewed,
    };

    state
        .store()
        .update_training(&imdb_id, &patch)
        .map(|outcome| Json(outcome.into()))
        .map_err(store_error)
}

/// PATCH /training/{imdb_id}/reject
///
/// Run the reject workflow: set the label to would_not_watch and tear down
/// the item's external footprint best-effort.
pub async fn reject_training(
    State(state): State<Arc<AppState>>,
    Path(imdb_id): Path<String>,
) -> Result<Json<RejectOutcome>, ApiError> {
    ensure_imdb_id(&imdb_id)?;

    state
        .orchestrator()
        .reject(&imdb_id)
        .await
        .map(Json)
        .map_err(store_error)
}
