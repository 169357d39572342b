//! Media API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use reardiff_core::{
    MediaFilter, MediaPipelinePatch, MediaRecord, MediaType, Page, PageRequest, PipelineStatus,
    RejectionStatus, SoftDeleteOutcome,
};

use super::training::UpdateResponse;
use super::{default_limit, ensure_hash, ensure_imdb_id, identifier_mismatch, store_error, ApiError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MediaListParams {
    #[serde(default)]
    pub media_type: Option<MediaType>,
    #[serde(default)]
    pub pipeline_status: Option<PipelineStatus>,
    #[serde(default)]
    pub rejection_status: Option<RejectionStatus>,
    #[serde(default)]
    pub error_status: Option<bool>,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub media_title: Option<String>,
    #[serde(default)]
    pub hash: Option<String>,
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
pub struct PipelineUpdateRequest {
    pub hash: String,
    #[serde(default)]
    pub pipeline_status: Option<PipelineStatus>,
    #[serde(default)]
    pub error_status: Option<bool>,
    #[serde(default)]
    pub rejection_status: Option<RejectionStatus>,
    #[serde(default)]
    pub clear_error_condition: bool,
}

/// GET /media
///
/// List media records with optional filtering, pagination, and sorting.
/// Soft-deleted rows are always excluded.
pub async fn list_media(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MediaListParams>,
) -> Result<Json<Page<MediaRecord>>, ApiError> {
    if let Some(ref imdb_id) = params.imdb_id {
        ensure_imdb_id(imdb_id)?;
    }
    if let Some(ref hash) = params.hash {
        ensure_hash(hash)?;
    }

    let filter = MediaFilter {
        media_type: params.media_type,
        pipeline_status: params.pipeline_status,
        rejection_status: params.rejection_status,
        error_status: params.error_status,
        imdb_id: params.imdb_id,
        media_title: params.media_title,
        hash: params.hash,
        page: PageRequest {
            limit: params.limit,
            offset: params.offset,
            sort_by: params.sort_by,
            sort_order: params.sort_order,
        },
    };

    state
        .store()
        .list_media(&filter)
        .map(Json)
        .map_err(store_error)
}

/// PATCH /media/{hash}/pipeline
///
/// Conditional multi-field update of a media record's pipeline fields.
pub async fn update_pipeline(
    State(state): State<Arc<AppState>>,
    Path(hash): Path<String>,
    Json(body): Json<PipelineUpdateRequest>,
) -> Result<Json<UpdateResponse>, ApiError> {
    ensure_hash(&hash)?;
    if body.hash != hash {
        return Err(identifier_mismatch());
    }

    let patch = MediaPipelinePatch {
        pipeline_status: body.pipeline_status,
        error_status: body.error_status,
        rejection_status: body.rejection_status,
        clear_error_condition: body.clear_error_condition,
    };

    state
        .store()
        .update_media_pipeline(&hash, &patch)
        .map(|outcome| Json(outcome.into()))
        .map_err(store_error)
}

/// PATCH /media/{hash}/soft_delete
///
/// Soft-delete a media record, attempting torrent removal (including its
/// data) first. Only the database write determines the outcome.
pub async fn soft_delete(
    State(state): State<Arc<AppState>>,
    Path(hash): Path<String>,
) -> Result<Json<SoftDeleteOutcome>, ApiError> {
    ensure_hash(&hash)?;

    state
        .orchestrator()
        .soft_delete(&hash)
        .await
        .map(Json)
        .map_err(store_error)
}
