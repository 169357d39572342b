//! Prediction API handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use reardiff_core::{CmValue, Page, PageRequest, PredictionFilter, PredictionRecord};

use super::{default_limit, ensure_imdb_id, store_error, validation_error, ApiError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PredictionListParams {
    #[serde(default)]
    pub imdb_id: Option<String>,
    /// 0 or 1.
    #[serde(default)]
    pub prediction: Option<i64>,
    #[serde(default)]
    pub cm_value: Option<CmValue>,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: Option<String>,
}

/// GET /prediction
///
/// List model predictions with optional filtering, pagination, and sorting.
pub async fn list_predictions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PredictionListParams>,
) -> Result<Json<Page<PredictionRecord>>, ApiError> {
    if let Some(ref imdb_id) = params.imdb_id {
        ensure_imdb_id(imdb_id)?;
    }
    if let Some(prediction) = params.prediction {
        if prediction != 0 && prediction != 1 {
            return Err(validation_error(format!(
                "Prediction must be 0 or 1, got: {}",
                prediction
            )));
        }
    }

    let filter = PredictionFilter {
        imdb_id: params.imdb_id,
        prediction: params.prediction,
        cm_value: params.cm_value,
        page: PageRequest {
            limit: params.limit,
            offset: params.offset,
            sort_by: params.sort_by,
            sort_order: params.sort_order,
        },
    };

    state
        .store()
        .list_predictions(&filter)
        .map(Json)
        .map_err(store_error)
}
