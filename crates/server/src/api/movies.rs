//! Movie view API handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use reardiff_core::{
    CmValue, Label, MediaType, MovieFilter, MovieRecord, Page, PageRequest,
};

use super::{default_limit, parse_imdb_ids, store_error, validation_error, ApiError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MovieListParams {
    // Training filters
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
    // Prediction filters
    #[serde(default)]
    pub prediction: Option<i64>,
    #[serde(default)]
    pub cm_value: Option<CmValue>,
    // Content filters
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub media_title: Option<String>,
    #[serde(default)]
    pub release_year: Option<i64>,
    // Pagination and sorting
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: Option<String>,
}

/// GET /movies
///
/// List the combined training + prediction view with filters from both
/// sides.
pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MovieListParams>,
) -> Result<Json<Page<MovieRecord>>, ApiError> {
    let imdb_ids = parse_imdb_ids(params.imdb_id.as_deref())?;

    if let Some(prediction) = params.prediction {
        if prediction != 0 && prediction != 1 {
            return Err(validation_error(format!(
                "Prediction must be 0 or 1, got: {}",
                prediction
            )));
        }
    }
    if let Some(year) = params.release_year {
        if !(1850..=2100).contains(&year) {
            return Err(validation_error(format!(
                "Release year must be between 1850 and 2100, got: {}",
                year
            )));
        }
    }

    let filter = MovieFilter {
        media_type: params.media_type,
        label: params.label,
        reviewed: params.reviewed,
        human_labeled: params.human_labeled,
        anomalous: params.anomalous,
        prediction: params.prediction,
        cm_value: params.cm_value,
        imdb_ids,
        media_title: params.media_title,
        release_year: params.release_year,
        page: PageRequest {
            limit: params.limit,
            offset: params.offset,
            sort_by: params.sort_by,
            sort_order: params.sort_order,
        },
    };

    state
        .store()
        .list_movies(&filter)
        .map(Json)
        .map_err(store_error)
}
