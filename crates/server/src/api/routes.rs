use axum::{
    middleware,
    routing::{get, patch},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{flyway, handlers, media, middleware::metrics_middleware, movies, prediction, training};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health, config, metrics
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::metrics))
        // Training
        .route("/training", get(training::list_training))
        .route("/training/{imdb_id}", patch(training::update_training))
        .route("/training/{imdb_id}/reject", patch(training::reject_training))
        // Media
        .route("/media", get(media::list_media))
        .route("/media/{hash}/pipeline", patch(media::update_pipeline))
        .route("/media/{hash}/soft_delete", patch(media::soft_delete))
        // Predictions and the combined movie view
        .route("/prediction", get(prediction::list_predictions))
        .route("/movies", get(movies::list_movies))
        // Schema history
        .route("/flyway", get(flyway::list_schema_history))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
