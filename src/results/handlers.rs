use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::{HeadToHeadView, Race, RaceOutcome},
    service::ResultsService,
    types::{RecordResultsRequest, UpsertRaceRequest},
};
use crate::shared::{AppError, AppState};

/// HTTP handler for creating a race or changing its schedule and
/// head-to-head configuration
///
/// PUT /races/:race_id
#[instrument(name = "upsert_race", skip(state, request))]
pub async fn upsert_race(
    State(state): State<AppState>,
    Path(race_id): Path<String>,
    Json(request): Json<UpsertRaceRequest>,
) -> Result<Json<Race>, AppError> {
    if request.name.trim().is_empty() {
        return Err(AppError::BadRequest("Race name cannot be empty".to_string()));
    }

    let service = ResultsService::new(Arc::clone(&state.race_repository));
    let race = service
        .upsert_race(Race {
            id: race_id,
            name: request.name,
            season: request.season,
            round: request.round,
            starts_at: request.starts_at,
            head_to_head: request.head_to_head,
            results_processed: false,
        })
        .await?;

    Ok(Json(race))
}

/// HTTP handler for recording the official classification of a race
///
/// POST /races/:race_id/results
/// Returns the derived outcome with resolved head-to-heads
#[instrument(name = "record_results", skip(state, request))]
pub async fn record_results(
    State(state): State<AppState>,
    Path(race_id): Path<String>,
    Json(request): Json<RecordResultsRequest>,
) -> Result<Json<RaceOutcome>, AppError> {
    info!(race_id = %race_id, entries = request.classification.len(), "Recording results");

    let service = ResultsService::new(Arc::clone(&state.race_repository));
    let outcome = service
        .record_results(&race_id, request.classification, request.pole_position)
        .await?;

    Ok(Json(outcome))
}

/// HTTP handler for head-to-head configuration and results
///
/// GET /races/:race_id/head-to-head
#[instrument(name = "get_head_to_head", skip(state))]
pub async fn get_head_to_head(
    State(state): State<AppState>,
    Path(race_id): Path<String>,
) -> Result<Json<HeadToHeadView>, AppError> {
    let service = ResultsService::new(Arc::clone(&state.race_repository));
    let view = service.head_to_head_view(&race_id).await?;
    Ok(Json(view))
}
