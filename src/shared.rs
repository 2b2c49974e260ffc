use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::leaderboard::UserTotalsRepository;
use crate::predictions::PredictionRepository;
use crate::results::RaceRepository;
use crate::scoring::ScoringService;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub race_repository: Arc<dyn RaceRepository>,
    pub prediction_repository: Arc<dyn PredictionRepository>,
    pub totals_repository: Arc<dyn UserTotalsRepository>,
    pub scoring_service: Arc<ScoringService>,
}

impl AppState {
    pub fn new(
        race_repository: Arc<dyn RaceRepository>,
        prediction_repository: Arc<dyn PredictionRepository>,
        totals_repository: Arc<dyn UserTotalsRepository>,
        scoring_service: Arc<ScoringService>,
    ) -> Self {
        Self {
            race_repository,
            prediction_repository,
            totals_repository,
            scoring_service,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
