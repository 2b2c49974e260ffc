use thiserror::Error;

use crate::shared::AppError;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("No outcome recorded for race {0}")]
    OutcomeNotFound(String),

    #[error("Prediction {prediction_id} is malformed: {reason}")]
    MalformedPrediction {
        prediction_id: String,
        reason: String,
    },

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<AppError> for ScoringError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::BadRequest(msg) => ScoringError::Validation(msg),
            other => ScoringError::Repository(other.to_string()),
        }
    }
}

impl From<ScoringError> for AppError {
    fn from(err: ScoringError) -> Self {
        match err {
            ScoringError::OutcomeNotFound(_) => AppError::NotFound(err.to_string()),
            ScoringError::MalformedPrediction { .. } | ScoringError::Validation(_) => {
                AppError::BadRequest(err.to_string())
            }
            ScoringError::Repository(msg) => AppError::DatabaseError(msg),
        }
    }
}
