use serde::{Deserialize, Serialize};

use super::models::PredictionPicks;

/// Request body for submitting or replacing a prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitPredictionRequest {
    pub user_id: String,
    pub username: String,
    pub picks: PredictionPicks,
}
