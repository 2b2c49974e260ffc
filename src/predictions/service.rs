use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use super::{
    models::{Prediction, PredictionPicks},
    repository::PredictionRepository,
};
use crate::results::RaceRepository;
use crate::shared::AppError;

/// Accepts predictions while a race is still open
pub struct PredictionService {
    races: Arc<dyn RaceRepository>,
    predictions: Arc<dyn PredictionRepository>,
}

impl PredictionService {
    pub fn new(races: Arc<dyn RaceRepository>, predictions: Arc<dyn PredictionRepository>) -> Self {
        Self { races, predictions }
    }

    /// Stores the user's picks for a race, replacing earlier picks.
    ///
    /// Submissions close when the race starts.
    #[instrument(skip(self, picks))]
    pub async fn submit(
        &self,
        race_id: &str,
        user_id: &str,
        username: &str,
        picks: PredictionPicks,
    ) -> Result<Prediction, AppError> {
        self.submit_at(race_id, user_id, username, picks, Utc::now())
            .await
    }

    async fn submit_at(
        &self,
        race_id: &str,
        user_id: &str,
        username: &str,
        picks: PredictionPicks,
        now: DateTime<Utc>,
    ) -> Result<Prediction, AppError> {
        if user_id.trim().is_empty() || username.trim().is_empty() {
            return Err(AppError::BadRequest(
                "user_id and username are required".to_string(),
            ));
        }
        picks.validate().map_err(AppError::BadRequest)?;

        let race = self
            .races
            .get_race(race_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Race {race_id} not found")))?;

        if now >= race.starts_at {
            warn!(
                race_id = %race_id,
                user_id = %user_id,
                starts_at = %race.starts_at,
                "Prediction submitted after race start"
            );
            return Err(AppError::BadRequest(format!(
                "Predictions for race {race_id} closed at {}",
                race.starts_at
            )));
        }

        let stored = self
            .predictions
            .upsert_prediction(&Prediction::new(user_id, username, race_id, picks))
            .await?;

        info!(
            race_id = %race_id,
            user_id = %user_id,
            prediction_id = %stored.id,
            "Prediction stored"
        );
        Ok(stored)
    }
}
