use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use super::{
    models::{DriverClassification, HeadToHeadView, Race, RaceOutcome},
    repository::RaceRepository,
    resolver::resolve_head_to_head,
};
use crate::shared::AppError;

/// Ingests official classifications and keeps head-to-head winners current
pub struct ResultsService {
    races: Arc<dyn RaceRepository>,
}

impl ResultsService {
    pub fn new(races: Arc<dyn RaceRepository>) -> Self {
        Self { races }
    }

    async fn require_race(&self, race_id: &str) -> Result<Race, AppError> {
        self.races
            .get_race(race_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Race {race_id} not found")))
    }

    /// Creates a race or replaces its details.
    ///
    /// The processed flag is kept from the stored race. When results are
    /// already recorded the head-to-heads are resolved again against the
    /// new configuration.
    #[instrument(skip(self, race), fields(race_id = %race.id))]
    pub async fn upsert_race(&self, mut race: Race) -> Result<Race, AppError> {
        let existing = self.races.get_race(&race.id).await?;
        race.results_processed = existing
            .as_ref()
            .is_some_and(|stored| stored.results_processed);

        info!(
            race_id = %race.id,
            created = existing.is_none(),
            starts_at = %race.starts_at,
            "Saving race"
        );
        self.races.save_race(&race).await?;

        if self.races.get_outcome(&race.id).await?.is_some() {
            self.resolve_head_to_head(&race.id).await?;
        }

        Ok(race)
    }

    /// Rebuilds the race outcome from a fresh classification and resolves
    /// its head-to-heads.
    ///
    /// Previously resolved winners carry over only where the new data is
    /// incomplete for a matchup.
    #[instrument(skip(self, classification))]
    pub async fn record_results(
        &self,
        race_id: &str,
        classification: Vec<DriverClassification>,
        pole_position: Option<String>,
    ) -> Result<RaceOutcome, AppError> {
        let race = self.require_race(race_id).await?;
        let previous = self.races.get_outcome(race_id).await?;

        info!(
            race_id = %race_id,
            entries = classification.len(),
            replacing = previous.is_some(),
            "Recording race classification"
        );

        let mut outcome = RaceOutcome::from_classification(race_id, classification, pole_position);
        if let Some(previous) = previous {
            outcome.driver_head_to_head = previous.driver_head_to_head;
            outcome.team_head_to_head = previous.team_head_to_head;
        }

        resolve_head_to_head(&race.head_to_head, &mut outcome);
        self.races.save_outcome(&outcome).await?;

        Ok(outcome)
    }

    /// Re-runs head-to-head resolution against the stored classification,
    /// e.g. after an operator changes the configured matchups
    #[instrument(skip(self))]
    pub async fn resolve_head_to_head(&self, race_id: &str) -> Result<RaceOutcome, AppError> {
        let race = self.require_race(race_id).await?;
        let mut outcome = self.races.get_outcome(race_id).await?.ok_or_else(|| {
            warn!(race_id = %race_id, "No outcome recorded to resolve head-to-head against");
            AppError::NotFound(format!("No results recorded for race {race_id}"))
        })?;

        resolve_head_to_head(&race.head_to_head, &mut outcome);
        outcome.updated_at = Utc::now();
        self.races.save_outcome(&outcome).await?;

        Ok(outcome)
    }

    #[instrument(skip(self))]
    pub async fn head_to_head_view(&self, race_id: &str) -> Result<HeadToHeadView, AppError> {
        let race = self.require_race(race_id).await?;
        let outcome = self.races.get_outcome(race_id).await?;

        Ok(HeadToHeadView {
            race_id: race.id,
            configuration: race.head_to_head,
            drivers: outcome
                .as_ref()
                .and_then(|o| o.driver_head_to_head.clone()),
            teams: outcome.and_then(|o| o.team_head_to_head),
        })
    }
}
