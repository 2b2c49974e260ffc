use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex as AsyncMutex, RwLock};
use tracing::{info, instrument, warn};

use super::{
    render_summary, RaceScoreReport, ScoreCard, ScoringEngine, ScoringError,
    TotalsRecomputeReport, UserRaceScore,
};
use crate::leaderboard::{UserTotals, UserTotalsRepository};
use crate::predictions::{Prediction, PredictionRepository};
use crate::results::{RaceOutcome, RaceRepository};

/// Applies the scoring engine to every prediction of a race and keeps user
/// totals in step with the stored score cards
pub struct ScoringService {
    engine: Arc<ScoringEngine>,
    races: Arc<dyn RaceRepository>,
    predictions: Arc<dyn PredictionRepository>,
    totals: Arc<dyn UserTotalsRepository>,
    race_mutexes: Arc<RwLock<HashMap<String, Arc<AsyncMutex<()>>>>>,
    /// Batches hold it shared while they move totals; a recompute holds it
    /// exclusively from reading the cards to writing the totals
    totals_gate: Arc<RwLock<()>>,
}

impl ScoringService {
    pub fn builder(
        races: Arc<dyn RaceRepository>,
        predictions: Arc<dyn PredictionRepository>,
        totals: Arc<dyn UserTotalsRepository>,
    ) -> ScoringServiceBuilder {
        ScoringServiceBuilder::new(races, predictions, totals)
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Scores every prediction for a race.
    ///
    /// A race that already has scores is left alone unless `force` is set,
    /// in which case the old cards are cleared and their points taken back
    /// off the user totals before scoring again.
    #[instrument(skip(self))]
    pub async fn process_race_scores(
        &self,
        race_id: &str,
        force: bool,
    ) -> Result<RaceScoreReport, ScoringError> {
        let race_lock = self.race_lock(race_id).await;
        let result = {
            let _race_guard = race_lock.lock().await;
            let _totals_guard = self.totals_gate.read().await;
            self.process_locked(race_id, force).await
        };

        drop(race_lock);
        self.release_race_lock(race_id).await;
        result
    }

    async fn process_locked(
        &self,
        race_id: &str,
        force: bool,
    ) -> Result<RaceScoreReport, ScoringError> {
        let outcome = self.require_outcome(race_id).await?;
        let mut predictions = self.predictions.list_for_race(race_id).await?;

        let already_scored = predictions.iter().filter(|p| p.is_scored()).count();
        if already_scored > 0 {
            if !force {
                info!(
                    race_id = %race_id,
                    already_scored,
                    "Race already scored, skipping"
                );
                return Ok(RaceScoreReport {
                    race_id: race_id.to_string(),
                    processed_count: already_scored,
                    failed_count: 0,
                    skipped: true,
                    results: Vec::new(),
                });
            }

            self.reverse_previous_scores(race_id, &mut predictions).await?;
        }

        info!(
            race_id = %race_id,
            predictions = predictions.len(),
            force,
            "Processing race scores"
        );

        let mut results = Vec::with_capacity(predictions.len());
        let mut failed_count = 0;

        for prediction in &predictions {
            match self.score_prediction(prediction, &outcome).await {
                Ok(result) => results.push(result),
                Err(err) => {
                    failed_count += 1;
                    warn!(
                        race_id = %race_id,
                        prediction_id = %prediction.id,
                        user_id = %prediction.user_id,
                        error = %err,
                        "Failed to score prediction"
                    );
                }
            }
        }

        info!(
            race_id = %race_id,
            processed_count = results.len(),
            failed_count,
            "Race scoring completed"
        );

        Ok(RaceScoreReport {
            race_id: race_id.to_string(),
            processed_count: results.len(),
            failed_count,
            skipped: false,
            results,
        })
    }

    /// Rebuilds every user's totals from the stored score cards alone
    #[instrument(skip(self))]
    pub async fn recompute_user_totals(&self) -> Result<TotalsRecomputeReport, ScoringError> {
        let _totals_guard = self.totals_gate.write().await;
        let scored = self.predictions.list_scored().await?;

        let mut by_user: HashMap<String, UserTotals> = HashMap::new();
        for prediction in &scored {
            let Some(card) = &prediction.score else {
                continue;
            };
            let totals = by_user
                .entry(prediction.user_id.clone())
                .or_insert_with(|| UserTotals::zero(&prediction.user_id, &prediction.username));
            totals.total_points += i64::from(card.points);
            totals.correct_predictions += card.correct_count() as i64;
        }

        let totals: Vec<UserTotals> = by_user.into_values().collect();
        self.totals.replace_all(&totals).await?;

        info!(
            users_updated = totals.len(),
            predictions_counted = scored.len(),
            "User totals recomputed"
        );

        Ok(TotalsRecomputeReport {
            users_updated: totals.len(),
            predictions_counted: scored.len(),
        })
    }

    /// Stored scores for a race with their rendered summaries
    #[instrument(skip(self))]
    pub async fn race_scores(&self, race_id: &str) -> Result<Vec<UserRaceScore>, ScoringError> {
        let outcome = self.require_outcome(race_id).await?;
        let predictions = self.predictions.list_for_race(race_id).await?;

        Ok(predictions
            .iter()
            .filter_map(|prediction| {
                prediction
                    .score
                    .as_ref()
                    .map(|card| user_race_score(prediction, &outcome, card))
            })
            .collect())
    }

    async fn score_prediction(
        &self,
        prediction: &Prediction,
        outcome: &RaceOutcome,
    ) -> Result<UserRaceScore, ScoringError> {
        let card = self
            .engine
            .score(&prediction.id, &prediction.picks, outcome)?;

        self.predictions.save_score(&prediction.id, &card).await?;
        self.totals
            .increment(
                &prediction.user_id,
                &prediction.username,
                i64::from(card.points),
                card.correct_count() as i64,
            )
            .await?;

        info!(
            prediction_id = %prediction.id,
            username = %prediction.username,
            points = card.points,
            "Prediction scored"
        );

        Ok(user_race_score(prediction, outcome, &card))
    }

    /// Takes each previous card back off the user's totals, then clears it.
    ///
    /// One prediction at a time, so a failure leaves every card that is
    /// still stored matching what its user was credited.
    async fn reverse_previous_scores(
        &self,
        race_id: &str,
        predictions: &mut [Prediction],
    ) -> Result<(), ScoringError> {
        let mut reversed = 0;

        for prediction in predictions.iter_mut() {
            let Some(card) = prediction.score.clone() else {
                continue;
            };

            let points = i64::from(card.points);
            let correct = card.correct_count() as i64;
            self.totals
                .increment(&prediction.user_id, &prediction.username, -points, -correct)
                .await?;

            if let Err(err) = self.predictions.clear_score(&prediction.id).await {
                warn!(
                    prediction_id = %prediction.id,
                    error = %err,
                    "Failed to clear score, restoring totals"
                );
                self.totals
                    .increment(&prediction.user_id, &prediction.username, points, correct)
                    .await?;
                return Err(err.into());
            }

            prediction.score = None;
            reversed += 1;
        }

        info!(race_id = %race_id, reversed, "Previous scores reversed");
        Ok(())
    }

    async fn require_outcome(&self, race_id: &str) -> Result<RaceOutcome, ScoringError> {
        self.races
            .get_outcome(race_id)
            .await?
            .ok_or_else(|| ScoringError::OutcomeNotFound(race_id.to_string()))
    }

    async fn race_lock(&self, race_id: &str) -> Arc<AsyncMutex<()>> {
        {
            let guard = self.race_mutexes.read().await;
            if let Some(lock) = guard.get(race_id) {
                return lock.clone();
            }
        }

        let mut guard = self.race_mutexes.write().await;
        guard
            .entry(race_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Drops the race's mutex once nobody else holds or waits on it
    async fn release_race_lock(&self, race_id: &str) {
        let mut guard = self.race_mutexes.write().await;
        if guard
            .get(race_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            guard.remove(race_id);
        }
    }
}

fn user_race_score(prediction: &Prediction, outcome: &RaceOutcome, card: &ScoreCard) -> UserRaceScore {
    UserRaceScore {
        prediction_id: prediction.id.clone(),
        user_id: prediction.user_id.clone(),
        username: prediction.username.clone(),
        points: card.points,
        breakdown: card.breakdown.clone(),
        summary: render_summary(&prediction.username, &prediction.picks, outcome, card),
    }
}

pub struct ScoringServiceBuilder {
    engine: Option<ScoringEngine>,
    races: Arc<dyn RaceRepository>,
    predictions: Arc<dyn PredictionRepository>,
    totals: Arc<dyn UserTotalsRepository>,
}

impl ScoringServiceBuilder {
    fn new(
        races: Arc<dyn RaceRepository>,
        predictions: Arc<dyn PredictionRepository>,
        totals: Arc<dyn UserTotalsRepository>,
    ) -> Self {
        Self {
            engine: None,
            races,
            predictions,
            totals,
        }
    }

    pub fn with_engine(mut self, engine: ScoringEngine) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn build(self) -> ScoringService {
        ScoringService {
            engine: Arc::new(self.engine.unwrap_or_default()),
            races: self.races,
            predictions: self.predictions,
            totals: self.totals,
            race_mutexes: Arc::new(RwLock::new(HashMap::new())),
            totals_gate: Arc::new(RwLock::new(())),
        }
    }
}
