use std::sync::Arc;

use chrono::{Duration, Utc};
use gridpicks::{
    leaderboard::{InMemoryUserTotalsRepository, UserTotalsRepository},
    predictions::{InMemoryPredictionRepository, Prediction, PredictionPicks, PredictionRepository},
    results::{HeadToHeadConfig, InMemoryRaceRepository, Matchup, Race, RaceRepository, ResultsService},
    scoring::{PointSchedule, ScoringEngine, ScoringService},
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub race_id: String,
    pub races: Arc<InMemoryRaceRepository>,
    pub predictions: Arc<InMemoryPredictionRepository>,
    pub totals: Arc<InMemoryUserTotalsRepository>,
    pub results_service: ResultsService,
    pub scoring_service: Arc<ScoringService>,
}

#[allow(dead_code)]
impl TestSetup {
    pub async fn predict(&self, user: &str, picks: PredictionPicks) -> Prediction {
        self.predict_for(&self.race_id, user, picks).await
    }

    pub async fn predict_for(&self, race_id: &str, user: &str, picks: PredictionPicks) -> Prediction {
        self.predictions
            .upsert_prediction(&Prediction::new(user, user, race_id, picks))
            .await
            .expect("prediction should be stored")
    }

    pub async fn total_points(&self, user: &str) -> i64 {
        self.totals
            .get_totals(user)
            .await
            .expect("totals lookup should succeed")
            .map(|totals| totals.total_points)
            .unwrap_or_default()
    }
}

pub struct TestSetupBuilder {
    race_id: String,
    head_to_head: HeadToHeadConfig,
    schedule: PointSchedule,
    extra_races: Vec<String>,
}

#[allow(dead_code)]
impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            race_id: "monza-2025".to_string(),
            head_to_head: HeadToHeadConfig::default(),
            schedule: PointSchedule::default(),
            extra_races: Vec::new(),
        }
    }

    pub fn with_driver_matchup(mut self, first: &str, second: &str) -> Self {
        self.head_to_head.drivers = Some(Matchup::new(first, second));
        self
    }

    pub fn with_team_matchup(mut self, first: &str, second: &str) -> Self {
        self.head_to_head.teams = Some(Matchup::new(first, second));
        self
    }

    pub fn with_schedule(mut self, schedule: PointSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_extra_race(mut self, race_id: &str) -> Self {
        self.extra_races.push(race_id.to_string());
        self
    }

    pub async fn build(self) -> TestSetup {
        let races = Arc::new(InMemoryRaceRepository::new());
        let predictions = Arc::new(InMemoryPredictionRepository::new());
        let totals = Arc::new(InMemoryUserTotalsRepository::new());

        let race_ids = std::iter::once(self.race_id.clone()).chain(self.extra_races);
        for (index, race_id) in race_ids.enumerate() {
            races
                .save_race(&Race {
                    id: race_id.clone(),
                    name: format!("{race_id} Grand Prix"),
                    season: "2025".to_string(),
                    round: index as u32 + 1,
                    starts_at: Utc::now() - Duration::hours(4),
                    head_to_head: self.head_to_head.clone(),
                    results_processed: false,
                })
                .await
                .expect("race should be stored");
        }

        let scoring_service = ScoringService::builder(races.clone(), predictions.clone(), totals.clone())
            .with_engine(ScoringEngine::new(self.schedule))
            .build();

        TestSetup {
            race_id: self.race_id,
            results_service: ResultsService::new(races.clone()),
            races,
            predictions,
            totals,
            scoring_service: Arc::new(scoring_service),
        }
    }
}
