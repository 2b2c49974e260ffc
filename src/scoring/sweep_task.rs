use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::interval;
use tracing::{debug, error, info, instrument, warn};

use super::{ScoringError, ScoringService};
use crate::results::{RaceRepository, ResultsService};
use crate::shared::AppError;

/// Configuration for the results sweep
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// How often to look for races with results due
    pub sweep_interval: Duration,
    /// How long after the scheduled start a race becomes eligible
    pub settle_delay: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(60 * 60),   // 1 hour
            settle_delay: Duration::from_secs(3 * 60 * 60), // 3 hours
        }
    }
}

/// Starts the background task that scores races once their results settle
#[instrument(skip(races, scoring_service))]
pub async fn start_results_sweep(
    races: Arc<dyn RaceRepository>,
    scoring_service: Arc<ScoringService>,
    config: SweepConfig,
) {
    info!(
        sweep_interval_secs = config.sweep_interval.as_secs(),
        settle_delay_secs = config.settle_delay.as_secs(),
        "Starting results sweep background task"
    );

    let mut sweep_interval = interval(config.sweep_interval);

    loop {
        sweep_interval.tick().await;

        match sweep_pending_races(&races, &scoring_service, config.settle_delay).await {
            Ok(processed_count) => {
                info!(processed_count, "Results sweep completed");
            }
            Err(e) => {
                error!(error = %e, "Results sweep failed");
            }
        }
    }
}

/// Resolves head-to-heads and scores every race whose start is at least
/// `settle_delay` in the past and whose results are recorded but not yet
/// processed. Returns how many races were processed.
#[instrument(skip(races, scoring_service))]
pub async fn sweep_pending_races(
    races: &Arc<dyn RaceRepository>,
    scoring_service: &ScoringService,
    settle_delay: Duration,
) -> Result<usize, AppError> {
    let settle = chrono::Duration::from_std(settle_delay).map_err(|_| AppError::Internal)?;
    let pending = races.list_pending_races(Utc::now() - settle).await?;

    if pending.is_empty() {
        debug!("No races with results due");
        return Ok(0);
    }

    info!(count = pending.len(), "Found races with results due");

    let results_service = ResultsService::new(Arc::clone(races));
    let mut processed_count = 0;

    for race in pending {
        match results_service.resolve_head_to_head(&race.id).await {
            Ok(_) => {}
            Err(AppError::NotFound(_)) => {
                debug!(race_id = %race.id, "Results not recorded yet");
                continue;
            }
            Err(e) => {
                warn!(race_id = %race.id, error = %e, "Failed to resolve head-to-head");
                continue;
            }
        }

        match scoring_service.process_race_scores(&race.id, false).await {
            Ok(report) => {
                if let Err(e) = races.mark_results_processed(&race.id).await {
                    warn!(race_id = %race.id, error = %e, "Failed to mark race processed");
                    continue;
                }
                processed_count += 1;
                info!(
                    race_id = %race.id,
                    processed = report.processed_count,
                    failed = report.failed_count,
                    skipped = report.skipped,
                    "Race results processed"
                );
            }
            Err(ScoringError::OutcomeNotFound(_)) => {
                debug!(race_id = %race.id, "Outcome disappeared before scoring");
            }
            Err(e) => {
                warn!(race_id = %race.id, error = %e, "Failed to score race");
            }
        }
    }

    Ok(processed_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaderboard::{InMemoryUserTotalsRepository, UserTotalsRepository};
    use async_trait::async_trait;
    use chrono::DateTime;
    use crate::predictions::{
        InMemoryPredictionRepository, Prediction, PredictionPicks, PredictionRepository,
    };
    use crate::results::{
        DriverClassification, FinishStatus, HeadToHeadConfig, InMemoryRaceRepository, Matchup,
        Race, RaceOutcome,
    };

    fn race(id: &str, hours_ago: i64) -> Race {
        Race {
            id: id.to_string(),
            name: format!("{id} Grand Prix"),
            season: "2025".to_string(),
            round: 1,
            starts_at: Utc::now() - chrono::Duration::hours(hours_ago),
            head_to_head: HeadToHeadConfig {
                drivers: Some(Matchup::new("ver", "nor")),
                teams: None,
            },
            results_processed: false,
        }
    }

    fn row(driver: &str, position: u32) -> DriverClassification {
        DriverClassification {
            driver_id: driver.to_string(),
            constructor_id: format!("{driver}-team"),
            position: Some(position),
            status: FinishStatus::Finished,
            fastest_lap_rank: None,
        }
    }

    #[tokio::test]
    async fn sweeps_only_settled_races_with_results() {
        let race_repo = Arc::new(InMemoryRaceRepository::new());
        let predictions = Arc::new(InMemoryPredictionRepository::new());
        let totals = Arc::new(InMemoryUserTotalsRepository::new());
        let races: Arc<dyn RaceRepository> = race_repo.clone();
        let service =
            ScoringService::builder(races.clone(), predictions.clone(), totals.clone()).build();

        race_repo.save_race(&race("settled", 5)).await.unwrap();
        race_repo.save_race(&race("no-results", 5)).await.unwrap();
        race_repo.save_race(&race("too-recent", 1)).await.unwrap();

        let results = ResultsService::new(races.clone());
        for id in ["settled", "too-recent"] {
            results
                .record_results(
                    id,
                    vec![row("nor", 1), row("ver", 2), row("lec", 3)],
                    None,
                )
                .await
                .unwrap();
        }

        predictions
            .upsert_prediction(&Prediction::new(
                "u1",
                "alice",
                "settled",
                PredictionPicks {
                    podium: vec!["nor".into(), "ver".into(), "lec".into()],
                    ..PredictionPicks::default()
                },
            ))
            .await
            .unwrap();

        let processed = sweep_pending_races(&races, &service, Duration::from_secs(3 * 60 * 60))
            .await
            .unwrap();

        assert_eq!(processed, 1);
        assert!(race_repo.get_race("settled").await.unwrap().unwrap().results_processed);
        assert!(!race_repo.get_race("no-results").await.unwrap().unwrap().results_processed);
        assert!(!race_repo.get_race("too-recent").await.unwrap().unwrap().results_processed);
        assert_eq!(
            totals.get_totals("u1").await.unwrap().unwrap().total_points,
            18
        );

        let again = sweep_pending_races(&races, &service, Duration::from_secs(3 * 60 * 60))
            .await
            .unwrap();
        assert_eq!(again, 0);
    }

    /// Refuses to flag one race as processed
    struct StuckFlagRaces {
        inner: InMemoryRaceRepository,
        stuck: &'static str,
    }

    #[async_trait]
    impl RaceRepository for StuckFlagRaces {
        async fn save_race(&self, race: &Race) -> Result<(), AppError> {
            self.inner.save_race(race).await
        }

        async fn get_race(&self, race_id: &str) -> Result<Option<Race>, AppError> {
            self.inner.get_race(race_id).await
        }

        async fn list_pending_races(
            &self,
            started_before: DateTime<Utc>,
        ) -> Result<Vec<Race>, AppError> {
            self.inner.list_pending_races(started_before).await
        }

        async fn mark_results_processed(&self, race_id: &str) -> Result<(), AppError> {
            if race_id == self.stuck {
                return Err(AppError::DatabaseError("lock timeout".into()));
            }
            self.inner.mark_results_processed(race_id).await
        }

        async fn get_outcome(&self, race_id: &str) -> Result<Option<RaceOutcome>, AppError> {
            self.inner.get_outcome(race_id).await
        }

        async fn save_outcome(&self, outcome: &RaceOutcome) -> Result<(), AppError> {
            self.inner.save_outcome(outcome).await
        }
    }

    #[tokio::test]
    async fn one_unflaggable_race_does_not_stop_the_sweep() {
        let race_repo = Arc::new(StuckFlagRaces {
            inner: InMemoryRaceRepository::new(),
            stuck: "imola",
        });
        let races: Arc<dyn RaceRepository> = race_repo.clone();
        let service = ScoringService::builder(
            races.clone(),
            Arc::new(InMemoryPredictionRepository::new()),
            Arc::new(InMemoryUserTotalsRepository::new()),
        )
        .build();

        let results = ResultsService::new(races.clone());
        for id in ["imola", "zandvoort"] {
            race_repo.save_race(&race(id, 5)).await.unwrap();
            results
                .record_results(id, vec![row("nor", 1), row("ver", 2)], None)
                .await
                .unwrap();
        }

        let processed = sweep_pending_races(&races, &service, Duration::from_secs(3 * 60 * 60))
            .await
            .unwrap();

        assert_eq!(processed, 1);
        assert!(race_repo.get_race("zandvoort").await.unwrap().unwrap().results_processed);
        assert!(!race_repo.get_race("imola").await.unwrap().unwrap().results_processed);
    }

    #[test]
    fn default_config_is_hourly_with_three_hour_settle() {
        let config = SweepConfig::default();
        assert_eq!(config.sweep_interval, Duration::from_secs(3600));
        assert_eq!(config.settle_delay, Duration::from_secs(10800));
    }
}
