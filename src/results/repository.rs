use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, types::Json, PgPool, Row};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{DriverClassification, HeadToHeadConfig, MatchupOutcome, Race, RaceOutcome};
use crate::shared::AppError;

/// Storage for races and their official outcomes
#[async_trait]
pub trait RaceRepository: Send + Sync {
    async fn save_race(&self, race: &Race) -> Result<(), AppError>;
    async fn get_race(&self, race_id: &str) -> Result<Option<Race>, AppError>;

    /// Races that started at or before `started_before` and whose results
    /// have not been processed yet, oldest first
    async fn list_pending_races(&self, started_before: DateTime<Utc>)
        -> Result<Vec<Race>, AppError>;

    async fn mark_results_processed(&self, race_id: &str) -> Result<(), AppError>;

    async fn get_outcome(&self, race_id: &str) -> Result<Option<RaceOutcome>, AppError>;

    /// Inserts or replaces the single outcome for a race
    async fn save_outcome(&self, outcome: &RaceOutcome) -> Result<(), AppError>;
}

/// In-memory implementation of RaceRepository for development and testing
#[derive(Debug, Default)]
pub struct InMemoryRaceRepository {
    races: RwLock<HashMap<String, Race>>,
    outcomes: RwLock<HashMap<String, RaceOutcome>>,
}

impl InMemoryRaceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RaceRepository for InMemoryRaceRepository {
    #[instrument(skip(self, race))]
    async fn save_race(&self, race: &Race) -> Result<(), AppError> {
        debug!(race_id = %race.id, "Saving race in memory");
        self.races
            .write()
            .await
            .insert(race.id.clone(), race.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_race(&self, race_id: &str) -> Result<Option<Race>, AppError> {
        Ok(self.races.read().await.get(race_id).cloned())
    }

    #[instrument(skip(self))]
    async fn list_pending_races(
        &self,
        started_before: DateTime<Utc>,
    ) -> Result<Vec<Race>, AppError> {
        let races = self.races.read().await;
        let mut pending: Vec<Race> = races
            .values()
            .filter(|race| !race.results_processed && race.starts_at <= started_before)
            .cloned()
            .collect();
        pending.sort_by_key(|race| race.starts_at);

        debug!(pending = pending.len(), "Pending races listed from memory");
        Ok(pending)
    }

    #[instrument(skip(self))]
    async fn mark_results_processed(&self, race_id: &str) -> Result<(), AppError> {
        let mut races = self.races.write().await;
        match races.get_mut(race_id) {
            Some(race) => {
                race.results_processed = true;
                Ok(())
            }
            None => {
                warn!(race_id = %race_id, "Race not found when marking results processed");
                Err(AppError::NotFound(format!("Race {race_id} not found")))
            }
        }
    }

    #[instrument(skip(self))]
    async fn get_outcome(&self, race_id: &str) -> Result<Option<RaceOutcome>, AppError> {
        Ok(self.outcomes.read().await.get(race_id).cloned())
    }

    #[instrument(skip(self, outcome))]
    async fn save_outcome(&self, outcome: &RaceOutcome) -> Result<(), AppError> {
        debug!(race_id = %outcome.race_id, "Saving race outcome in memory");
        self.outcomes
            .write()
            .await
            .insert(outcome.race_id.clone(), outcome.clone());
        Ok(())
    }
}

/// PostgreSQL implementation of race repository
pub struct PostgresRaceRepository {
    pool: PgPool,
}

impl PostgresRaceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn race_from_row(row: &PgRow) -> Race {
        let Json(head_to_head): Json<HeadToHeadConfig> = row.get("head_to_head");
        Race {
            id: row.get("id"),
            name: row.get("name"),
            season: row.get("season"),
            round: row.get::<i32, _>("round") as u32,
            starts_at: row.get("starts_at"),
            head_to_head,
            results_processed: row.get("results_processed"),
        }
    }
}

fn database_error(e: sqlx::Error) -> AppError {
    warn!(error = %e, "Race repository query failed");
    AppError::DatabaseError(e.to_string())
}

#[async_trait]
impl RaceRepository for PostgresRaceRepository {
    #[instrument(skip(self, race))]
    async fn save_race(&self, race: &Race) -> Result<(), AppError> {
        debug!(race_id = %race.id, "Saving race in database");

        sqlx::query(
            "INSERT INTO races (id, name, season, round, starts_at, head_to_head, results_processed)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (id) DO UPDATE SET name = $2, season = $3, round = $4, starts_at = $5,
                 head_to_head = $6, results_processed = $7",
        )
        .bind(&race.id)
        .bind(&race.name)
        .bind(&race.season)
        .bind(race.round as i32)
        .bind(race.starts_at)
        .bind(Json(&race.head_to_head))
        .bind(race.results_processed)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_race(&self, race_id: &str) -> Result<Option<Race>, AppError> {
        let row = sqlx::query(
            "SELECT id, name, season, round, starts_at, head_to_head, results_processed
             FROM races WHERE id = $1",
        )
        .bind(race_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(row.as_ref().map(Self::race_from_row))
    }

    #[instrument(skip(self))]
    async fn list_pending_races(
        &self,
        started_before: DateTime<Utc>,
    ) -> Result<Vec<Race>, AppError> {
        let rows = sqlx::query(
            "SELECT id, name, season, round, starts_at, head_to_head, results_processed
             FROM races WHERE results_processed = FALSE AND starts_at <= $1
             ORDER BY starts_at ASC",
        )
        .bind(started_before)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(rows.iter().map(Self::race_from_row).collect())
    }

    #[instrument(skip(self))]
    async fn mark_results_processed(&self, race_id: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE races SET results_processed = TRUE WHERE id = $1")
            .bind(race_id)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Race {race_id} not found")));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_outcome(&self, race_id: &str) -> Result<Option<RaceOutcome>, AppError> {
        let row = sqlx::query(
            "SELECT race_id, podium, pole_position, fastest_lap, first_retirement, classification,
                    driver_head_to_head, team_head_to_head, updated_at
             FROM race_outcomes WHERE race_id = $1",
        )
        .bind(race_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(row.map(|row| {
            let Json(classification): Json<Vec<DriverClassification>> = row.get("classification");
            RaceOutcome {
                race_id: row.get("race_id"),
                podium: row.get("podium"),
                pole_position: row.get("pole_position"),
                fastest_lap: row.get("fastest_lap"),
                first_retirement: row.get("first_retirement"),
                classification,
                driver_head_to_head: row
                    .get::<Option<Json<MatchupOutcome>>, _>("driver_head_to_head")
                    .map(|Json(matchup)| matchup),
                team_head_to_head: row
                    .get::<Option<Json<MatchupOutcome>>, _>("team_head_to_head")
                    .map(|Json(matchup)| matchup),
                updated_at: row.get("updated_at"),
            }
        }))
    }

    #[instrument(skip(self, outcome))]
    async fn save_outcome(&self, outcome: &RaceOutcome) -> Result<(), AppError> {
        debug!(race_id = %outcome.race_id, "Saving race outcome in database");

        sqlx::query(
            "INSERT INTO race_outcomes (race_id, podium, pole_position, fastest_lap, first_retirement,
                 classification, driver_head_to_head, team_head_to_head, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             ON CONFLICT (race_id) DO UPDATE SET podium = $2, pole_position = $3, fastest_lap = $4,
                 first_retirement = $5, classification = $6, driver_head_to_head = $7,
                 team_head_to_head = $8, updated_at = $9",
        )
        .bind(&outcome.race_id)
        .bind(&outcome.podium)
        .bind(&outcome.pole_position)
        .bind(&outcome.fastest_lap)
        .bind(&outcome.first_retirement)
        .bind(Json(&outcome.classification))
        .bind(outcome.driver_head_to_head.as_ref().map(Json))
        .bind(outcome.team_head_to_head.as_ref().map(Json))
        .bind(outcome.updated_at)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(())
    }
}
