use async_trait::async_trait;
use sqlx::{postgres::PgRow, types::Json, PgPool, Row};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{Prediction, PredictionPicks};
use crate::scoring::ScoreCard;
use crate::shared::AppError;

/// Storage for predictions and their score cards
#[async_trait]
pub trait PredictionRepository: Send + Sync {
    /// Inserts a prediction, or replaces the picks of the one the user
    /// already has for that race. A prediction that carries a score is
    /// never replaced.
    async fn upsert_prediction(&self, prediction: &Prediction) -> Result<Prediction, AppError>;

    async fn list_for_race(&self, race_id: &str) -> Result<Vec<Prediction>, AppError>;

    /// Every prediction that currently carries a score
    async fn list_scored(&self) -> Result<Vec<Prediction>, AppError>;

    /// Writes points and breakdown for one prediction in a single update
    async fn save_score(&self, prediction_id: &str, score: &ScoreCard) -> Result<(), AppError>;

    /// Unsets the score of a single prediction
    async fn clear_score(&self, prediction_id: &str) -> Result<(), AppError>;
}

/// In-memory implementation of PredictionRepository for development and testing
#[derive(Debug, Default)]
pub struct InMemoryPredictionRepository {
    predictions: RwLock<HashMap<String, Prediction>>,
}

impl InMemoryPredictionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PredictionRepository for InMemoryPredictionRepository {
    #[instrument(skip(self, prediction))]
    async fn upsert_prediction(&self, prediction: &Prediction) -> Result<Prediction, AppError> {
        let mut predictions = self.predictions.write().await;

        let existing = predictions
            .values_mut()
            .find(|p| p.user_id == prediction.user_id && p.race_id == prediction.race_id);

        let stored = match existing {
            Some(existing) if existing.is_scored() => {
                warn!(prediction_id = %existing.id, "Refusing to replace a scored prediction");
                return Err(already_scored(&existing.id));
            }
            Some(existing) => {
                debug!(prediction_id = %existing.id, "Replacing picks in memory");
                existing.picks = prediction.picks.clone();
                existing.submitted_at = prediction.submitted_at;
                existing.clone()
            }
            None => {
                predictions.insert(prediction.id.clone(), prediction.clone());
                prediction.clone()
            }
        };

        Ok(stored)
    }

    #[instrument(skip(self))]
    async fn list_for_race(&self, race_id: &str) -> Result<Vec<Prediction>, AppError> {
        let predictions = self.predictions.read().await;
        let mut for_race: Vec<Prediction> = predictions
            .values()
            .filter(|p| p.race_id == race_id)
            .cloned()
            .collect();
        for_race.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at).then(a.id.cmp(&b.id)));
        Ok(for_race)
    }

    #[instrument(skip(self))]
    async fn list_scored(&self) -> Result<Vec<Prediction>, AppError> {
        let predictions = self.predictions.read().await;
        Ok(predictions
            .values()
            .filter(|p| p.is_scored())
            .cloned()
            .collect())
    }

    #[instrument(skip(self, score))]
    async fn save_score(&self, prediction_id: &str, score: &ScoreCard) -> Result<(), AppError> {
        let mut predictions = self.predictions.write().await;
        match predictions.get_mut(prediction_id) {
            Some(prediction) => {
                prediction.score = Some(score.clone());
                Ok(())
            }
            None => {
                warn!(prediction_id = %prediction_id, "Prediction not found for score update");
                Err(AppError::NotFound(format!(
                    "Prediction {prediction_id} not found"
                )))
            }
        }
    }

    #[instrument(skip(self))]
    async fn clear_score(&self, prediction_id: &str) -> Result<(), AppError> {
        let mut predictions = self.predictions.write().await;
        match predictions.get_mut(prediction_id) {
            Some(prediction) => {
                prediction.score = None;
                Ok(())
            }
            None => {
                warn!(prediction_id = %prediction_id, "Prediction not found when clearing score");
                Err(AppError::NotFound(format!(
                    "Prediction {prediction_id} not found"
                )))
            }
        }
    }
}

/// PostgreSQL implementation of prediction repository
pub struct PostgresPredictionRepository {
    pool: PgPool,
}

impl PostgresPredictionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn prediction_from_row(row: &PgRow) -> Prediction {
        let Json(picks): Json<PredictionPicks> = row.get("picks");
        Prediction {
            id: row.get("id"),
            user_id: row.get("user_id"),
            username: row.get("username"),
            race_id: row.get("race_id"),
            picks,
            score: row
                .get::<Option<Json<ScoreCard>>, _>("score")
                .map(|Json(score)| score),
            submitted_at: row.get("submitted_at"),
        }
    }
}

fn already_scored(prediction_id: &str) -> AppError {
    AppError::BadRequest(format!(
        "Prediction {prediction_id} has already been scored and can no longer be changed"
    ))
}

fn database_error(e: sqlx::Error) -> AppError {
    warn!(error = %e, "Prediction repository query failed");
    AppError::DatabaseError(e.to_string())
}

#[async_trait]
impl PredictionRepository for PostgresPredictionRepository {
    #[instrument(skip(self, prediction))]
    async fn upsert_prediction(&self, prediction: &Prediction) -> Result<Prediction, AppError> {
        let row = sqlx::query(
            "INSERT INTO predictions (id, user_id, username, race_id, picks, score, submitted_at)
             VALUES ($1, $2, $3, $4, $5, NULL, $6)
             ON CONFLICT (user_id, race_id) DO UPDATE
                 SET picks = EXCLUDED.picks, submitted_at = EXCLUDED.submitted_at
                 WHERE predictions.score IS NULL
             RETURNING id, user_id, username, race_id, picks, score, submitted_at",
        )
        .bind(&prediction.id)
        .bind(&prediction.user_id)
        .bind(&prediction.username)
        .bind(&prediction.race_id)
        .bind(Json(&prediction.picks))
        .bind(prediction.submitted_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        // the conflict branch yields no row when the existing prediction is scored
        match row {
            Some(row) => Ok(Self::prediction_from_row(&row)),
            None => {
                warn!(
                    user_id = %prediction.user_id,
                    race_id = %prediction.race_id,
                    "Refusing to replace a scored prediction"
                );
                Err(already_scored(&prediction.id))
            }
        }
    }

    #[instrument(skip(self))]
    async fn list_for_race(&self, race_id: &str) -> Result<Vec<Prediction>, AppError> {
        let rows = sqlx::query(
            "SELECT id, user_id, username, race_id, picks, score, submitted_at
             FROM predictions WHERE race_id = $1 ORDER BY submitted_at, id",
        )
        .bind(race_id)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(rows.iter().map(Self::prediction_from_row).collect())
    }

    #[instrument(skip(self))]
    async fn list_scored(&self) -> Result<Vec<Prediction>, AppError> {
        let rows = sqlx::query(
            "SELECT id, user_id, username, race_id, picks, score, submitted_at
             FROM predictions WHERE score IS NOT NULL",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(rows.iter().map(Self::prediction_from_row).collect())
    }

    #[instrument(skip(self, score))]
    async fn save_score(&self, prediction_id: &str, score: &ScoreCard) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE predictions SET score = $2 WHERE id = $1")
            .bind(prediction_id)
            .bind(Json(score))
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Prediction {prediction_id} not found"
            )));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear_score(&self, prediction_id: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE predictions SET score = NULL WHERE id = $1")
            .bind(prediction_id)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Prediction {prediction_id} not found"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{BreakdownEntry, OutcomeCategory};

    fn picks(podium: [&str; 3]) -> PredictionPicks {
        PredictionPicks {
            podium: podium.iter().map(|d| d.to_string()).collect(),
            ..PredictionPicks::default()
        }
    }

    fn card(points: u32) -> ScoreCard {
        ScoreCard {
            points,
            breakdown: vec![BreakdownEntry {
                category: OutcomeCategory::Winner,
                points,
                subject: "ver".to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn upsert_keeps_one_prediction_per_user_and_race() {
        let repo = InMemoryPredictionRepository::new();
        let first = Prediction::new("u1", "alice", "monza", picks(["a", "b", "c"]));
        repo.upsert_prediction(&first).await.unwrap();

        let edited = Prediction::new("u1", "alice", "monza", picks(["c", "b", "a"]));
        let replaced = repo.upsert_prediction(&edited).await.unwrap();

        assert_eq!(replaced.id, first.id);
        let for_race = repo.list_for_race("monza").await.unwrap();
        assert_eq!(for_race.len(), 1);
        assert_eq!(for_race[0].picks.podium[0], "c");
    }

    #[tokio::test]
    async fn scored_prediction_cannot_be_replaced() {
        let repo = InMemoryPredictionRepository::new();
        let stored = repo
            .upsert_prediction(&Prediction::new("u1", "alice", "monza", picks(["a", "b", "c"])))
            .await
            .unwrap();
        repo.save_score(&stored.id, &card(6)).await.unwrap();

        let edited = Prediction::new("u1", "alice", "monza", picks(["c", "b", "a"]));
        let result = repo.upsert_prediction(&edited).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
        let for_race = repo.list_for_race("monza").await.unwrap();
        assert_eq!(for_race[0].picks.podium[0], "a");
        assert_eq!(for_race[0].score, Some(card(6)));
    }

    #[tokio::test]
    async fn clear_score_only_touches_one_prediction() {
        let repo = InMemoryPredictionRepository::new();
        let a = repo
            .upsert_prediction(&Prediction::new("u1", "alice", "monza", picks(["a", "b", "c"])))
            .await
            .unwrap();
        let b = repo
            .upsert_prediction(&Prediction::new("u2", "bob", "monza", picks(["a", "b", "c"])))
            .await
            .unwrap();
        repo.save_score(&a.id, &card(6)).await.unwrap();
        repo.save_score(&b.id, &card(2)).await.unwrap();

        repo.clear_score(&a.id).await.unwrap();

        let scored = repo.list_scored().await.unwrap();
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].id, b.id);
        assert!(matches!(
            repo.clear_score("missing").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn save_score_for_missing_prediction_fails() {
        let repo = InMemoryPredictionRepository::new();
        let result = repo.save_score("missing", &card(1)).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
