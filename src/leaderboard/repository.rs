use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{sort_standings, UserTotals};
use crate::shared::AppError;

/// Storage for the per-user totals read model
#[async_trait]
pub trait UserTotalsRepository: Send + Sync {
    /// Adds the deltas to a user's totals in one atomic step, creating the
    /// row at zero first when the user has none. Deltas may be negative.
    async fn increment(
        &self,
        user_id: &str,
        username: &str,
        points_delta: i64,
        correct_delta: i64,
    ) -> Result<(), AppError>;

    /// Overwrites the totals of every listed user and resets every other
    /// known user to zero
    async fn replace_all(&self, totals: &[UserTotals]) -> Result<(), AppError>;

    async fn get_totals(&self, user_id: &str) -> Result<Option<UserTotals>, AppError>;

    /// Best totals first, at most `limit` rows
    async fn leaderboard(&self, limit: usize) -> Result<Vec<UserTotals>, AppError>;
}

/// In-memory implementation of UserTotalsRepository for development and testing
#[derive(Debug, Default)]
pub struct InMemoryUserTotalsRepository {
    totals: RwLock<HashMap<String, UserTotals>>,
}

impl InMemoryUserTotalsRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserTotalsRepository for InMemoryUserTotalsRepository {
    #[instrument(skip(self))]
    async fn increment(
        &self,
        user_id: &str,
        username: &str,
        points_delta: i64,
        correct_delta: i64,
    ) -> Result<(), AppError> {
        let mut totals = self.totals.write().await;
        let entry = totals
            .entry(user_id.to_string())
            .or_insert_with(|| UserTotals::zero(user_id, username));

        entry.username = username.to_string();
        entry.total_points += points_delta;
        entry.correct_predictions += correct_delta;

        debug!(
            user_id = %user_id,
            total_points = entry.total_points,
            "User totals incremented in memory"
        );
        Ok(())
    }

    #[instrument(skip(self, replacement), fields(users = replacement.len()))]
    async fn replace_all(&self, replacement: &[UserTotals]) -> Result<(), AppError> {
        let mut totals = self.totals.write().await;

        for existing in totals.values_mut() {
            existing.total_points = 0;
            existing.correct_predictions = 0;
        }
        for user in replacement {
            totals.insert(user.user_id.clone(), user.clone());
        }

        Ok(())
    }

    async fn get_totals(&self, user_id: &str) -> Result<Option<UserTotals>, AppError> {
        let totals = self.totals.read().await;
        Ok(totals.get(user_id).cloned())
    }

    #[instrument(skip(self))]
    async fn leaderboard(&self, limit: usize) -> Result<Vec<UserTotals>, AppError> {
        let totals = self.totals.read().await;
        let mut standings: Vec<UserTotals> = totals.values().cloned().collect();
        sort_standings(&mut standings);
        standings.truncate(limit);
        Ok(standings)
    }
}

/// PostgreSQL implementation of the user totals repository
pub struct PostgresUserTotalsRepository {
    pool: PgPool,
}

impl PostgresUserTotalsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn totals_from_row(row: &PgRow) -> UserTotals {
        UserTotals {
            user_id: row.get("user_id"),
            username: row.get("username"),
            total_points: row.get("total_points"),
            correct_predictions: row.get("correct_predictions"),
        }
    }
}

fn database_error(e: sqlx::Error) -> AppError {
    warn!(error = %e, "User totals query failed");
    AppError::DatabaseError(e.to_string())
}

#[async_trait]
impl UserTotalsRepository for PostgresUserTotalsRepository {
    #[instrument(skip(self))]
    async fn increment(
        &self,
        user_id: &str,
        username: &str,
        points_delta: i64,
        correct_delta: i64,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO user_totals (user_id, username, total_points, correct_predictions)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (user_id) DO UPDATE
                 SET username = EXCLUDED.username,
                     total_points = user_totals.total_points + EXCLUDED.total_points,
                     correct_predictions = user_totals.correct_predictions + EXCLUDED.correct_predictions",
        )
        .bind(user_id)
        .bind(username)
        .bind(points_delta)
        .bind(correct_delta)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(())
    }

    #[instrument(skip(self, totals), fields(users = totals.len()))]
    async fn replace_all(&self, totals: &[UserTotals]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        sqlx::query("UPDATE user_totals SET total_points = 0, correct_predictions = 0")
            .execute(&mut *tx)
            .await
            .map_err(database_error)?;

        for user in totals {
            sqlx::query(
                "INSERT INTO user_totals (user_id, username, total_points, correct_predictions)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT (user_id) DO UPDATE
                     SET username = EXCLUDED.username,
                         total_points = EXCLUDED.total_points,
                         correct_predictions = EXCLUDED.correct_predictions",
            )
            .bind(&user.user_id)
            .bind(&user.username)
            .bind(user.total_points)
            .bind(user.correct_predictions)
            .execute(&mut *tx)
            .await
            .map_err(database_error)?;
        }

        tx.commit().await.map_err(database_error)?;
        Ok(())
    }

    async fn get_totals(&self, user_id: &str) -> Result<Option<UserTotals>, AppError> {
        let row = sqlx::query(
            "SELECT user_id, username, total_points, correct_predictions
             FROM user_totals WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(row.as_ref().map(Self::totals_from_row))
    }

    #[instrument(skip(self))]
    async fn leaderboard(&self, limit: usize) -> Result<Vec<UserTotals>, AppError> {
        let rows = sqlx::query(
            "SELECT user_id, username, total_points, correct_predictions
             FROM user_totals
             ORDER BY total_points DESC, correct_predictions DESC, username ASC
             LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(rows.iter().map(Self::totals_from_row).collect())
    }
}
