use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use tracing::instrument;

use super::models::{rank_standings, LeaderboardEntry};
use crate::shared::{AppError, AppState};

const DEFAULT_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
}

/// GET /leaderboard?limit=n
#[instrument(name = "get_leaderboard", skip(state))]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    if limit == 0 {
        return Err(AppError::BadRequest("limit must be at least 1".to_string()));
    }

    let standings = state.totals_repository.leaderboard(limit).await?;
    Ok(Json(rank_standings(standings)))
}
