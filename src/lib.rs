// Library crate for the race prediction scoring server
// This file exposes the public API for integration tests

pub mod config;
pub mod leaderboard;
pub mod predictions;
pub mod results;
pub mod scoring;
pub mod shared;

// Re-export commonly used types for easier access in tests
pub use config::AppConfig;
pub use leaderboard::{InMemoryUserTotalsRepository, UserTotals, UserTotalsRepository};
pub use predictions::{
    HeadToHeadPick, InMemoryPredictionRepository, Prediction, PredictionPicks,
    PredictionRepository, PredictionService,
};
pub use results::{InMemoryRaceRepository, RaceOutcome, RaceRepository, ResultsService};
pub use scoring::{PointSchedule, ScoringEngine, ScoringError, ScoringService};
pub use shared::{AppError, AppState};

use axum::{
    routing::{get, post, put},
    Router,
};

/// All HTTP routes, with state attached
pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/races/:race_id", put(results::upsert_race))
        .route(
            "/races/:race_id/predictions",
            post(predictions::submit_prediction),
        )
        .route("/races/:race_id/results", post(results::record_results))
        .route("/races/:race_id/head-to-head", get(results::get_head_to_head))
        .route(
            "/races/:race_id/scores",
            post(scoring::process_race_scores).get(scoring::get_race_scores),
        )
        .route("/scores/recompute-totals", post(scoring::recompute_user_totals))
        .route("/leaderboard", get(leaderboard::get_leaderboard))
        .with_state(app_state)
}
