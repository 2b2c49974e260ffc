use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::{info, instrument};

use super::{types::ProcessScoresQuery, RaceScoreReport, TotalsRecomputeReport, UserRaceScore};
use crate::shared::{AppError, AppState};

/// HTTP handler for scoring every prediction of a race
///
/// POST /races/:race_id/scores?force=true
#[instrument(name = "process_race_scores", skip(state))]
pub async fn process_race_scores(
    State(state): State<AppState>,
    Path(race_id): Path<String>,
    Query(query): Query<ProcessScoresQuery>,
) -> Result<Json<RaceScoreReport>, AppError> {
    info!(race_id = %race_id, force = query.force, "Score processing requested");

    let report = state
        .scoring_service
        .process_race_scores(&race_id, query.force)
        .await?;

    Ok(Json(report))
}

/// GET /races/:race_id/scores
#[instrument(name = "get_race_scores", skip(state))]
pub async fn get_race_scores(
    State(state): State<AppState>,
    Path(race_id): Path<String>,
) -> Result<Json<Vec<UserRaceScore>>, AppError> {
    let scores = state.scoring_service.race_scores(&race_id).await?;
    Ok(Json(scores))
}

/// POST /scores/recompute-totals
#[instrument(name = "recompute_user_totals", skip(state))]
pub async fn recompute_user_totals(
    State(state): State<AppState>,
) -> Result<Json<TotalsRecomputeReport>, AppError> {
    let report = state.scoring_service.recompute_user_totals().await?;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictions::{InMemoryPredictionRepository, Prediction, PredictionPicks, PredictionRepository};
    use crate::results::{InMemoryRaceRepository, RaceOutcome, RaceRepository};
    use crate::shared::test_utils::AppStateBuilder;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::{get, post},
        Router,
    };
    use chrono::Utc;
    use std::sync::Arc;
    use tower::ServiceExt; // for `oneshot`

    async fn app() -> Router {
        let races = Arc::new(InMemoryRaceRepository::new());
        races
            .save_outcome(&RaceOutcome {
                race_id: "suzuka".into(),
                podium: vec!["ver".into(), "per".into(), "sai".into()],
                pole_position: Some("ver".into()),
                fastest_lap: Some("ver".into()),
                first_retirement: None,
                classification: vec![],
                driver_head_to_head: None,
                team_head_to_head: None,
                updated_at: Utc::now(),
            })
            .await
            .unwrap();

        let predictions = Arc::new(InMemoryPredictionRepository::new());
        predictions
            .upsert_prediction(&Prediction::new(
                "u1",
                "alice",
                "suzuka",
                PredictionPicks {
                    podium: vec!["ver".into(), "sai".into(), "per".into()],
                    pole_position: Some("ver".into()),
                    ..PredictionPicks::default()
                },
            ))
            .await
            .unwrap();

        let app_state = AppStateBuilder::new()
            .with_race_repository(races)
            .with_prediction_repository(predictions)
            .build();

        Router::new()
            .route(
                "/races/:race_id/scores",
                post(process_race_scores).get(get_race_scores),
            )
            .route("/scores/recompute-totals", post(recompute_user_totals))
            .with_state(app_state)
    }

    async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_process_scores_handler() {
        let app = app().await;

        let request = Request::builder()
            .method("POST")
            .uri("/races/suzuka/scores")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let report: RaceScoreReport = read_json(response).await;
        assert_eq!(report.processed_count, 1);
        // pole 2, winner 6, two swapped drivers, wrong-order bonus
        assert_eq!(report.results[0].points, 2 + 6 + 1 + 1 + 2);

        let request = Request::builder()
            .method("POST")
            .uri("/races/suzuka/scores?force=false")
            .body(Body::empty())
            .unwrap();
        let report: RaceScoreReport = read_json(app.oneshot(request).await.unwrap()).await;
        assert!(report.skipped);
    }

    #[tokio::test]
    async fn test_get_scores_handler() {
        let app = app().await;

        let request = Request::builder()
            .method("POST")
            .uri("/races/suzuka/scores?force=true")
            .body(Body::empty())
            .unwrap();
        app.clone().oneshot(request).await.unwrap();

        let request = Request::builder()
            .uri("/races/suzuka/scores")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let scores: Vec<UserRaceScore> = read_json(response).await;
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].username, "alice");
    }

    #[tokio::test]
    async fn test_unknown_race_is_404() {
        let request = Request::builder()
            .method("POST")
            .uri("/races/nowhere/scores")
            .body(Body::empty())
            .unwrap();

        let response = app().await.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_recompute_totals_handler() {
        let request = Request::builder()
            .method("POST")
            .uri("/scores/recompute-totals")
            .body(Body::empty())
            .unwrap();

        let response = app().await.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let report: TotalsRecomputeReport = read_json(response).await;
        assert_eq!(report.predictions_counted, 0);
    }
}
