use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{models::Prediction, service::PredictionService, types::SubmitPredictionRequest};
use crate::shared::{AppError, AppState};

/// HTTP handler for submitting or replacing a prediction
///
/// POST /races/:race_id/predictions
#[instrument(name = "submit_prediction", skip(state, request))]
pub async fn submit_prediction(
    State(state): State<AppState>,
    Path(race_id): Path<String>,
    Json(request): Json<SubmitPredictionRequest>,
) -> Result<Json<Prediction>, AppError> {
    info!(race_id = %race_id, user_id = %request.user_id, "Prediction submitted");

    let service = PredictionService::new(
        Arc::clone(&state.race_repository),
        Arc::clone(&state.prediction_repository),
    );
    let prediction = service
        .submit(&race_id, &request.user_id, &request.username, request.picks)
        .await?;

    Ok(Json(prediction))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{HeadToHeadConfig, InMemoryRaceRepository, Race, RaceRepository};
    use crate::shared::test_utils::AppStateBuilder;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::post,
        Router,
    };
    use chrono::{Duration, Utc};
    use tower::ServiceExt; // for `oneshot`

    async fn app(starts_in: Duration) -> Router {
        let races = Arc::new(InMemoryRaceRepository::new());
        races
            .save_race(&Race {
                id: "vegas".to_string(),
                name: "Las Vegas Grand Prix".to_string(),
                season: "2025".to_string(),
                round: 22,
                starts_at: Utc::now() + starts_in,
                head_to_head: HeadToHeadConfig::default(),
                results_processed: false,
            })
            .await
            .unwrap();

        let app_state = AppStateBuilder::new().with_race_repository(races).build();

        Router::new()
            .route("/races/:race_id/predictions", post(submit_prediction))
            .with_state(app_state)
    }

    fn submission(podium: &str) -> Request<Body> {
        let body = format!(
            r#"{{"user_id": "u1", "username": "alice", "picks": {{"podium": {podium}, "pole_position": "ver"}}}}"#
        );
        Request::builder()
            .method("POST")
            .uri("/races/vegas/predictions")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_submit_prediction_handler() {
        let app = app(Duration::hours(3)).await;

        let response = app
            .oneshot(submission(r#"["ver", "nor", "pia"]"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let prediction: Prediction = serde_json::from_slice(&body).unwrap();
        assert_eq!(prediction.race_id, "vegas");
        assert_eq!(prediction.picks.pole_position.as_deref(), Some("ver"));
        assert!(!prediction.is_scored());
    }

    #[tokio::test]
    async fn test_submit_after_start_is_400() {
        let app = app(Duration::hours(-1)).await;

        let response = app
            .oneshot(submission(r#"["ver", "nor", "pia"]"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_submit_short_podium_is_400() {
        let app = app(Duration::hours(3)).await;

        let response = app.oneshot(submission(r#"["ver"]"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
