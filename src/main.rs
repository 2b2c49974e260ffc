use std::sync::Arc;

use gridpicks::{
    config::AppConfig,
    leaderboard::{
        InMemoryUserTotalsRepository, PostgresUserTotalsRepository, UserTotalsRepository,
    },
    predictions::{
        InMemoryPredictionRepository, PostgresPredictionRepository, PredictionRepository,
    },
    results::{InMemoryRaceRepository, PostgresRaceRepository, RaceRepository},
    scoring::{sweep_task::start_results_sweep, ScoringEngine, ScoringService},
    shared::AppState,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Repositories = (
    Arc<dyn RaceRepository>,
    Arc<dyn PredictionRepository>,
    Arc<dyn UserTotalsRepository>,
);

async fn repositories(database_url: Option<&str>) -> Result<Repositories, sqlx::Error> {
    match database_url {
        Some(url) => {
            info!("Using PostgreSQL repositories");
            let pool = sqlx::PgPool::connect(url).await?;
            Ok((
                Arc::new(PostgresRaceRepository::new(pool.clone())),
                Arc::new(PostgresPredictionRepository::new(pool.clone())),
                Arc::new(PostgresUserTotalsRepository::new(pool)),
            ))
        }
        None => {
            info!("DATABASE_URL not set, using in-memory repositories");
            Ok((
                Arc::new(InMemoryRaceRepository::new()),
                Arc::new(InMemoryPredictionRepository::new()),
                Arc::new(InMemoryUserTotalsRepository::new()),
            ))
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gridpicks=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting gridpicks scoring server");

    let config = AppConfig::from_env()?;
    info!(
        max_score = config.point_schedule.max_score(),
        "Point schedule loaded"
    );

    let (race_repository, prediction_repository, totals_repository) =
        repositories(config.database_url.as_deref()).await?;

    let scoring_service = Arc::new(
        ScoringService::builder(
            Arc::clone(&race_repository),
            Arc::clone(&prediction_repository),
            Arc::clone(&totals_repository),
        )
        .with_engine(ScoringEngine::new(config.point_schedule.clone()))
        .build(),
    );

    tokio::spawn(start_results_sweep(
        Arc::clone(&race_repository),
        Arc::clone(&scoring_service),
        config.sweep.clone(),
    ));

    let app_state = AppState::new(
        race_repository,
        prediction_repository,
        totals_repository,
        scoring_service,
    );

    let app = gridpicks::router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(config.bind_addr.as_str()).await?;
    info!(bind_addr = %config.bind_addr, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
