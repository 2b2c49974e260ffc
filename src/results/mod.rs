// Public API - what other modules can use
pub use handlers::{get_head_to_head, record_results, upsert_race};
pub use models::{
    DriverClassification, FinishStatus, HeadToHeadConfig, HeadToHeadView, Matchup,
    MatchupOutcome, Race, RaceOutcome,
};
pub use repository::{InMemoryRaceRepository, PostgresRaceRepository, RaceRepository};
pub use resolver::MatchupResolution;
pub use service::ResultsService;

// Internal modules
pub mod classification;
mod handlers;
pub mod models;
pub mod repository;
pub mod resolver;
mod service;
pub mod types;
