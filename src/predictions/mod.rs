pub use handlers::submit_prediction;
pub use models::{HeadToHeadPick, Prediction, PredictionPicks};
pub use repository::{
    InMemoryPredictionRepository, PostgresPredictionRepository, PredictionRepository,
};
pub use service::PredictionService;

mod handlers;
pub mod models;
pub mod repository;
mod service;
pub mod types;
