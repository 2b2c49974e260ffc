use serde::{Deserialize, Serialize};

use chrono::{DateTime, Utc};

use super::models::{DriverClassification, HeadToHeadConfig};

/// Request body for recording an official classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordResultsRequest {
    pub classification: Vec<DriverClassification>,
    /// Pole comes from qualifying, so the provider supplies it separately
    #[serde(default)]
    pub pole_position: Option<String>,
}

/// Request body for creating a race or changing its details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertRaceRequest {
    pub name: String,
    pub season: String,
    pub round: u32,
    pub starts_at: DateTime<Utc>,
    #[serde(default)]
    pub head_to_head: HeadToHeadConfig,
}
