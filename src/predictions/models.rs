use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use crate::scoring::ScoreCard;

/// A user's pick for a head-to-head matchup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadToHeadPick {
    pub first: String,
    pub second: String,
    pub winner: String,
}

/// What a user predicted for one race
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionPicks {
    /// P1, P2, P3 in order
    pub podium: Vec<String>,
    #[serde(default)]
    pub pole_position: Option<String>,
    #[serde(default)]
    pub fastest_lap: Option<String>,
    #[serde(default)]
    pub first_retirement: Option<String>,
    #[serde(default)]
    pub driver_head_to_head: Option<HeadToHeadPick>,
    #[serde(default)]
    pub team_head_to_head: Option<HeadToHeadPick>,
}

impl PredictionPicks {
    /// Checks the podium is three distinct drivers
    pub fn validate(&self) -> Result<(), String> {
        if self.podium.len() != 3 {
            return Err(format!(
                "podium must name exactly 3 drivers, got {}",
                self.podium.len()
            ));
        }

        if self.podium.iter().any(|driver| driver.trim().is_empty()) {
            return Err("podium contains an empty driver id".to_string());
        }

        let distinct: HashSet<&str> = self.podium.iter().map(String::as_str).collect();
        if distinct.len() != self.podium.len() {
            return Err(format!(
                "podium names the same driver twice: {}",
                self.podium.join(", ")
            ));
        }

        Ok(())
    }
}

/// A submitted prediction. `score` is set once the race has been scored and
/// always carries points and breakdown together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub race_id: String,
    pub picks: PredictionPicks,
    pub score: Option<ScoreCard>,
    pub submitted_at: DateTime<Utc>,
}

impl Prediction {
    pub fn new(user_id: &str, username: &str, race_id: &str, picks: PredictionPicks) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            username: username.to_string(),
            race_id: race_id.to_string(),
            picks,
            score: None,
            submitted_at: Utc::now(),
        }
    }

    pub fn is_scored(&self) -> bool {
        self.score.is_some()
    }
}
