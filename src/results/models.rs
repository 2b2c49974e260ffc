use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Finishing status as reported by the results provider.
///
/// Only `Finished` and `Lapped` count as running at the flag for the driver
/// head-to-head. Anything the provider sends that we don't model is kept
/// verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FinishStatus {
    Finished,
    Lapped,
    Retired,
    Disqualified,
    DidNotStart,
    Other(String),
}

impl FinishStatus {
    /// Running and classified at the end of the race
    pub fn is_running(&self) -> bool {
        matches!(self, FinishStatus::Finished | FinishStatus::Lapped)
    }

    pub fn is_disqualified(&self) -> bool {
        matches!(self, FinishStatus::Disqualified)
    }
}

impl From<&str> for FinishStatus {
    fn from(raw: &str) -> Self {
        match raw.trim() {
            "Finished" => FinishStatus::Finished,
            "Lapped" => FinishStatus::Lapped,
            "Retired" => FinishStatus::Retired,
            "Disqualified" => FinishStatus::Disqualified,
            "Did not start" | "DNS" => FinishStatus::DidNotStart,
            // "+1 Lap", "+3 Laps"
            other if other.starts_with('+') && other.contains("Lap") => FinishStatus::Lapped,
            other => FinishStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for FinishStatus {
    fn from(raw: String) -> Self {
        FinishStatus::from(raw.as_str())
    }
}

impl From<FinishStatus> for String {
    fn from(status: FinishStatus) -> Self {
        match status {
            FinishStatus::Finished => "Finished".to_string(),
            FinishStatus::Lapped => "Lapped".to_string(),
            FinishStatus::Retired => "Retired".to_string(),
            FinishStatus::Disqualified => "Disqualified".to_string(),
            FinishStatus::DidNotStart => "Did not start".to_string(),
            FinishStatus::Other(raw) => raw,
        }
    }
}

/// One row of the official race classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverClassification {
    pub driver_id: String,
    pub constructor_id: String,
    /// Recorded finishing position, if the provider assigned one
    pub position: Option<u32>,
    pub status: FinishStatus,
    /// Rank of this driver's fastest lap among the field
    #[serde(default)]
    pub fastest_lap_rank: Option<u32>,
}

/// A configured pairwise comparison between two drivers or two teams
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matchup {
    pub first: String,
    pub second: String,
}

impl Matchup {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }
}

/// Which head-to-heads an operator configured for a race
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadToHeadConfig {
    pub drivers: Option<Matchup>,
    pub teams: Option<Matchup>,
}

/// Resolved head-to-head. `winner: None` is a tie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchupOutcome {
    pub first: String,
    pub second: String,
    pub winner: Option<String>,
}

impl MatchupOutcome {
    pub fn is_tie(&self) -> bool {
        self.winner.is_none()
    }

    pub(crate) fn same_pairing(&self, matchup: &Matchup) -> bool {
        self.first == matchup.first && self.second == matchup.second
    }
}

/// Race weekend entry with its head-to-head configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Race {
    pub id: String,
    pub name: String,
    pub season: String,
    pub round: u32,
    pub starts_at: DateTime<Utc>,
    #[serde(default)]
    pub head_to_head: HeadToHeadConfig,
    #[serde(default)]
    pub results_processed: bool,
}

/// Official outcome of a race, one per race
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceOutcome {
    pub race_id: String,
    /// Up to three driver ids, ordered by finishing position
    pub podium: Vec<String>,
    pub pole_position: Option<String>,
    pub fastest_lap: Option<String>,
    /// Last-placed non-disqualified classified entrant, not literally the
    /// first car to retire
    pub first_retirement: Option<String>,
    #[serde(default)]
    pub classification: Vec<DriverClassification>,
    pub driver_head_to_head: Option<MatchupOutcome>,
    pub team_head_to_head: Option<MatchupOutcome>,
    pub updated_at: DateTime<Utc>,
}

/// Head-to-head configuration alongside what was resolved for it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadToHeadView {
    pub race_id: String,
    pub configuration: HeadToHeadConfig,
    pub drivers: Option<MatchupOutcome>,
    pub teams: Option<MatchupOutcome>,
}
