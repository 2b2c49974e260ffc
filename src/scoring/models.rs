use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter};

/// Every way a prediction can earn points, in evaluation order
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, Display, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeCategory {
    PolePosition,
    Winner,
    SecondPlace,
    ThirdPlace,
    PodiumDriver,
    AllPodiumCorrectOrder,
    AllPodiumWrongOrder,
    FastestLap,
    FirstRetirement,
    #[serde(rename = "DRIVER_H2H")]
    #[strum(serialize = "DRIVER_H2H")]
    DriverH2h,
    #[serde(rename = "TEAM_H2H")]
    #[strum(serialize = "TEAM_H2H")]
    TeamH2h,
}

impl OutcomeCategory {
    /// Exact podium positions, indexed by finishing place
    pub const PODIUM_POSITIONS: [OutcomeCategory; 3] = [
        OutcomeCategory::Winner,
        OutcomeCategory::SecondPlace,
        OutcomeCategory::ThirdPlace,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            OutcomeCategory::PolePosition => "Pole Position",
            OutcomeCategory::Winner => "Race Winner (P1)",
            OutcomeCategory::SecondPlace => "Second Place (P2)",
            OutcomeCategory::ThirdPlace => "Third Place (P3)",
            OutcomeCategory::PodiumDriver => "Correct podium driver, wrong position",
            OutcomeCategory::AllPodiumCorrectOrder => "BONUS: All 3 podium drivers in correct order",
            OutcomeCategory::AllPodiumWrongOrder => "BONUS: All 3 podium drivers but wrong order",
            OutcomeCategory::FastestLap => "Fastest Lap",
            OutcomeCategory::FirstRetirement => "First Retirement",
            OutcomeCategory::DriverH2h => "Driver Head-to-Head",
            OutcomeCategory::TeamH2h => "Team Head-to-Head",
        }
    }
}

/// One awarded line of a score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    #[serde(rename = "type")]
    pub category: OutcomeCategory,
    pub points: u32,
    /// Driver or constructor the points were awarded for
    pub subject: String,
}

impl BreakdownEntry {
    pub fn new(category: OutcomeCategory, points: u32, subject: impl Into<String>) -> Self {
        Self {
            category,
            points,
            subject: subject.into(),
        }
    }
}

/// Points and itemized breakdown, always stored and cleared together
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub points: u32,
    pub breakdown: Vec<BreakdownEntry>,
}

impl ScoreCard {
    pub fn from_breakdown(breakdown: Vec<BreakdownEntry>) -> Self {
        let points = breakdown.iter().map(|entry| entry.points).sum();
        Self { points, breakdown }
    }

    /// Each awarded entry counts as one correct prediction
    pub fn correct_count(&self) -> usize {
        self.breakdown.len()
    }
}

/// Score for one user in one race, as reported by the batch scorer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRaceScore {
    pub prediction_id: String,
    pub user_id: String,
    pub username: String,
    pub points: u32,
    pub breakdown: Vec<BreakdownEntry>,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceScoreReport {
    pub race_id: String,
    pub processed_count: usize,
    pub failed_count: usize,
    /// Set when the race was already scored and the run was not forced
    pub skipped: bool,
    pub results: Vec<UserRaceScore>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalsRecomputeReport {
    pub users_updated: usize,
    pub predictions_counted: usize,
}
