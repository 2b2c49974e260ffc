use gridpicks::{
    predictions::{HeadToHeadPick, PredictionPicks},
    results::{DriverClassification, FinishStatus},
};

// ============================================================================
// Prediction Builder
// ============================================================================

#[derive(Default)]
pub struct PicksBuilder {
    picks: PredictionPicks,
}

#[allow(dead_code)]
impl PicksBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn podium(mut self, drivers: &[&str]) -> Self {
        self.picks.podium = drivers.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn pole(mut self, driver: &str) -> Self {
        self.picks.pole_position = Some(driver.to_string());
        self
    }

    pub fn fastest_lap(mut self, driver: &str) -> Self {
        self.picks.fastest_lap = Some(driver.to_string());
        self
    }

    pub fn first_retirement(mut self, driver: &str) -> Self {
        self.picks.first_retirement = Some(driver.to_string());
        self
    }

    pub fn driver_h2h(mut self, first: &str, second: &str, winner: &str) -> Self {
        self.picks.driver_head_to_head = Some(HeadToHeadPick {
            first: first.to_string(),
            second: second.to_string(),
            winner: winner.to_string(),
        });
        self
    }

    pub fn team_h2h(mut self, first: &str, second: &str, winner: &str) -> Self {
        self.picks.team_head_to_head = Some(HeadToHeadPick {
            first: first.to_string(),
            second: second.to_string(),
            winner: winner.to_string(),
        });
        self
    }

    pub fn build(self) -> PredictionPicks {
        self.picks
    }
}

// ============================================================================
// Classification Builder
// ============================================================================

/// Builds classification rows in finishing order
#[derive(Default)]
pub struct ClassificationBuilder {
    rows: Vec<DriverClassification>,
}

#[allow(dead_code)]
impl ClassificationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a row with an explicit position and status
    pub fn entry(
        mut self,
        driver: &str,
        team: &str,
        position: Option<u32>,
        status: FinishStatus,
    ) -> Self {
        self.rows.push(DriverClassification {
            driver_id: driver.to_string(),
            constructor_id: team.to_string(),
            position,
            status,
            fastest_lap_rank: None,
        });
        self
    }

    /// Adds a finisher at the next position
    pub fn finished(self, driver: &str, team: &str) -> Self {
        let position = self.rows.len() as u32 + 1;
        self.entry(driver, team, Some(position), FinishStatus::Finished)
    }

    pub fn lapped(self, driver: &str, team: &str) -> Self {
        let position = self.rows.len() as u32 + 1;
        self.entry(driver, team, Some(position), FinishStatus::from("+1 Lap"))
    }

    pub fn retired(self, driver: &str, team: &str) -> Self {
        let position = self.rows.len() as u32 + 1;
        self.entry(driver, team, Some(position), FinishStatus::Retired)
    }

    pub fn with_fastest_lap(mut self, driver: &str) -> Self {
        for row in &mut self.rows {
            row.fastest_lap_rank = Some(if row.driver_id == driver { 1 } else { 2 });
        }
        self
    }

    pub fn build(self) -> Vec<DriverClassification> {
        self.rows
    }
}
