use serde::{Deserialize, Serialize};

use super::models::OutcomeCategory;

/// Points awarded per outcome category. Missing fields in a JSON override
/// keep their standard value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointSchedule {
    pub pole_position: u32,
    pub winner: u32,
    pub second_place: u32,
    pub third_place: u32,
    pub podium_driver: u32,
    pub all_podium_correct_order: u32,
    pub all_podium_wrong_order: u32,
    pub fastest_lap: u32,
    pub first_retirement: u32,
    pub driver_head_to_head: u32,
    pub team_head_to_head: u32,
}

impl Default for PointSchedule {
    fn default() -> Self {
        Self {
            pole_position: 2,
            winner: 6,
            second_place: 4,
            third_place: 2,
            podium_driver: 1,
            all_podium_correct_order: 6,
            all_podium_wrong_order: 2,
            fastest_lap: 1,
            first_retirement: 1,
            driver_head_to_head: 1,
            team_head_to_head: 1,
        }
    }
}

impl PointSchedule {
    pub fn points_for(&self, category: OutcomeCategory) -> u32 {
        match category {
            OutcomeCategory::PolePosition => self.pole_position,
            OutcomeCategory::Winner => self.winner,
            OutcomeCategory::SecondPlace => self.second_place,
            OutcomeCategory::ThirdPlace => self.third_place,
            OutcomeCategory::PodiumDriver => self.podium_driver,
            OutcomeCategory::AllPodiumCorrectOrder => self.all_podium_correct_order,
            OutcomeCategory::AllPodiumWrongOrder => self.all_podium_wrong_order,
            OutcomeCategory::FastestLap => self.fastest_lap,
            OutcomeCategory::FirstRetirement => self.first_retirement,
            OutcomeCategory::DriverH2h => self.driver_head_to_head,
            OutcomeCategory::TeamH2h => self.team_head_to_head,
        }
    }

    /// Highest score a single prediction can reach under this schedule
    pub fn max_score(&self) -> u32 {
        let exact = [self.winner, self.second_place, self.third_place];

        // With the full podium set named, either all three are exact or at
        // most one is (two exact forces the third).
        let all_exact = exact.iter().sum::<u32>() + self.all_podium_correct_order;
        let one_exact = exact
            .iter()
            .map(|points| points + 2 * self.podium_driver + self.all_podium_wrong_order)
            .max()
            .unwrap_or_default();
        let none_exact = 3 * self.podium_driver + self.all_podium_wrong_order;
        let podium = all_exact.max(one_exact).max(none_exact);

        podium
            + self.pole_position
            + self.fastest_lap
            + self.first_retirement
            + self.driver_head_to_head
            + self.team_head_to_head
    }
}
