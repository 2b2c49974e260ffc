use tracing::debug;

use crate::predictions::{HeadToHeadPick, PredictionPicks};
use crate::results::{MatchupOutcome, RaceOutcome};
use crate::scoring::{rule_priority, BreakdownEntry, OutcomeCategory, RuleContext, ScoreRule};

type PickSelector = fn(&PredictionPicks) -> Option<&HeadToHeadPick>;
type OutcomeSelector = fn(&RaceOutcome) -> Option<&MatchupOutcome>;

/// Awards points when the picked winner equals the resolved winner. A tie
/// and a missing result both award nothing.
pub struct HeadToHeadRule {
    category: OutcomeCategory,
    priority: u32,
    matchup: &'static str,
    pick: PickSelector,
    result: OutcomeSelector,
}

fn picked_drivers(picks: &PredictionPicks) -> Option<&HeadToHeadPick> {
    picks.driver_head_to_head.as_ref()
}

fn resolved_drivers(outcome: &RaceOutcome) -> Option<&MatchupOutcome> {
    outcome.driver_head_to_head.as_ref()
}

fn picked_teams(picks: &PredictionPicks) -> Option<&HeadToHeadPick> {
    picks.team_head_to_head.as_ref()
}

fn resolved_teams(outcome: &RaceOutcome) -> Option<&MatchupOutcome> {
    outcome.team_head_to_head.as_ref()
}

impl HeadToHeadRule {
    pub fn drivers() -> Self {
        Self {
            category: OutcomeCategory::DriverH2h,
            priority: rule_priority::DRIVER_HEAD_TO_HEAD,
            matchup: "driver",
            pick: picked_drivers,
            result: resolved_drivers,
        }
    }

    pub fn teams() -> Self {
        Self {
            category: OutcomeCategory::TeamH2h,
            priority: rule_priority::TEAM_HEAD_TO_HEAD,
            matchup: "team",
            pick: picked_teams,
            result: resolved_teams,
        }
    }
}

impl ScoreRule for HeadToHeadRule {
    fn evaluate(
        &self,
        picks: &PredictionPicks,
        outcome: &RaceOutcome,
        context: &RuleContext,
    ) -> Vec<BreakdownEntry> {
        let Some(pick) = (self.pick)(picks) else {
            return Vec::new();
        };

        match (self.result)(outcome) {
            None => {
                debug!(matchup = self.matchup, race_id = %outcome.race_id, "Head-to-head result not available");
                Vec::new()
            }
            Some(MatchupOutcome { winner: None, .. }) => {
                debug!(matchup = self.matchup, race_id = %outcome.race_id, "Head-to-head was a tie, no points awarded");
                Vec::new()
            }
            Some(MatchupOutcome {
                winner: Some(winner),
                ..
            }) if *winner == pick.winner => vec![context.award(self.category, winner)],
            Some(_) => Vec::new(),
        }
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    fn name(&self) -> &'static str {
        match self.category {
            OutcomeCategory::TeamH2h => "team_head_to_head",
            _ => "driver_head_to_head",
        }
    }
}
